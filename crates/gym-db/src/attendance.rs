use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use gym_data::{
    Attendance,
    AttendanceFilter,
    Delete,
    Insert,
    Query,
    Retrieve,
    Update,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Attendance> for Connection {
    type Filter = AttendanceFilter;

    async fn query(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<Attendance>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                member_id,
                member_name,
                date,
                check_in,
                check_out,
                created_at,
                updated_at
            FROM attendance
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        if let Some(date) = filter.date {
            qry.push(" AND date = ").push_bind(date);
        }
        if let Some(date_before) = filter.date_before {
            qry.push(" AND date <= ").push_bind(date_before);
        }
        if let Some(date_after) = filter.date_after {
            qry.push(" AND date >= ").push_bind(date_after);
        }
        qry.push(" ORDER BY date DESC, check_in DESC, id DESC");
        if let Some(limit) = filter.limit {
            qry.push(" LIMIT ").push_bind(limit);
        }

        let records: Vec<Attendance> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(records)
    }
}

#[async_trait]
impl Retrieve<Attendance> for Connection {
    type Key = u32;

    async fn retrieve(&self, attendance_id: Self::Key) -> Result<Attendance> {
        let filter = AttendanceFilter {
            id: Some(attendance_id),
            ..Default::default()
        };
        let record = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound("attendance record"))?;
        Ok(record)
    }
}

#[async_trait]
impl Insert<Attendance> for Connection {
    async fn insert(&self, record: Attendance) -> Result<Attendance> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO attendance (
                    member_id,
                    member_name,
                    date,
                    check_in,
                    check_out
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(record.member_id)
                .push_bind(&record.member_name)
                .push_bind(record.date)
                .push_bind(record.check_in)
                .push_bind(record.check_out);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        tracing::info!(
            attendance_id = insert.id,
            member_id = record.member_id,
            "inserted attendance"
        );
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Attendance> for Connection {
    async fn update(&self, record: Attendance) -> Result<Attendance> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE attendance SET")
                .push(" member_name = ")
                .push_bind(&record.member_name)
                .push(", date = ")
                .push_bind(record.date)
                .push(", check_in = ")
                .push_bind(record.check_in)
                .push(", check_out = ")
                .push_bind(record.check_out)
                .push(", updated_at = CURRENT_TIMESTAMP")
                .push(" WHERE id = ")
                .push_bind(record.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(record.id).await
    }
}

#[async_trait]
impl Delete<Attendance> for Connection {
    async fn delete(&self, record: Attendance) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM attendance WHERE id = ")
            .push_bind(record.id)
            .build()
            .execute(&mut *conn)
            .await?;
        tracing::info!(attendance_id = record.id, "deleted attendance");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::connection;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn test_attendance_insert_and_checkout() {
        let (_handle, db) = connection::open_test().await;
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let record = db
            .insert(Attendance {
                member_id: 3,
                member_name: "Visitor".to_string(),
                date,
                check_in: time(9, 0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(record.date, date);
        assert_eq!(record.check_in, time(9, 0));
        assert_eq!(record.check_out, None);

        let record = db
            .update(Attendance {
                check_out: Some(time(11, 30)),
                ..record
            })
            .await
            .unwrap();
        assert_eq!(record.check_out, Some(time(11, 30)));
    }

    #[tokio::test]
    async fn test_attendance_filter_by_member_and_date() {
        let (_handle, db) = connection::open_test().await;
        let d1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        for (member_id, date) in [(1, d1), (1, d2), (2, d2)] {
            db.insert(Attendance {
                member_id,
                date,
                check_in: time(8, 0),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let found: Vec<Attendance> = db
            .query(&AttendanceFilter {
                member_id: Some(1),
                date: Some(d2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let on_day: Vec<Attendance> = db
            .query(&AttendanceFilter {
                date: Some(d2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(on_day.len(), 2);

        let latest: Vec<Attendance> = db
            .query(&AttendanceFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].date, d2);
    }
}
