use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    sqlite::SqliteConnection,
    Connection as SqlConnection,
    QueryBuilder,
    Sqlite,
};

use gym_data::{
    Delete,
    Enroll,
    Insert,
    Member,
    MemberFilter,
    Payment,
    Query,
    Retrieve,
    Update,
};

use crate::{
    payments::insert_payment,
    like_pattern,
    results::{Id, QueryError},
    Connection,
};

const SELECT_MEMBERS: &str = r#"
    SELECT
        id,
        name,
        email,
        phone,
        gender,
        address,
        join_date,
        expiry_date,
        duration,
        fee,
        trainer_id,
        status,
        created_at,
        updated_at
    FROM members
    WHERE 1
"#;

/// Fetch a single member on an open connection or transaction
pub(crate) async fn select_member(
    conn: &mut SqliteConnection,
    member_id: u32,
) -> Result<Member> {
    let member: Option<Member> = QueryBuilder::<Sqlite>::new(SELECT_MEMBERS)
        .push(" AND id = ")
        .push_bind(member_id)
        .build_query_as()
        .fetch_optional(&mut *conn)
        .await?;
    Ok(member.ok_or(QueryError::NotFound("member"))?)
}

/// Insert a member row and return the new id
pub(crate) async fn insert_member(
    conn: &mut SqliteConnection,
    member: &Member,
) -> Result<u32> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"INSERT INTO members (
            name,
            email,
            phone,
            gender,
            address,
            join_date,
            expiry_date,
            duration,
            fee,
            trainer_id,
            status
        ) VALUES (
        "#,
    );
    qry.separated(", ")
        .push_bind(&member.name)
        .push_bind(&member.email)
        .push_bind(&member.phone)
        .push_bind(&member.gender)
        .push_bind(&member.address)
        .push_bind(member.join_date)
        .push_bind(member.expiry_date)
        .push_bind(member.duration)
        .push_bind(member.fee)
        .push_bind(member.trainer_id)
        .push_bind(member.status);
    let insert: Id<u32> = qry
        .push(") RETURNING id ")
        .build_query_as()
        .fetch_one(&mut *conn)
        .await?;
    Ok(insert.id)
}

/// Write all member fields. Fails if there is no such member.
pub(crate) async fn update_member(
    conn: &mut SqliteConnection,
    member: &Member,
) -> Result<()> {
    let result = QueryBuilder::<Sqlite>::new("UPDATE members SET")
        .push(" name = ")
        .push_bind(&member.name)
        .push(", email = ")
        .push_bind(&member.email)
        .push(", phone = ")
        .push_bind(&member.phone)
        .push(", gender = ")
        .push_bind(&member.gender)
        .push(", address = ")
        .push_bind(&member.address)
        .push(", join_date = ")
        .push_bind(member.join_date)
        .push(", expiry_date = ")
        .push_bind(member.expiry_date)
        .push(", duration = ")
        .push_bind(member.duration)
        .push(", fee = ")
        .push_bind(member.fee)
        .push(", trainer_id = ")
        .push_bind(member.trainer_id)
        .push(", status = ")
        .push_bind(member.status)
        .push(", updated_at = CURRENT_TIMESTAMP")
        .push(" WHERE id = ")
        .push_bind(member.id)
        .build()
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(QueryError::NotFound("member").into());
    }
    Ok(())
}

/// Write only the expiry date and status of a member
pub(crate) async fn update_expiry(
    conn: &mut SqliteConnection,
    member: &Member,
) -> Result<()> {
    let result = QueryBuilder::<Sqlite>::new("UPDATE members SET")
        .push(" expiry_date = ")
        .push_bind(member.expiry_date)
        .push(", status = ")
        .push_bind(member.status)
        .push(", updated_at = CURRENT_TIMESTAMP")
        .push(" WHERE id = ")
        .push_bind(member.id)
        .build()
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(QueryError::NotFound("member").into());
    }
    Ok(())
}

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(SELECT_MEMBERS);

        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(search) = filter.search.clone() {
            let pattern = like_pattern(&search);
            qry.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR email LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR phone LIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email = ")
                .push_bind(email)
                .push(" COLLATE NOCASE");
        }
        if let Some(trainer_id) = filter.trainer_id {
            qry.push(" AND trainer_id = ").push_bind(trainer_id);
        }
        if let Some(after) = filter.expiring_after {
            qry.push(" AND expiry_date >= ").push_bind(after);
        }
        if let Some(before) = filter.expiring_before {
            qry.push(" AND expiry_date <= ").push_bind(before);
        }
        qry.push(" ORDER BY join_date DESC, id DESC");
        if let Some(limit) = filter.limit {
            qry.push(" LIMIT ").push_bind(limit);
        }

        let members: Vec<Member> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        tracing::debug!(count = members.len(), "queried members");
        Ok(members)
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = u32;

    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let filter = MemberFilter {
            id: Some(member_id),
            ..Default::default()
        };
        let member = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound("member"))?;
        Ok(member)
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    async fn insert(&self, member: Member) -> Result<Member> {
        let id = {
            let mut conn = self.lock().await;
            insert_member(&mut conn, &member).await?
        };
        tracing::info!(member_id = id, "inserted member");
        self.retrieve(id).await
    }
}

#[async_trait]
impl Update<Member> for Connection {
    /// Update member
    async fn update(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            update_member(&mut conn, &member).await?;
        }
        tracing::info!(member_id = member.id, "updated member");
        self.retrieve(member.id).await
    }
}

#[async_trait]
impl Delete<Member> for Connection {
    /// Delete member. Payments and attendance are kept.
    async fn delete(&self, member: Member) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM members WHERE id = ")
            .push_bind(member.id)
            .build()
            .execute(&mut *conn)
            .await?;
        tracing::info!(member_id = member.id, "deleted member");
        Ok(())
    }
}

#[async_trait]
impl Enroll for Connection {
    async fn enroll(
        &self,
        member: Member,
        payment: Payment,
    ) -> Result<(Member, Payment)> {
        let (member_id, payment_id) = {
            let mut conn = self.lock().await;
            let mut tx = conn.begin().await?;
            let member_id = insert_member(&mut tx, &member).await?;
            let payment = Payment {
                member_id,
                ..payment
            };
            let payment_id = insert_payment(&mut tx, &payment).await?;
            tx.commit().await?;
            (member_id, payment_id)
        };
        tracing::info!(member_id, payment_id, "enrolled member");

        let member: Member = self.retrieve(member_id).await?;
        let payment: Payment = self.retrieve(payment_id).await?;
        Ok((member, payment))
    }
}
