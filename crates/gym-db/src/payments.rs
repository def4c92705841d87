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
    Insert,
    Member,
    Payment,
    PaymentFilter,
    Query,
    Renew,
    Retrieve,
};

use crate::{
    members::{select_member, update_expiry},
    results::{Id, QueryError},
    Connection,
};

/// Insert a payment row and return the new id
pub(crate) async fn insert_payment(
    conn: &mut SqliteConnection,
    payment: &Payment,
) -> Result<u32> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"INSERT INTO payments (
            member_id,
            member_name,
            kind,
            amount,
            method,
            date,
            reference,
            notes,
            status
        ) VALUES (
        "#,
    );
    qry.separated(", ")
        .push_bind(payment.member_id)
        .push_bind(&payment.member_name)
        .push_bind(payment.kind.to_string())
        .push_bind(payment.amount)
        .push_bind(&payment.method)
        .push_bind(payment.date)
        .push_bind(&payment.reference)
        .push_bind(&payment.notes)
        .push_bind(&payment.status);
    let insert: Id<u32> = qry
        .push(") RETURNING id ")
        .build_query_as()
        .fetch_one(&mut *conn)
        .await?;
    Ok(insert.id)
}

#[async_trait]
impl Query<Payment> for Connection {
    type Filter = PaymentFilter;

    async fn query(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                member_id,
                member_name,
                kind,
                amount,
                method,
                date,
                reference,
                notes,
                status,
                created_at,
                updated_at
            FROM payments
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        if let Some(kind) = &filter.kind {
            qry.push(" AND kind = ").push_bind(kind.to_string());
        }
        if let Some(method) = filter.method.clone() {
            qry.push(" AND method = ").push_bind(method);
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
        qry.push(" ORDER BY date DESC, id DESC");
        if let Some(limit) = filter.limit {
            qry.push(" LIMIT ").push_bind(limit);
        }

        let payments: Vec<Payment> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        tracing::debug!(count = payments.len(), "queried payments");
        Ok(payments)
    }
}

#[async_trait]
impl Retrieve<Payment> for Connection {
    type Key = u32;

    async fn retrieve(&self, payment_id: Self::Key) -> Result<Payment> {
        let filter = PaymentFilter {
            id: Some(payment_id),
            ..Default::default()
        };
        let payment = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound("payment"))?;
        Ok(payment)
    }
}

#[async_trait]
impl Insert<Payment> for Connection {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        let id = {
            let mut conn = self.lock().await;
            insert_payment(&mut conn, &payment).await?
        };
        tracing::info!(payment_id = id, member_id = payment.member_id, "inserted payment");
        self.retrieve(id).await
    }
}

#[async_trait]
impl Delete<Payment> for Connection {
    async fn delete(&self, payment: Payment) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM payments WHERE id = ")
            .push_bind(payment.id)
            .build()
            .execute(&mut *conn)
            .await?;
        tracing::info!(payment_id = payment.id, "deleted payment");
        Ok(())
    }
}

#[async_trait]
impl Renew for Connection {
    async fn renew<F>(
        &self,
        payment: Payment,
        extend: F,
    ) -> Result<(Member, Payment)>
    where
        F: FnOnce(&Member) -> Result<Member> + Send,
    {
        let (member, payment_id) = {
            let mut conn = self.lock().await;
            let mut tx = conn.begin().await?;
            let member = select_member(&mut tx, payment.member_id).await?;
            let renewed = Member {
                id: member.id,
                ..extend(&member)?
            };
            let payment = Payment {
                member_name: member.name.clone(),
                ..payment
            };
            let payment_id = insert_payment(&mut tx, &payment).await?;
            update_expiry(&mut tx, &renewed).await?;
            tx.commit().await?;
            (renewed, payment_id)
        };
        tracing::info!(
            member_id = member.id,
            payment_id,
            expiry_date = %member.expiry_date,
            "renewed membership"
        );

        let member: Member = self.retrieve(member.id).await?;
        let payment: Payment = self.retrieve(payment_id).await?;
        Ok((member, payment))
    }
}
