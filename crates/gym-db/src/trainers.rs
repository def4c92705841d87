use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use gym_data::{
    Delete,
    Insert,
    Query,
    Retrieve,
    Trainer,
    TrainerFilter,
    Update,
};

use crate::{
    like_pattern,
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Trainer> for Connection {
    type Filter = TrainerFilter;

    async fn query(&self, filter: &TrainerFilter) -> Result<Vec<Trainer>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                name,
                email,
                phone,
                gender,
                specialization,
                experience,
                salary,
                join_date,
                certification,
                address,
                bio,
                status,
                created_at,
                updated_at
            FROM trainers
            WHERE 1
            "#,
        );
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
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR specialization LIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
        if let Some(status) = filter.status {
            qry.push(" AND status = ").push_bind(status);
        }
        qry.push(" ORDER BY join_date DESC, id DESC");
        if let Some(limit) = filter.limit {
            qry.push(" LIMIT ").push_bind(limit);
        }

        let trainers: Vec<Trainer> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(trainers)
    }
}

#[async_trait]
impl Retrieve<Trainer> for Connection {
    type Key = u32;

    async fn retrieve(&self, trainer_id: Self::Key) -> Result<Trainer> {
        let filter = TrainerFilter {
            id: Some(trainer_id),
            ..Default::default()
        };
        let trainer = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound("trainer"))?;
        Ok(trainer)
    }
}

#[async_trait]
impl Insert<Trainer> for Connection {
    async fn insert(&self, trainer: Trainer) -> Result<Trainer> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO trainers (
                    name,
                    email,
                    phone,
                    gender,
                    specialization,
                    experience,
                    salary,
                    join_date,
                    certification,
                    address,
                    bio,
                    status
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&trainer.name)
                .push_bind(&trainer.email)
                .push_bind(&trainer.phone)
                .push_bind(&trainer.gender)
                .push_bind(&trainer.specialization)
                .push_bind(trainer.experience)
                .push_bind(trainer.salary)
                .push_bind(trainer.join_date)
                .push_bind(&trainer.certification)
                .push_bind(&trainer.address)
                .push_bind(&trainer.bio)
                .push_bind(trainer.status);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        tracing::info!(trainer_id = insert.id, "inserted trainer");
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Trainer> for Connection {
    async fn update(&self, trainer: Trainer) -> Result<Trainer> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE trainers SET")
                .push(" name = ")
                .push_bind(&trainer.name)
                .push(", email = ")
                .push_bind(&trainer.email)
                .push(", phone = ")
                .push_bind(&trainer.phone)
                .push(", gender = ")
                .push_bind(&trainer.gender)
                .push(", specialization = ")
                .push_bind(&trainer.specialization)
                .push(", experience = ")
                .push_bind(trainer.experience)
                .push(", salary = ")
                .push_bind(trainer.salary)
                .push(", join_date = ")
                .push_bind(trainer.join_date)
                .push(", certification = ")
                .push_bind(&trainer.certification)
                .push(", address = ")
                .push_bind(&trainer.address)
                .push(", bio = ")
                .push_bind(&trainer.bio)
                .push(", status = ")
                .push_bind(trainer.status)
                .push(", updated_at = CURRENT_TIMESTAMP")
                .push(" WHERE id = ")
                .push_bind(trainer.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        tracing::info!(trainer_id = trainer.id, "updated trainer");
        self.retrieve(trainer.id).await
    }
}

#[async_trait]
impl Delete<Trainer> for Connection {
    /// Delete a trainer. Members referencing the trainer
    /// keep their reference.
    async fn delete(&self, trainer: Trainer) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM trainers WHERE id = ")
            .push_bind(trainer.id)
            .build()
            .execute(&mut *conn)
            .await?;
        tracing::info!(trainer_id = trainer.id, "deleted trainer");
        Ok(())
    }
}
