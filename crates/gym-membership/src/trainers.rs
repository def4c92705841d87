use chrono::NaiveDate;
use thiserror::Error as ThisError;

use gym_data::{
    Insert,
    Money,
    Query,
    Trainer,
    TrainerFilter,
    TrainerStatus,
    Update,
};

use crate::validation::{non_negative, optional, require, ValidationError};

#[derive(ThisError, Debug)]
pub enum TrainerError {
    #[error("trainer {0} not found")]
    NotFound(u32),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

pub fn validate_trainer(trainer: &Trainer) -> Result<(), ValidationError> {
    require("name", &trainer.name)?;
    require("email", &trainer.email)?;
    non_negative("salary", trainer.salary)?;
    Ok(())
}

/// Hire a trainer
pub async fn add_trainer<DB>(db: &DB, trainer: Trainer) -> Result<Trainer, TrainerError>
where
    DB: Insert<Trainer> + Send + Sync,
{
    let trainer = Trainer {
        certification: optional(trainer.certification),
        bio: optional(trainer.bio),
        ..trainer
    };
    validate_trainer(&trainer)?;
    let trainer = db.insert(trainer).await?;
    Ok(trainer)
}

#[derive(Debug, Clone, Default)]
pub struct TrainerChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub salary: Option<Money>,
    pub join_date: Option<NaiveDate>,
    pub certification: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub status: Option<TrainerStatus>,
}

impl TrainerChanges {
    pub fn apply(self, trainer: &Trainer) -> Result<Trainer, ValidationError> {
        let mut update = trainer.clone();
        if let Some(name) = self.name {
            update.name = name;
        }
        if let Some(email) = self.email {
            update.email = email;
        }
        if let Some(phone) = self.phone {
            update.phone = phone;
        }
        if let Some(gender) = self.gender {
            update.gender = gender;
        }
        if let Some(specialization) = self.specialization {
            update.specialization = specialization;
        }
        if let Some(experience) = self.experience {
            update.experience = experience;
        }
        if let Some(salary) = self.salary {
            update.salary = salary;
        }
        if let Some(join_date) = self.join_date {
            update.join_date = join_date;
        }
        // An empty string clears the optional fields
        if self.certification.is_some() {
            update.certification = optional(self.certification);
        }
        if self.bio.is_some() {
            update.bio = optional(self.bio);
        }
        if let Some(address) = self.address {
            update.address = address;
        }
        if let Some(status) = self.status {
            update.status = status;
        }
        validate_trainer(&update)?;
        Ok(update)
    }
}

pub async fn edit_trainer<DB>(
    db: &DB,
    trainer_id: u32,
    changes: TrainerChanges,
) -> Result<Trainer, TrainerError>
where
    DB: Query<Trainer, Filter = TrainerFilter> + Update<Trainer> + Send + Sync,
{
    let trainer: Trainer = db
        .query(&TrainerFilter {
            id: Some(trainer_id),
            ..Default::default()
        })
        .await?
        .pop()
        .ok_or(TrainerError::NotFound(trainer_id))?;
    let update = changes.apply(&trainer)?;
    let trainer = db.update(update).await?;
    Ok(trainer)
}

#[cfg(test)]
mod tests {
    use super::*;

    use gym_db::connection;

    fn trainer() -> Trainer {
        Trainer {
            name: "Coach".to_string(),
            email: "coach@gym".to_string(),
            specialization: "Strength".to_string(),
            salary: Money::from_units(3000),
            certification: Some("".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_trainer() {
        assert!(validate_trainer(&trainer()).is_ok());
        let no_email = Trainer {
            email: "".to_string(),
            ..trainer()
        };
        assert_eq!(
            validate_trainer(&no_email),
            Err(ValidationError::MissingField("email"))
        );
        let negative = Trainer {
            salary: Money::from_cents(-1),
            ..trainer()
        };
        assert_eq!(
            validate_trainer(&negative),
            Err(ValidationError::NegativeAmount("salary"))
        );
    }

    #[test]
    fn test_changes_clear_certification() {
        let t = Trainer {
            certification: Some("ACE".to_string()),
            ..trainer()
        };
        let update = TrainerChanges {
            certification: Some(" ".to_string()),
            status: Some(TrainerStatus::Inactive),
            ..Default::default()
        }
        .apply(&t)
        .unwrap();
        assert_eq!(update.certification, None);
        assert_eq!(update.status, TrainerStatus::Inactive);
        assert_eq!(update.name, "Coach");
    }

    #[tokio::test]
    async fn test_add_and_edit_trainer() {
        let (_handle, db) = connection::open_test().await;
        let t = add_trainer(&db, trainer()).await.unwrap();
        assert_eq!(t.certification, None);

        let t = edit_trainer(
            &db,
            t.id,
            TrainerChanges {
                salary: Some(Money::from_units(3200)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(t.salary, Money::from_units(3200));

        let result = edit_trainer(&db, 99, TrainerChanges::default()).await;
        assert!(matches!(result, Err(TrainerError::NotFound(99))));
    }
}
