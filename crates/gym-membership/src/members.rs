use anyhow::Result;
use chrono::NaiveDate;
use thiserror::Error as ThisError;

use gym_data::{
    derive_status,
    Enroll,
    Member,
    MemberFilter,
    Money,
    Payment,
    PaymentKind,
    Query,
    Trainer,
    TrainerFilter,
    Update,
};

use crate::{
    datetime::{compute_expiry, ExpiryError},
    validation::{non_negative, require, ValidationError},
};

#[derive(ThisError, Debug)]
pub enum MemberError {
    #[error("member {0} not found")]
    NotFound(u32),

    #[error("trainer {0} not found")]
    TrainerNotFound(u32),

    #[error("member with email {0} already exists")]
    EmailTaken(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Expiry(#[from] ExpiryError),

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

/// Signup data for a new member
#[derive(Debug, Clone, Default)]
pub struct Enrollment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub address: String,
    pub join_date: NaiveDate,
    pub duration: u32,
    pub fee: Money,
    pub trainer_id: Option<u32>,
}

impl Enrollment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        non_negative("fee", self.fee)?;
        if self.duration == 0 {
            return Err(ValidationError::InvalidDuration);
        }
        Ok(())
    }

    /// Build the member record, expiring `duration` months
    /// after the join date.
    pub fn to_member(&self, today: NaiveDate) -> Result<Member, MemberError> {
        let expiry_date = compute_expiry(self.join_date, self.duration)?;
        Ok(Member {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            gender: self.gender.clone(),
            address: self.address.clone(),
            join_date: self.join_date,
            expiry_date,
            duration: self.duration,
            fee: self.fee,
            trainer_id: self.trainer_id,
            status: derive_status(today, expiry_date),
            ..Default::default()
        })
    }

    /// The initial membership fee, paid in cash on the join date
    pub fn first_payment(&self) -> Payment {
        Payment {
            member_name: self.name.clone(),
            kind: PaymentKind::MembershipFee,
            amount: self.fee,
            method: Payment::CASH.to_string(),
            date: self.join_date,
            status: Payment::COMPLETED.to_string(),
            ..Default::default()
        }
    }
}

async fn check_trainer<DB>(db: &DB, trainer_id: Option<u32>) -> Result<(), MemberError>
where
    DB: Query<Trainer, Filter = TrainerFilter> + Send + Sync,
{
    if let Some(trainer_id) = trainer_id {
        let trainers: Vec<Trainer> = db
            .query(&TrainerFilter {
                id: Some(trainer_id),
                ..Default::default()
            })
            .await?;
        if trainers.is_empty() {
            return Err(MemberError::TrainerNotFound(trainer_id));
        }
    }
    Ok(())
}

async fn check_email<DB>(db: &DB, email: &str, member_id: Option<u32>) -> Result<(), MemberError>
where
    DB: Query<Member, Filter = MemberFilter> + Send + Sync,
{
    let members: Vec<Member> = db
        .query(&MemberFilter {
            email: Some(email.to_string()),
            ..Default::default()
        })
        .await?;
    if members.iter().any(|m| Some(m.id) != member_id) {
        return Err(MemberError::EmailTaken(email.to_string()));
    }
    Ok(())
}

/// Sign up a new member. The member and its first
/// membership fee payment are stored together.
pub async fn enroll_member<DB>(
    db: &DB,
    enrollment: Enrollment,
    today: NaiveDate,
) -> Result<(Member, Payment), MemberError>
where
    DB: Enroll
        + Query<Member, Filter = MemberFilter>
        + Query<Trainer, Filter = TrainerFilter>
        + Send
        + Sync,
{
    enrollment.validate()?;
    check_email(db, &enrollment.email, None).await?;
    check_trainer(db, enrollment.trainer_id).await?;

    let member = enrollment.to_member(today)?;
    let payment = enrollment.first_payment();
    let (member, payment) = db.enroll(member, payment).await?;
    tracing::info!(
        member_id = member.id,
        expiry_date = %member.expiry_date,
        "member enrolled"
    );
    Ok((member, payment))
}

/// Changes to an existing member. Unset fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub duration: Option<u32>,
    pub fee: Option<Money>,
    /// `Some(None)` removes the trainer
    pub trainer_id: Option<Option<u32>>,
}

impl MemberChanges {
    /// Apply the changes to a copy of `member`.
    ///
    /// A new join date or duration recomputes the expiry date
    /// from the join date. Otherwise the expiry date, which
    /// may carry renewals, is left alone.
    pub fn apply(
        self,
        member: &Member,
        today: NaiveDate,
    ) -> Result<Member, MemberError> {
        let mut update = member.clone();
        if let Some(name) = self.name {
            require("name", &name)?;
            update.name = name;
        }
        if let Some(email) = self.email {
            require("email", &email)?;
            update.email = email;
        }
        if let Some(phone) = self.phone {
            update.phone = phone;
        }
        if let Some(gender) = self.gender {
            update.gender = gender;
        }
        if let Some(address) = self.address {
            update.address = address;
        }
        if let Some(fee) = self.fee {
            non_negative("fee", fee)?;
            update.fee = fee;
        }
        if let Some(trainer_id) = self.trainer_id {
            update.trainer_id = trainer_id;
        }

        let reschedule = self.join_date.is_some() || self.duration.is_some();
        if let Some(join_date) = self.join_date {
            update.join_date = join_date;
        }
        if let Some(duration) = self.duration {
            if duration == 0 {
                return Err(ValidationError::InvalidDuration.into());
            }
            update.duration = duration;
        }
        if reschedule {
            update.expiry_date = compute_expiry(update.join_date, update.duration)?;
        }
        update.status = update.status_on(today);
        Ok(update)
    }
}

/// Edit a member and return the stored result
pub async fn edit_member<DB>(
    db: &DB,
    member_id: u32,
    changes: MemberChanges,
    today: NaiveDate,
) -> Result<Member, MemberError>
where
    DB: Query<Member, Filter = MemberFilter>
        + Query<Trainer, Filter = TrainerFilter>
        + Update<Member>
        + Send
        + Sync,
{
    let member: Member = db
        .query(&MemberFilter {
            id: Some(member_id),
            ..Default::default()
        })
        .await?
        .pop()
        .ok_or(MemberError::NotFound(member_id))?;

    let update = changes.apply(&member, today)?;
    if update.email != member.email {
        check_email(db, &update.email, Some(member_id)).await?;
    }
    if update.trainer_id != member.trainer_id {
        check_trainer(db, update.trainer_id).await?;
    }

    let member = db.update(update).await?;
    Ok(member)
}

/// Write the derived status back to every member whose stored
/// status lags behind. Returns the number of updated members.
pub async fn refresh_statuses<DB>(db: &DB, today: NaiveDate) -> Result<usize>
where
    DB: Query<Member, Filter = MemberFilter> + Update<Member> + Send + Sync,
{
    let members: Vec<Member> = db.query(&MemberFilter::default()).await?;
    let mut updated = 0;
    for mut member in members {
        let status = member.status_on(today);
        if member.status == status {
            continue;
        }
        tracing::info!(
            member_id = member.id,
            from = %member.status,
            to = %status,
            "refreshing member status"
        );
        member.status = status;
        db.update(member).await?;
        updated += 1;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    use gym_data::{Insert, MemberStatus, PaymentFilter, Retrieve};
    use gym_db::connection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn enrollment() -> Enrollment {
        Enrollment {
            name: "Test Member".to_string(),
            email: "test@gym".to_string(),
            phone: "555-0101".to_string(),
            join_date: date(2024, 1, 31),
            duration: 1,
            fee: Money::from_units(40),
            ..Default::default()
        }
    }

    #[test]
    fn test_enrollment_validate() {
        assert!(enrollment().validate().is_ok());

        let missing_name = Enrollment {
            name: "".to_string(),
            ..enrollment()
        };
        assert_eq!(
            missing_name.validate(),
            Err(ValidationError::MissingField("name"))
        );

        let no_duration = Enrollment {
            duration: 0,
            ..enrollment()
        };
        assert_eq!(no_duration.validate(), Err(ValidationError::InvalidDuration));

        let negative = Enrollment {
            fee: Money::from_cents(-100),
            ..enrollment()
        };
        assert_eq!(
            negative.validate(),
            Err(ValidationError::NegativeAmount("fee"))
        );
    }

    #[test]
    fn test_enrollment_to_member() {
        let member = enrollment().to_member(date(2024, 2, 1)).unwrap();
        assert_eq!(member.expiry_date, date(2024, 2, 29));
        assert_eq!(member.status, MemberStatus::Active);

        // Backdated signup that already ran out
        let member = enrollment().to_member(date(2024, 6, 1)).unwrap();
        assert_eq!(member.status, MemberStatus::Expired);
    }

    #[tokio::test]
    async fn test_enroll_creates_one_fee_payment() {
        let (_handle, db) = connection::open_test().await;
        let (member, payment) =
            enroll_member(&db, enrollment(), date(2024, 2, 1)).await.unwrap();

        assert_eq!(member.expiry_date, date(2024, 2, 29));
        assert_eq!(payment.member_id, member.id);
        assert_eq!(payment.member_name, "Test Member");
        assert_eq!(payment.kind, PaymentKind::MembershipFee);
        assert_eq!(payment.amount, Money::from_units(40));
        assert_eq!(payment.method, "Cash");
        assert_eq!(payment.date, date(2024, 1, 31));
        assert_eq!(payment.status, "Completed");

        let payments: Vec<Payment> = db
            .query(&PaymentFilter {
                member_id: Some(member.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
    }

    #[tokio::test]
    async fn test_enroll_rejects_duplicate_email() {
        let (_handle, db) = connection::open_test().await;
        enroll_member(&db, enrollment(), date(2024, 2, 1)).await.unwrap();
        let result = enroll_member(&db, enrollment(), date(2024, 2, 1)).await;
        assert!(matches!(result, Err(MemberError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_enroll_rejects_unknown_trainer() {
        let (_handle, db) = connection::open_test().await;
        let result = enroll_member(
            &db,
            Enrollment {
                trainer_id: Some(77),
                ..enrollment()
            },
            date(2024, 2, 1),
        )
        .await;
        assert!(matches!(result, Err(MemberError::TrainerNotFound(77))));

        let trainer = db
            .insert(Trainer {
                name: "Coach".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let (member, _) = enroll_member(
            &db,
            Enrollment {
                trainer_id: Some(trainer.id),
                ..enrollment()
            },
            date(2024, 2, 1),
        )
        .await
        .unwrap();
        assert_eq!(member.trainer_id, Some(trainer.id));
    }

    #[test]
    fn test_changes_keep_renewed_expiry() {
        let member = Member {
            name: "Renewed".to_string(),
            join_date: date(2024, 1, 1),
            expiry_date: date(2024, 6, 1),
            duration: 1,
            ..Default::default()
        };
        let update = MemberChanges {
            phone: Some("555".to_string()),
            ..Default::default()
        }
        .apply(&member, date(2024, 3, 1))
        .unwrap();
        assert_eq!(update.expiry_date, date(2024, 6, 1));
        assert_eq!(update.phone, "555");
    }

    #[test]
    fn test_changes_reschedule_expiry() {
        let member = Member {
            join_date: date(2024, 1, 1),
            expiry_date: date(2024, 2, 1),
            duration: 1,
            ..Default::default()
        };
        let update = MemberChanges {
            duration: Some(6),
            ..Default::default()
        }
        .apply(&member, date(2024, 3, 1))
        .unwrap();
        assert_eq!(update.expiry_date, date(2024, 7, 1));
        assert_eq!(update.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_edit_member_rename_keeps_payment_names() {
        let (_handle, db) = connection::open_test().await;
        let (member, payment) =
            enroll_member(&db, enrollment(), date(2024, 2, 1)).await.unwrap();

        let member = edit_member(
            &db,
            member.id,
            MemberChanges {
                name: Some("Renamed Member".to_string()),
                ..Default::default()
            },
            date(2024, 2, 1),
        )
        .await
        .unwrap();
        assert_eq!(member.name, "Renamed Member");

        let payment: Payment = db.retrieve(payment.id).await.unwrap();
        assert_eq!(payment.member_name, "Test Member");
    }

    #[tokio::test]
    async fn test_edit_missing_member() {
        let (_handle, db) = connection::open_test().await;
        let result =
            edit_member(&db, 5, MemberChanges::default(), date(2024, 1, 1)).await;
        assert!(matches!(result, Err(MemberError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_refresh_statuses() {
        let (_handle, db) = connection::open_test().await;
        let lapsed = db
            .insert(Member {
                name: "Lapsed".to_string(),
                expiry_date: date(2024, 1, 1),
                status: MemberStatus::Active,
                ..Default::default()
            })
            .await
            .unwrap();
        db.insert(Member {
            name: "Current".to_string(),
            expiry_date: date(2024, 12, 1),
            status: MemberStatus::Active,
            ..Default::default()
        })
        .await
        .unwrap();

        let updated = refresh_statuses(&db, date(2024, 6, 1)).await.unwrap();
        assert_eq!(updated, 1);

        let lapsed: Member = db.retrieve(lapsed.id).await.unwrap();
        assert_eq!(lapsed.status, MemberStatus::Expired);

        // Nothing left to do
        let updated = refresh_statuses(&db, date(2024, 6, 1)).await.unwrap();
        assert_eq!(updated, 0);
    }
}
