use chrono::NaiveDate;
use thiserror::Error as ThisError;

use gym_data::{
    Insert,
    Member,
    MemberFilter,
    MemberStatus,
    Money,
    Payment,
    PaymentKind,
    Query,
    Renew,
};

use crate::{
    datetime::{compute_expiry, ExpiryError},
    validation::{non_negative, optional, require, ValidationError},
};

#[derive(ThisError, Debug)]
pub enum PaymentError {
    #[error("member {0} not found")]
    MemberNotFound(u32),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Expiry(#[from] ExpiryError),

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default)]
pub struct NewPayment {
    pub member_id: u32,
    pub kind: PaymentKind,
    pub amount: Money,
    pub method: String,
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("amount", self.amount)?;
        require("method", &self.method)?;
        Ok(())
    }

    /// The payment as booked for `member`
    pub fn to_payment(&self, member: &Member) -> Payment {
        Payment {
            member_id: member.id,
            member_name: member.name.clone(),
            kind: self.kind.clone(),
            amount: self.amount,
            method: self.method.clone(),
            date: self.date,
            reference: optional(self.reference.clone()),
            notes: optional(self.notes.clone()),
            status: Payment::COMPLETED.to_string(),
            ..Default::default()
        }
    }
}

/// Extend a membership by its subscribed duration, counted
/// from the current expiry date.
pub fn extend_membership(member: &Member) -> Result<Member, ExpiryError> {
    let expiry_date = compute_expiry(member.expiry_date, member.duration)?;
    Ok(Member {
        expiry_date,
        status: MemberStatus::Active,
        ..member.clone()
    })
}

/// Record a payment for a member.
///
/// Renewals and membership fees also extend the membership.
/// In that case the payment and the new expiry date are
/// written together or not at all.
///
/// Returns the stored payment and the member as it is after
/// the payment.
pub async fn record_payment<DB>(
    db: &DB,
    new_payment: NewPayment,
) -> Result<(Payment, Member), PaymentError>
where
    DB: Query<Member, Filter = MemberFilter> + Insert<Payment> + Renew + Send + Sync,
{
    new_payment.validate()?;

    let member: Member = db
        .query(&MemberFilter {
            id: Some(new_payment.member_id),
            ..Default::default()
        })
        .await?
        .pop()
        .ok_or(PaymentError::MemberNotFound(new_payment.member_id))?;

    let payment = new_payment.to_payment(&member);
    if !payment.kind.extends_membership() {
        let payment = db.insert(payment).await?;
        return Ok((payment, member));
    }

    // The member is read again inside the renewal, so an edit
    // made in the meantime is kept.
    let (member, payment) = db
        .renew(payment, |member: &Member| Ok(extend_membership(member)?))
        .await
        .map_err(|err| match err.downcast::<ExpiryError>() {
            Ok(err) => PaymentError::Expiry(err),
            Err(err) => PaymentError::Error(err),
        })?;
    Ok((payment, member))
}

#[cfg(test)]
mod tests {
    use super::*;

    use gym_data::{PaymentFilter, Retrieve};
    use gym_db::connection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn renewal(member_id: u32) -> NewPayment {
        NewPayment {
            member_id,
            kind: PaymentKind::Renewal,
            amount: Money::from_units(40),
            method: "Cash".to_string(),
            date: date(2025, 1, 2),
            reference: Some("".to_string()),
            notes: None,
        }
    }

    async fn expired_member(db: &gym_db::Connection) -> Member {
        db.insert(Member {
            name: "Renewing Member".to_string(),
            join_date: date(2024, 12, 1),
            expiry_date: date(2025, 1, 1),
            duration: 1,
            status: MemberStatus::Expired,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_new_payment_validate() {
        assert!(renewal(1).validate().is_ok());
        let no_method = NewPayment {
            method: " ".to_string(),
            ..renewal(1)
        };
        assert_eq!(
            no_method.validate(),
            Err(ValidationError::MissingField("method"))
        );
        let negative = NewPayment {
            amount: Money::from_cents(-5),
            ..renewal(1)
        };
        assert_eq!(
            negative.validate(),
            Err(ValidationError::NegativeAmount("amount"))
        );
    }

    #[test]
    fn test_extend_membership_from_current_expiry() {
        let member = Member {
            expiry_date: date(2024, 1, 31),
            duration: 1,
            status: MemberStatus::Expired,
            ..Default::default()
        };
        let member = extend_membership(&member).unwrap();
        assert_eq!(member.expiry_date, date(2024, 2, 29));
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_record_renewal() {
        let (_handle, db) = connection::open_test().await;
        let member = expired_member(&db).await;

        let (payment, member) = record_payment(&db, renewal(member.id)).await.unwrap();
        assert_eq!(member.expiry_date, date(2025, 2, 1));
        assert_eq!(member.status, MemberStatus::Active);

        assert_eq!(payment.member_name, "Renewing Member");
        assert_eq!(payment.status, "Completed");
        assert_eq!(payment.kind, PaymentKind::Renewal);
        // Blank reference is stored as absent
        assert_eq!(payment.reference, None);

        let stored: Member = db.retrieve(member.id).await.unwrap();
        assert_eq!(stored.expiry_date, date(2025, 2, 1));
    }

    #[tokio::test]
    async fn test_record_other_payment_keeps_expiry() {
        let (_handle, db) = connection::open_test().await;
        let member = expired_member(&db).await;

        let (payment, member) = record_payment(
            &db,
            NewPayment {
                kind: PaymentKind::from("Locker"),
                ..renewal(member.id)
            },
        )
        .await
        .unwrap();
        assert_eq!(payment.kind, PaymentKind::Other("Locker".to_string()));
        assert_eq!(member.expiry_date, date(2025, 1, 1));
        assert_eq!(member.status, MemberStatus::Expired);
    }

    #[tokio::test]
    async fn test_record_payment_missing_member() {
        let (_handle, db) = connection::open_test().await;
        let result = record_payment(&db, renewal(42)).await;
        assert!(matches!(result, Err(PaymentError::MemberNotFound(42))));

        let payments: Vec<Payment> =
            db.query(&PaymentFilter::default()).await.unwrap();
        assert!(payments.is_empty());
    }
}
