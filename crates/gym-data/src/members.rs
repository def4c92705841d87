use std::fmt;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    Attendance,
    AttendanceFilter,
    Money,
    Payment,
    PaymentFilter,
    Query,
};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(type_name = "TEXT")]
pub enum MemberStatus {
    #[default]
    Active,
    Expired,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A membership is expired once the expiry date lies strictly
/// before today. The time of day plays no role.
pub fn derive_status(today: NaiveDate, expiry_date: NaiveDate) -> MemberStatus {
    if expiry_date < today {
        MemberStatus::Expired
    } else {
        MemberStatus::Active
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<u32>,
    /// Substring match on name, email or phone
    pub search: Option<String>,
    pub email: Option<String>,
    pub trainer_id: Option<u32>,
    pub expiring_after: Option<NaiveDate>,
    pub expiring_before: Option<NaiveDate>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub address: String,
    pub join_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// Subscribed period in months
    pub duration: u32,
    pub fee: Money,
    pub trainer_id: Option<u32>,
    /// Last written status. Use `status_on` for decisions.
    pub status: MemberStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Member {
    /// The membership status as of `today`, ignoring
    /// whatever was stored last.
    pub fn status_on(&self, today: NaiveDate) -> MemberStatus {
        derive_status(today, self.expiry_date)
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.status_on(today) == MemberStatus::Active
    }

    /// Get payments recorded for this member
    pub async fn get_payments<DB>(&self, db: &DB) -> Result<Vec<Payment>>
    where
        DB: Query<Payment, Filter = PaymentFilter>,
    {
        let payments = db
            .query(&PaymentFilter {
                member_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(payments)
    }

    /// Get attendance records of this member
    pub async fn get_attendance<DB>(&self, db: &DB) -> Result<Vec<Attendance>>
    where
        DB: Query<Attendance, Filter = AttendanceFilter>,
    {
        let records = db
            .query(&AttendanceFilter {
                member_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_status() {
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(derive_status(d2, d1), MemberStatus::Expired);
        assert_eq!(derive_status(d1, d2), MemberStatus::Active);
        // Expiring today is still active
        assert_eq!(derive_status(d1, d1), MemberStatus::Active);
    }

    #[test]
    fn test_status_on_ignores_stored_status() {
        let member = Member {
            expiry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: MemberStatus::Active,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(member.status_on(today), MemberStatus::Expired);
        assert!(!member.is_active(today));
    }
}
