use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Money;

/// Payment type. The set is open: anything not known
/// is kept verbatim as `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentKind {
    #[default]
    MembershipFee,
    Renewal,
    Other(String),
}

impl PaymentKind {
    /// Renewals and membership fees push the expiry
    /// date of the member forward.
    pub fn extends_membership(&self) -> bool {
        matches!(self, PaymentKind::MembershipFee | PaymentKind::Renewal)
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentKind::MembershipFee => f.write_str("Membership Fee"),
            PaymentKind::Renewal => f.write_str("Renewal"),
            PaymentKind::Other(kind) => f.write_str(kind),
        }
    }
}

impl From<String> for PaymentKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "Membership Fee" => PaymentKind::MembershipFee,
            "Renewal" => PaymentKind::Renewal,
            _ => PaymentKind::Other(kind),
        }
    }
}

impl From<&str> for PaymentKind {
    fn from(kind: &str) -> Self {
        kind.to_string().into()
    }
}

impl From<PaymentKind> for String {
    fn from(kind: PaymentKind) -> Self {
        kind.to_string()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentFilter {
    pub id: Option<u32>,
    pub member_id: Option<u32>,
    pub kind: Option<PaymentKind>,
    pub method: Option<String>,
    pub date: Option<NaiveDate>,
    pub date_before: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub member_id: u32,
    /// Name of the member when the payment was recorded
    pub member_name: String,
    #[sqlx(try_from = "String")]
    pub kind: PaymentKind,
    pub amount: Money,
    pub method: String,
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Payment {
    pub const COMPLETED: &'static str = "Completed";
    pub const CASH: &'static str = "Cash";
}
