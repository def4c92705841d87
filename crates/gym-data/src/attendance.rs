use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AttendanceFilter {
    pub id: Option<u32>,
    pub member_id: Option<u32>,
    pub date: Option<NaiveDate>,
    pub date_before: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// A visit of a member on one day
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Attendance {
    pub id: u32,
    pub member_id: u32,
    /// Name of the member when the visit was recorded
    pub member_name: String,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Attendance {
    pub fn is_checked_out(&self) -> bool {
        self.check_out.is_some()
    }
}
