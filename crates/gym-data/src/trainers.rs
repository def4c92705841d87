use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Money;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(type_name = "TEXT")]
pub enum TrainerStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for TrainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerStatus::Active => f.write_str("Active"),
            TrainerStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TrainerFilter {
    pub id: Option<u32>,
    /// Substring match on name, email, phone or specialization
    pub search: Option<String>,
    pub status: Option<TrainerStatus>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Trainer {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub specialization: String,
    /// Years of experience
    pub experience: u32,
    /// Monthly salary
    pub salary: Money,
    pub join_date: NaiveDate,
    pub certification: Option<String>,
    pub address: String,
    pub bio: Option<String>,
    pub status: TrainerStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Trainer {
    pub fn is_active(&self) -> bool {
        self.status == TrainerStatus::Active
    }
}
