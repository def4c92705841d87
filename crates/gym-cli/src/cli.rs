use chrono::{NaiveDate, NaiveTime, Timelike};
use clap::{Parser, Subcommand};

use gym_membership::datetime;

use crate::commands::{
    AttendanceLog,
    Members,
    Payments,
    Reports,
    Trainers,
};

#[derive(Parser, Debug)]
#[clap(name = "gym", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Database file
    #[clap(long, env = "GYM_DB", default_value = "gym.sqlite3", global = true)]
    pub db: String,

    /// Use this date as today instead of the local date
    #[clap(long, global = true)]
    pub today: Option<NaiveDate>,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(datetime::today)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage members
    #[clap(subcommand)]
    Members(Members),
    /// Manage trainers
    #[clap(subcommand)]
    Trainers(Trainers),
    /// Record and list payments
    #[clap(subcommand)]
    Payments(Payments),
    /// Check members in and out
    #[clap(subcommand, name = "attendance")]
    Attendance(AttendanceLog),
    /// Show reports
    #[clap(subcommand)]
    Reports(Reports),
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("invalid time {}, expected HH:MM", value))
}

/// The current local time, to the minute
pub fn now() -> NaiveTime {
    let now = chrono::Local::now().time();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
