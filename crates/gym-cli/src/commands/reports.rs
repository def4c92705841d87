use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use gym_db::Connection;
use gym_membership::reports::Records;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Reports {
    /// Counters, recent members and upcoming renewals
    #[clap(name = "dashboard")]
    Dashboard(ShowDashboard),
    /// Revenue, membership, trainer and attendance figures
    #[clap(name = "summary")]
    Summary(ShowSummary),
}

impl Reports {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        match self {
            Reports::Dashboard(cmd) => cmd.run(db, today).await,
            Reports::Summary(cmd) => cmd.run(db, today).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowDashboard {
    /// Print as JSON
    #[clap(long)]
    pub json: bool,
}

impl ShowDashboard {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let records = Records::load(db).await?;
        let mut dashboard = records.dashboard(today);
        for member in dashboard
            .recent_members
            .iter_mut()
            .chain(dashboard.upcoming_renewals.iter_mut())
        {
            member.status = member.status_on(today);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        } else {
            dashboard.print_formatted();
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowSummary {
    /// Number of days in the daily breakdown
    #[clap(short, long, default_value_t = 7)]
    pub days: usize,
    /// Print as JSON
    #[clap(long)]
    pub json: bool,
}

impl ShowSummary {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let records = Records::load(db).await?;
        let report = records.report(today, self.days);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.print_formatted();
        }
        Ok(())
    }
}
