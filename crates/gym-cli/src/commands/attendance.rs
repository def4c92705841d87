use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};

use gym_data::{Attendance, AttendanceFilter, Delete, Query, Retrieve};
use gym_db::Connection;
use gym_export::export_attendance;
use gym_membership::attendance::{mark_attendance, mark_check_out, CheckIn};

use crate::cli::{now, parse_time};
use crate::commands::{confirm, write_export};
use crate::formatting::PrintFormatted;

/// Number of records listed unless a limit is given
const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Subcommand, Debug)]
pub enum AttendanceLog {
    /// List attendance, most recent first
    #[clap(name = "list")]
    List(ListAttendance),
    /// Check a member in
    #[clap(name = "check-in")]
    CheckIn(CheckInMember),
    /// Check a member out
    #[clap(name = "check-out")]
    CheckOut(CheckOutMember),
    /// Delete an attendance record
    #[clap(name = "delete")]
    Delete(DeleteAttendance),
    /// Export attendance as CSV
    #[clap(name = "export")]
    Export(ExportAttendance),
}

impl AttendanceLog {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        match self {
            AttendanceLog::List(cmd) => cmd.run(db).await,
            AttendanceLog::CheckIn(cmd) => cmd.run(db, today).await,
            AttendanceLog::CheckOut(cmd) => cmd.run(db).await,
            AttendanceLog::Delete(cmd) => cmd.run(db).await,
            AttendanceLog::Export(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListAttendance {
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short, long)]
    pub member_id: Option<u32>,
    #[clap(short, long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: u32,
}

impl ListAttendance {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = AttendanceFilter {
            date: self.date,
            member_id: self.member_id,
            limit: Some(self.limit),
            ..Default::default()
        };
        let records: Vec<Attendance> = db.query(&filter).await?;
        println!("{} records.", records.len());
        records.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CheckInMember {
    #[clap(short, long)]
    pub member_id: u32,
    /// Defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    /// Check-in time, defaults to now
    #[clap(short = 'i', long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
    /// Record the check-out right away
    #[clap(short = 'o', long, value_parser = parse_time)]
    pub check_out: Option<NaiveTime>,
}

impl CheckInMember {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let check_in = CheckIn {
            member_id: self.member_id,
            date: self.date.unwrap_or(today),
            check_in: self.time.unwrap_or_else(now),
            check_out: self.check_out,
        };
        let record = mark_attendance(db, check_in, today).await?;
        println!(
            "{} checked in at {} (record {}).",
            record.member_name,
            record.check_in.format("%H:%M"),
            record.id
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CheckOutMember {
    /// Attendance record
    #[clap(short, long)]
    pub id: u32,
    /// Check-out time, defaults to now
    #[clap(short, long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
}

impl CheckOutMember {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let record = mark_check_out(db, self.id, self.time.unwrap_or_else(now)).await?;
        vec![record].print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteAttendance {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteAttendance {
    pub async fn run(&self, db: &Connection) -> Result<()> {
        let record: Attendance = db.retrieve(self.id).await?;
        println!();
        vec![record.clone()].print_formatted();
        println!();
        if !confirm("Delete attendance record?")? {
            return Ok(());
        }
        db.delete(record).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExportAttendance {
    #[clap(short, long, default_value = "attendance.csv")]
    pub file: String,
}

impl ExportAttendance {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let records: Vec<Attendance> = db.query(&AttendanceFilter::default()).await?;
        let count = write_export(&self.file, |out| export_attendance(out, &records))?;
        println!("{} records exported to {}.", count, self.file);
        Ok(())
    }
}
