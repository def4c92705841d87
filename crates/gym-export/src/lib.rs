use std::io::Write;

use chrono::{NaiveDate, NaiveTime};
use csv::Writer;
use thiserror::Error as ThisError;

use gym_data::{Attendance, Member, Payment, Trainer};
use gym_membership::attendance::{format_duration, AttendanceError};

/// Placeholder for missing optional text such as phone,
/// reference, notes or certification
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a missing check-out
pub const NOT_CHECKED_OUT: &str = "-";

#[derive(ThisError, Debug)]
pub enum ExportError {
    #[error("no {0} to export")]
    NothingToExport(&'static str),

    #[error(transparent)]
    Attendance(#[from] AttendanceError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn or_not_available(value: &Option<String>) -> String {
    match value {
        Some(value) => text_or_not_available(value),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Optional text fields are stored blank when left out
fn text_or_not_available(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn ensure_any<T>(records: &[T], what: &'static str) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::NothingToExport(what));
    }
    Ok(())
}

/// Write members as CSV. The status column shows the
/// status as of `today`.
pub fn export_members<W: Write>(
    out: W,
    members: &[Member],
    today: NaiveDate,
) -> Result<usize, ExportError> {
    ensure_any(members, "members")?;
    let mut wtr = Writer::from_writer(out);
    wtr.write_record([
        "Name",
        "Email",
        "Phone",
        "Gender",
        "Join Date",
        "Expiry Date",
        "Duration",
        "Fee",
        "Status",
    ])?;
    for m in members {
        wtr.write_record([
            m.name.clone(),
            m.email.clone(),
            text_or_not_available(&m.phone),
            text_or_not_available(&m.gender),
            m.join_date.to_string(),
            m.expiry_date.to_string(),
            format!("{} months", m.duration),
            m.fee.to_string(),
            m.status_on(today).to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(members.len())
}

pub fn export_trainers<W: Write>(
    out: W,
    trainers: &[Trainer],
) -> Result<usize, ExportError> {
    ensure_any(trainers, "trainers")?;
    let mut wtr = Writer::from_writer(out);
    wtr.write_record([
        "Name",
        "Email",
        "Phone",
        "Gender",
        "Specialization",
        "Experience (Years)",
        "Monthly Salary",
        "Join Date",
        "Certification",
        "Status",
    ])?;
    for t in trainers {
        wtr.write_record([
            t.name.clone(),
            t.email.clone(),
            text_or_not_available(&t.phone),
            text_or_not_available(&t.gender),
            text_or_not_available(&t.specialization),
            t.experience.to_string(),
            t.salary.to_string(),
            t.join_date.to_string(),
            or_not_available(&t.certification),
            t.status.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(trainers.len())
}

pub fn export_payments<W: Write>(
    out: W,
    payments: &[Payment],
) -> Result<usize, ExportError> {
    ensure_any(payments, "payments")?;
    let mut wtr = Writer::from_writer(out);
    wtr.write_record([
        "Date",
        "Member Name",
        "Type",
        "Amount",
        "Method",
        "Status",
        "Reference",
        "Notes",
    ])?;
    for p in payments {
        wtr.write_record([
            p.date.to_string(),
            p.member_name.clone(),
            p.kind.to_string(),
            p.amount.to_string(),
            p.method.clone(),
            p.status.clone(),
            or_not_available(&p.reference),
            or_not_available(&p.notes),
        ])?;
    }
    wtr.flush()?;
    Ok(payments.len())
}

/// Write attendance records as CSV. Fails on a record
/// checked out before it was checked in.
pub fn export_attendance<W: Write>(
    out: W,
    records: &[Attendance],
) -> Result<usize, ExportError> {
    ensure_any(records, "attendance records")?;
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["Member Name", "Date", "Check-In", "Check-Out", "Duration"])?;
    for r in records {
        let check_out = match r.check_out {
            Some(time) => format_time(time),
            None => NOT_CHECKED_OUT.to_string(),
        };
        wtr.write_record([
            r.member_name.clone(),
            r.date.to_string(),
            format_time(r.check_in),
            check_out,
            format_duration(r)?,
        ])?;
    }
    wtr.flush()?;
    Ok(records.len())
}
