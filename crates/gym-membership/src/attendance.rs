use chrono::{NaiveDate, NaiveTime};
use thiserror::Error as ThisError;

use gym_data::{
    Attendance,
    AttendanceFilter,
    Insert,
    Member,
    MemberFilter,
    Query,
    Update,
};

#[derive(ThisError, Debug)]
pub enum AttendanceError {
    #[error("member {0} not found")]
    MemberNotFound(u32),

    #[error("attendance record {0} not found")]
    NotFound(u32),

    #[error("attendance already marked for member {member_id} on {date}")]
    Duplicate { member_id: u32, date: NaiveDate },

    #[error("check-out {check_out} is before check-in {check_in}")]
    CheckOutBeforeCheckIn {
        check_in: NaiveTime,
        check_out: NaiveTime,
    },

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct CheckIn {
    pub member_id: u32,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
}

fn check_order(
    check_in: NaiveTime,
    check_out: Option<NaiveTime>,
) -> Result<(), AttendanceError> {
    match check_out {
        Some(check_out) if check_out < check_in => {
            Err(AttendanceError::CheckOutBeforeCheckIn {
                check_in,
                check_out,
            })
        }
        _ => Ok(()),
    }
}

/// Mark a member as present. There is at most one
/// record per member and day.
pub async fn mark_attendance<DB>(
    db: &DB,
    check_in: CheckIn,
    today: NaiveDate,
) -> Result<Attendance, AttendanceError>
where
    DB: Query<Member, Filter = MemberFilter>
        + Query<Attendance, Filter = AttendanceFilter>
        + Insert<Attendance>
        + Send
        + Sync,
{
    check_order(check_in.check_in, check_in.check_out)?;

    let member: Member = db
        .query(&MemberFilter {
            id: Some(check_in.member_id),
            ..Default::default()
        })
        .await?
        .pop()
        .ok_or(AttendanceError::MemberNotFound(check_in.member_id))?;

    let existing: Vec<Attendance> = db
        .query(&AttendanceFilter {
            member_id: Some(member.id),
            date: Some(check_in.date),
            ..Default::default()
        })
        .await?;
    if !existing.is_empty() {
        tracing::warn!(
            member_id = member.id,
            date = %check_in.date,
            "attendance already marked"
        );
        return Err(AttendanceError::Duplicate {
            member_id: member.id,
            date: check_in.date,
        });
    }

    if !member.is_active(today) {
        tracing::warn!(
            member_id = member.id,
            expiry_date = %member.expiry_date,
            "checking in member with expired membership"
        );
    }

    let record = db
        .insert(Attendance {
            member_id: member.id,
            member_name: member.name,
            date: check_in.date,
            check_in: check_in.check_in,
            check_out: check_in.check_out,
            ..Default::default()
        })
        .await?;
    Ok(record)
}

/// Set the check-out time of an attendance record
pub async fn mark_check_out<DB>(
    db: &DB,
    attendance_id: u32,
    check_out: NaiveTime,
) -> Result<Attendance, AttendanceError>
where
    DB: Query<Attendance, Filter = AttendanceFilter> + Update<Attendance> + Send + Sync,
{
    let record: Attendance = db
        .query(&AttendanceFilter {
            id: Some(attendance_id),
            ..Default::default()
        })
        .await?
        .pop()
        .ok_or(AttendanceError::NotFound(attendance_id))?;

    check_order(record.check_in, Some(check_out))?;

    let record = db
        .update(Attendance {
            check_out: Some(check_out),
            ..record
        })
        .await?;
    Ok(record)
}

/// Minutes between check-in and check-out, if checked out
pub fn session_minutes(record: &Attendance) -> Result<Option<i64>, AttendanceError> {
    let Some(check_out) = record.check_out else {
        return Ok(None);
    };
    check_order(record.check_in, Some(check_out))?;
    Ok(Some((check_out - record.check_in).num_minutes()))
}

/// Session length as `"{h}h {m}m"`, or `"-"` while
/// the member has not checked out.
pub fn format_duration(record: &Attendance) -> Result<String, AttendanceError> {
    let duration = match session_minutes(record)? {
        Some(minutes) => format!("{}h {}m", minutes / 60, minutes % 60),
        None => "-".to_string(),
    };
    Ok(duration)
}
