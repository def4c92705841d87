use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use gym_data::{
    Attendance,
    AttendanceFilter,
    Member,
    MemberFilter,
    MemberStatus,
    Money,
    Payment,
    PaymentFilter,
    Query,
    Trainer,
    TrainerFilter,
};

use crate::datetime::{last_n_days, month_end, month_start};

/// Members expiring within this many days count as upcoming renewals
pub const RENEWAL_WINDOW_DAYS: i64 = 30;

const DASHBOARD_LIST_LEN: usize = 5;

/// Sum of payments dated within `from..=to`
pub fn revenue_between(payments: &[Payment], from: NaiveDate, to: NaiveDate) -> Money {
    payments
        .iter()
        .filter(|p| p.date >= from && p.date <= to)
        .map(|p| p.amount)
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total: Money,
    pub today: Money,
    /// Payments dated anywhere in the current calendar month
    pub month: Money,
    pub count: usize,
}

pub fn revenue_summary(payments: &[Payment], today: NaiveDate) -> RevenueSummary {
    RevenueSummary {
        total: payments.iter().map(|p| p.amount).sum(),
        today: revenue_between(payments, today, today),
        month: revenue_between(payments, month_start(today), month_end(today)),
        count: payments.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub revenue: Money,
    pub attendance: usize,
}

/// Revenue and visits per day for the last `days` days,
/// oldest first. Days without activity are reported as zero.
pub fn daily_activity(
    payments: &[Payment],
    attendance: &[Attendance],
    today: NaiveDate,
    days: usize,
) -> Vec<DailyPoint> {
    let mut points: BTreeMap<NaiveDate, DailyPoint> = last_n_days(today, days)
        .into_iter()
        .map(|date| {
            let point = DailyPoint {
                date,
                revenue: Money::ZERO,
                attendance: 0,
            };
            (date, point)
        })
        .collect();

    for payment in payments {
        if let Some(point) = points.get_mut(&payment.date) {
            point.revenue += payment.amount;
        }
    }
    for record in attendance {
        if let Some(point) = points.get_mut(&record.date) {
            point.attendance += 1;
        }
    }
    points.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindTotal {
    pub kind: String,
    pub total: Money,
    pub count: usize,
}

/// Payment sums grouped by payment type, ordered by type name
pub fn revenue_by_kind(payments: &[Payment]) -> Vec<KindTotal> {
    let mut groups: BTreeMap<String, KindTotal> = BTreeMap::new();
    for payment in payments {
        let kind = payment.kind.to_string();
        let group = groups.entry(kind.clone()).or_insert(KindTotal {
            kind,
            total: Money::ZERO,
            count: 0,
        });
        group.total += payment.amount;
        group.count += 1;
    }
    groups.into_values().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub today: usize,
    /// Visits from seven days ago up to today
    pub week: usize,
    /// Visits in the current calendar month
    pub month: usize,
}

pub fn attendance_summary(records: &[Attendance], today: NaiveDate) -> AttendanceSummary {
    let count_between = |from: NaiveDate, to: NaiveDate| {
        records
            .iter()
            .filter(|r| r.date >= from && r.date <= to)
            .count()
    };
    AttendanceSummary {
        today: count_between(today, today),
        week: count_between(today - Duration::days(7), today),
        month: count_between(month_start(today), month_end(today)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainerSummary {
    pub total: usize,
    pub active: usize,
    /// Monthly salary of the active trainers
    pub monthly_salary: Money,
}

pub fn trainer_summary(trainers: &[Trainer]) -> TrainerSummary {
    let active: Vec<&Trainer> = trainers.iter().filter(|t| t.is_active()).collect();
    TrainerSummary {
        total: trainers.len(),
        active: active.len(),
        monthly_salary: active.iter().map(|t| t.salary).sum(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MembershipSummary {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub expiring_soon: usize,
}

fn renewal_due(member: &Member, today: NaiveDate) -> bool {
    member.expiry_date >= today
        && member.expiry_date <= today + Duration::days(RENEWAL_WINDOW_DAYS)
}

/// Membership counts by derived status
pub fn membership_summary(members: &[Member], today: NaiveDate) -> MembershipSummary {
    let expired = members
        .iter()
        .filter(|m| m.status_on(today) == MemberStatus::Expired)
        .count();
    MembershipSummary {
        total: members.len(),
        active: members.len() - expired,
        expired,
        expiring_soon: members.iter().filter(|m| renewal_due(m, today)).count(),
    }
}

/// Members with a renewal due in the next days, soonest first
pub fn upcoming_renewals(members: &[Member], today: NaiveDate) -> Vec<Member> {
    let mut due: Vec<Member> = members
        .iter()
        .filter(|m| renewal_due(m, today))
        .cloned()
        .collect();
    due.sort_by_key(|m| (m.expiry_date, m.id));
    due
}

/// Most recently added members first
pub fn recent_members(members: &[Member]) -> Vec<Member> {
    let mut recent = members.to_vec();
    recent.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    recent
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub members: usize,
    pub trainers: usize,
    pub total_revenue: Money,
    pub today_attendance: usize,
    pub recent_members: Vec<Member>,
    pub upcoming_renewals: Vec<Member>,
}

pub fn build_dashboard(
    today: NaiveDate,
    members: &[Member],
    trainers: &[Trainer],
    payments: &[Payment],
    attendance: &[Attendance],
) -> Dashboard {
    let mut recent = recent_members(members);
    recent.truncate(DASHBOARD_LIST_LEN);
    let mut renewals = upcoming_renewals(members, today);
    renewals.truncate(DASHBOARD_LIST_LEN);

    Dashboard {
        members: members.len(),
        trainers: trainers.len(),
        total_revenue: payments.iter().map(|p| p.amount).sum(),
        today_attendance: attendance.iter().filter(|r| r.date == today).count(),
        recent_members: recent,
        upcoming_renewals: renewals,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub date: NaiveDate,
    pub revenue: RevenueSummary,
    pub by_kind: Vec<KindTotal>,
    pub daily: Vec<DailyPoint>,
    pub attendance: AttendanceSummary,
    pub trainers: TrainerSummary,
    pub members: MembershipSummary,
}

pub fn build_report(
    today: NaiveDate,
    days: usize,
    members: &[Member],
    trainers: &[Trainer],
    payments: &[Payment],
    attendance: &[Attendance],
) -> Report {
    Report {
        date: today,
        revenue: revenue_summary(payments, today),
        by_kind: revenue_by_kind(payments),
        daily: daily_activity(payments, attendance, today, days),
        attendance: attendance_summary(attendance, today),
        trainers: trainer_summary(trainers),
        members: membership_summary(members, today),
    }
}

/// All records the reports are computed from
pub struct Records {
    pub members: Vec<Member>,
    pub trainers: Vec<Trainer>,
    pub payments: Vec<Payment>,
    pub attendance: Vec<Attendance>,
}

impl Records {
    pub async fn load<DB>(db: &DB) -> Result<Self>
    where
        DB: Query<Member, Filter = MemberFilter>
            + Query<Trainer, Filter = TrainerFilter>
            + Query<Payment, Filter = PaymentFilter>
            + Query<Attendance, Filter = AttendanceFilter>
            + Send
            + Sync,
    {
        let members: Vec<Member> = db.query(&MemberFilter::default()).await?;
        let trainers: Vec<Trainer> = db.query(&TrainerFilter::default()).await?;
        let payments: Vec<Payment> = db.query(&PaymentFilter::default()).await?;
        let attendance: Vec<Attendance> = db.query(&AttendanceFilter::default()).await?;
        tracing::debug!(
            members = members.len(),
            trainers = trainers.len(),
            payments = payments.len(),
            attendance = attendance.len(),
            "loaded records for reports"
        );
        Ok(Self {
            members,
            trainers,
            payments,
            attendance,
        })
    }

    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        build_dashboard(
            today,
            &self.members,
            &self.trainers,
            &self.payments,
            &self.attendance,
        )
    }

    pub fn report(&self, today: NaiveDate, days: usize) -> Report {
        build_report(
            today,
            days,
            &self.members,
            &self.trainers,
            &self.payments,
            &self.attendance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gym_data::{Insert, PaymentKind, TrainerStatus};
    use gym_db::connection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(day: NaiveDate, cents: i64, kind: &str) -> Payment {
        Payment {
            date: day,
            amount: Money::from_cents(cents),
            kind: PaymentKind::from(kind),
            ..Default::default()
        }
    }

    fn visit(day: NaiveDate) -> Attendance {
        Attendance {
            date: day,
            ..Default::default()
        }
    }

    fn member(id: u32, expiry_date: NaiveDate) -> Member {
        Member {
            id,
            expiry_date,
            ..Default::default()
        }
    }

    #[test]
    fn test_revenue_between_is_inclusive() {
        let payments = vec![
            payment(date(2024, 3, 1), 1000, "Renewal"),
            payment(date(2024, 3, 15), 2550, "Renewal"),
            payment(date(2024, 3, 31), 10, "Renewal"),
            payment(date(2024, 4, 1), 99999, "Renewal"),
        ];
        let sum = revenue_between(&payments, date(2024, 3, 1), date(2024, 3, 31));
        assert_eq!(sum, Money::from_cents(3560));
        assert_eq!(
            revenue_between(&[], date(2024, 3, 1), date(2024, 3, 31)),
            Money::ZERO
        );
    }

    #[test]
    fn test_revenue_summary() {
        let today = date(2024, 3, 10);
        let payments = vec![
            payment(date(2024, 2, 28), 5000, "Renewal"),
            payment(date(2024, 3, 2), 1010, "Membership Fee"),
            payment(today, 2020, "Locker"),
            // Booked ahead, still this month
            payment(date(2024, 3, 20), 5000, "Renewal"),
            payment(date(2024, 4, 1), 700, "Renewal"),
        ];
        let summary = revenue_summary(&payments, today);
        assert_eq!(
            summary,
            RevenueSummary {
                total: Money::from_cents(13730),
                today: Money::from_cents(2020),
                month: Money::from_cents(8030),
                count: 5,
            }
        );
    }

    #[test]
    fn test_daily_activity_zero_fills() {
        let today = date(2024, 3, 2);
        let payments = vec![
            payment(date(2024, 3, 1), 500, "Renewal"),
            payment(date(2024, 3, 1), 250, "Renewal"),
            // Outside the window
            payment(date(2024, 2, 1), 100, "Renewal"),
        ];
        let attendance = vec![visit(today), visit(today), visit(date(2024, 2, 29))];
        let daily = daily_activity(&payments, &attendance, today, 3);
        assert_eq!(
            daily,
            vec![
                DailyPoint {
                    date: date(2024, 2, 29),
                    revenue: Money::ZERO,
                    attendance: 1,
                },
                DailyPoint {
                    date: date(2024, 3, 1),
                    revenue: Money::from_cents(750),
                    attendance: 0,
                },
                DailyPoint {
                    date: today,
                    revenue: Money::ZERO,
                    attendance: 2,
                },
            ]
        );
    }

    #[test]
    fn test_revenue_by_kind() {
        let day = date(2024, 1, 1);
        let payments = vec![
            payment(day, 100, "Renewal"),
            payment(day, 250, "Membership Fee"),
            payment(day, 50, "Renewal"),
        ];
        let groups = revenue_by_kind(&payments);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, "Membership Fee");
        assert_eq!(groups[0].total, Money::from_cents(250));
        assert_eq!(groups[1].kind, "Renewal");
        assert_eq!(groups[1].total, Money::from_cents(150));
        assert_eq!(groups[1].count, 2);
    }

    #[test]
    fn test_attendance_summary() {
        let today = date(2024, 3, 9);
        let records = vec![
            visit(today),
            visit(date(2024, 3, 2)),
            visit(date(2024, 3, 1)),
            visit(date(2024, 2, 29)),
        ];
        let summary = attendance_summary(&records, today);
        assert_eq!(summary.today, 1);
        assert_eq!(summary.week, 2);
        assert_eq!(summary.month, 3);
    }

    #[test]
    fn test_trainer_summary() {
        let trainers = vec![
            Trainer {
                salary: Money::from_units(2000),
                ..Default::default()
            },
            Trainer {
                salary: Money::from_units(1500),
                status: TrainerStatus::Inactive,
                ..Default::default()
            },
        ];
        let summary = trainer_summary(&trainers);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.monthly_salary, Money::from_units(2000));
    }

    #[test]
    fn test_membership_summary_uses_derived_status() {
        let today = date(2024, 6, 1);
        let members = vec![
            // Stored as active but lapsed
            member(1, date(2024, 5, 31)),
            member(2, today),
            member(3, date(2024, 7, 1)),
            member(4, date(2024, 9, 1)),
        ];
        let summary = membership_summary(&members, today);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.expiring_soon, 2);
    }

    #[test]
    fn test_dashboard_lists() {
        let today = date(2024, 6, 1);
        let members: Vec<Member> = (1..=8)
            .map(|id| member(id, today + Duration::days(id as i64 * 3)))
            .collect();
        let dashboard = build_dashboard(today, &members, &[], &[], &[visit(today)]);
        assert_eq!(dashboard.members, 8);
        assert_eq!(dashboard.today_attendance, 1);
        assert_eq!(dashboard.recent_members.len(), 5);
        assert_eq!(dashboard.recent_members[0].id, 8);

        let due: Vec<u32> = dashboard.upcoming_renewals.iter().map(|m| m.id).collect();
        assert_eq!(due, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_load_records() {
        let (_handle, db) = connection::open_test().await;
        let today = date(2024, 6, 1);
        db.insert(Member {
            name: "Someone".to_string(),
            expiry_date: date(2024, 6, 10),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(payment(today, 4000, "Renewal")).await.unwrap();

        let records = Records::load(&db).await.unwrap();
        let dashboard = records.dashboard(today);
        assert_eq!(dashboard.members, 1);
        assert_eq!(dashboard.total_revenue, Money::from_units(40));
        assert_eq!(dashboard.upcoming_renewals.len(), 1);

        let report = records.report(today, 7);
        assert_eq!(report.daily.len(), 7);
        assert_eq!(report.daily[6].revenue, Money::from_units(40));
    }
}
