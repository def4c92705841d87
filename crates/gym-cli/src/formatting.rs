use gym_data::{Attendance, Member, Payment, Trainer};
use gym_membership::{
    attendance::format_duration,
    reports::{Dashboard, Report},
};

macro_rules! next_attr {
    ($old:ident, $new:ident) => {
        if $old != $new {
            format!(" -> {}", $new)
        } else {
            "".to_string()
        }
    };
    ($old:ident, $new:ident, $attr:ident) => {
        if $old.$attr != $new.$attr {
            format!(" -> {}", $new.$attr)
        } else {
            "".to_string()
        }
    };
}

pub trait PrintFormatted {
    fn print_formatted(&self);
}

fn or_none(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "None".to_string())
}

fn trainer_ref(trainer_id: Option<u32>) -> String {
    match trainer_id {
        Some(id) => id.to_string(),
        None => "None".to_string(),
    }
}

impl PrintFormatted for Member {
    fn print_formatted(&self) {
        println!("Name:\t\t\t{}", self.name);
        println!("Email:\t\t\t{}", self.email);
        println!("Phone:\t\t\t{}", self.phone);
        println!("Gender:\t\t\t{}", self.gender);
        println!("Address:\t\t{}", self.address);
        println!("Joined:\t\t\t{}", self.join_date);
        println!("Expires:\t\t{}", self.expiry_date);
        println!("Duration:\t\t{} months", self.duration);
        println!("Fee:\t\t\t{}", self.fee);
        println!("Trainer:\t\t{}", trainer_ref(self.trainer_id));
        println!("Status:\t\t\t{}", self.status);
    }
}

impl PrintFormatted for (Member, Member) {
    fn print_formatted(&self) {
        let (old, new) = self;
        let trainer_old = trainer_ref(old.trainer_id);
        let trainer_new = trainer_ref(new.trainer_id);

        let next_name = next_attr!(old, new, name);
        println!("Name:\t\t\t{}{}", old.name, next_name);
        let next_email = next_attr!(old, new, email);
        println!("Email:\t\t\t{}{}", old.email, next_email);
        let next_phone = next_attr!(old, new, phone);
        println!("Phone:\t\t\t{}{}", old.phone, next_phone);
        let next_gender = next_attr!(old, new, gender);
        println!("Gender:\t\t\t{}{}", old.gender, next_gender);
        let next_address = next_attr!(old, new, address);
        println!("Address:\t\t{}{}", old.address, next_address);
        let next_join_date = next_attr!(old, new, join_date);
        println!("Joined:\t\t\t{}{}", old.join_date, next_join_date);
        let next_expiry_date = next_attr!(old, new, expiry_date);
        println!("Expires:\t\t{}{}", old.expiry_date, next_expiry_date);
        let next_duration = next_attr!(old, new, duration);
        println!("Duration:\t\t{}{}", old.duration, next_duration);
        let next_fee = next_attr!(old, new, fee);
        println!("Fee:\t\t\t{}{}", old.fee, next_fee);
        let next_trainer = next_attr!(trainer_old, trainer_new);
        println!("Trainer:\t\t{}{}", trainer_old, next_trainer);
        let next_status = next_attr!(old, new, status);
        println!("Status:\t\t\t{}{}", old.status, next_status);
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:<30}\t{:<14}\t{:<10}\t{:<10}\t{:>8}\t{:>10}\t{}",
            "ID", "Name", "Email", "Phone", "Joined", "Expires", "Months", "Fee", "Status"
        );
        println!("{:-<160}", "-");
        for m in self {
            println!(
                "{:>4}\t{:<24}\t{:<30}\t{:<14}\t{:<10}\t{:<10}\t{:>8}\t{:>10}\t{}",
                m.id,
                m.name,
                m.email,
                m.phone,
                m.join_date,
                m.expiry_date,
                m.duration,
                m.fee,
                m.status
            );
        }
    }
}

impl PrintFormatted for Trainer {
    fn print_formatted(&self) {
        println!("Name:\t\t\t{}", self.name);
        println!("Email:\t\t\t{}", self.email);
        println!("Phone:\t\t\t{}", self.phone);
        println!("Gender:\t\t\t{}", self.gender);
        println!("Specialization:\t\t{}", self.specialization);
        println!("Experience:\t\t{} years", self.experience);
        println!("Salary:\t\t\t{}", self.salary);
        println!("Joined:\t\t\t{}", self.join_date);
        println!("Certification:\t\t{}", or_none(&self.certification));
        println!("Address:\t\t{}", self.address);
        println!("Bio:\t\t\t{}", or_none(&self.bio));
        println!("Status:\t\t\t{}", self.status);
    }
}

impl PrintFormatted for Vec<Trainer> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:<30}\t{:<20}\t{:>6}\t{:>10}\t{}",
            "ID", "Name", "Email", "Specialization", "Years", "Salary", "Status"
        );
        println!("{:-<140}", "-");
        for t in self {
            println!(
                "{:>4}\t{:<24}\t{:<30}\t{:<20}\t{:>6}\t{:>10}\t{}",
                t.id, t.name, t.email, t.specialization, t.experience, t.salary, t.status
            );
        }
    }
}

impl PrintFormatted for Payment {
    fn print_formatted(&self) {
        println!("Date:\t\t\t{}", self.date);
        println!("Member:\t\t\t{} ({})", self.member_name, self.member_id);
        println!("Type:\t\t\t{}", self.kind);
        println!("Amount:\t\t\t{}", self.amount);
        println!("Method:\t\t\t{}", self.method);
        println!("Status:\t\t\t{}", self.status);
        println!("Reference:\t\t{}", or_none(&self.reference));
        println!("Notes:\t\t\t{}", or_none(&self.notes));
    }
}

impl PrintFormatted for Vec<Payment> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<10}\t{:<24}\t{:<16}\t{:>10}\t{:<10}\t{}",
            "ID", "Date", "Member", "Type", "Amount", "Method", "Reference"
        );
        println!("{:-<140}", "-");
        for p in self {
            println!(
                "{:>4}\t{:<10}\t{:<24}\t{:<16}\t{:>10}\t{:<10}\t{}",
                p.id,
                p.date,
                p.member_name,
                p.kind.to_string(),
                p.amount,
                p.method,
                p.reference.as_deref().unwrap_or("")
            );
        }
    }
}

impl PrintFormatted for Vec<Attendance> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:<10}\t{:<8}\t{:<9}\t{}",
            "ID", "Member", "Date", "Check-In", "Check-Out", "Duration"
        );
        println!("{:-<100}", "-");
        for r in self {
            let check_out = match r.check_out {
                Some(time) => time.format("%H:%M").to_string(),
                None => "-".to_string(),
            };
            let duration = format_duration(r).unwrap_or_else(|_| "invalid".to_string());
            println!(
                "{:>4}\t{:<24}\t{:<10}\t{:<8}\t{:<9}\t{}",
                r.id,
                r.member_name,
                r.date,
                r.check_in.format("%H:%M").to_string(),
                check_out,
                duration
            );
        }
    }
}

impl PrintFormatted for Dashboard {
    fn print_formatted(&self) {
        println!("Members:\t\t{}", self.members);
        println!("Trainers:\t\t{}", self.trainers);
        println!("Revenue:\t\t{}", self.total_revenue);
        println!("Attendance today:\t{}", self.today_attendance);

        println!("\nRecent members");
        self.recent_members.print_formatted();
        println!("\nUpcoming renewals");
        self.upcoming_renewals.print_formatted();
    }
}

impl PrintFormatted for Report {
    fn print_formatted(&self) {
        println!("Report for {}\n", self.date);
        println!("Revenue total:\t\t{}", self.revenue.total);
        println!("Revenue today:\t\t{}", self.revenue.today);
        println!("Revenue this month:\t{}", self.revenue.month);
        println!("Payments:\t\t{}", self.revenue.count);

        println!("\nMembers:\t\t{}", self.members.total);
        println!("Active:\t\t\t{}", self.members.active);
        println!("Expired:\t\t{}", self.members.expired);
        println!("Expiring soon:\t\t{}", self.members.expiring_soon);

        println!("\nTrainers:\t\t{}", self.trainers.total);
        println!("Active:\t\t\t{}", self.trainers.active);
        println!("Monthly salaries:\t{}", self.trainers.monthly_salary);

        println!("\nAttendance today:\t{}", self.attendance.today);
        println!("Last 7 days:\t\t{}", self.attendance.week);
        println!("This month:\t\t{}", self.attendance.month);

        println!("\n{:<16}\t{:>6}\t{:>12}", "Type", "Count", "Total");
        println!("{:-<48}", "-");
        for group in &self.by_kind {
            println!("{:<16}\t{:>6}\t{:>12}", group.kind, group.count, group.total);
        }

        println!("\n{:<10}\t{:>12}\t{:>10}", "Date", "Revenue", "Visits");
        println!("{:-<48}", "-");
        for day in &self.daily {
            println!("{:<10}\t{:>12}\t{:>10}", day.date, day.revenue, day.attendance);
        }
    }
}
