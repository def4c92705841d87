use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use gym_data::{
    Delete,
    Member,
    MemberFilter,
    MemberStatus,
    Money,
    Query,
    Retrieve,
};
use gym_db::Connection;
use gym_export::export_members;
use gym_membership::members::{
    edit_member,
    enroll_member,
    refresh_statuses,
    Enrollment,
    MemberChanges,
};

use crate::commands::{confirm, write_export};
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// Show a member
    #[clap(name = "show")]
    Show(ShowMember),
    /// List members
    #[clap(name = "list")]
    List(ListMembers),
    /// Enroll a new member
    #[clap(name = "add")]
    Add(AddMember),
    /// Update a member
    #[clap(name = "set")]
    Update(UpdateMember),
    /// Delete a member
    #[clap(name = "delete")]
    Delete(DeleteMember),
    /// Store the current status of every member
    #[clap(name = "refresh-status")]
    Refresh(RefreshStatus),
    /// Export members as CSV
    #[clap(name = "export")]
    Export(ExportMembers),
}

impl Members {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        match self {
            Members::Show(cmd) => cmd.run(db, today).await,
            Members::List(cmd) => cmd.run(db, today).await,
            Members::Add(cmd) => cmd.run(db, today).await,
            Members::Update(cmd) => cmd.run(db, today).await,
            Members::Delete(cmd) => cmd.run(db).await,
            Members::Refresh(cmd) => cmd.run(db, today).await,
            Members::Export(cmd) => cmd.run(db, today).await,
        }
    }
}

/// Status as shown to the user, derived from the expiry date
fn with_current_status(mut member: Member, today: NaiveDate) -> Member {
    member.status = member.status_on(today);
    member
}

#[derive(Args, Debug)]
pub struct ShowMember {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowMember {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        println!();
        with_current_status(member, today).print_formatted();
        println!();
        Ok(())
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Active,
    Expired,
}

impl From<StatusArg> for MemberStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => MemberStatus::Active,
            StatusArg::Expired => MemberStatus::Expired,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    /// Match name, email or phone
    #[clap(short, long)]
    pub search: Option<String>,
    #[clap(long, value_enum)]
    pub status: Option<StatusArg>,
    #[clap(short, long)]
    pub trainer_id: Option<u32>,
    #[clap(long)]
    pub expiring_after: Option<NaiveDate>,
    #[clap(long)]
    pub expiring_before: Option<NaiveDate>,
    #[clap(short, long)]
    pub limit: Option<u32>,
}

impl ListMembers {
    /// Query the members to list. The status is derived as of
    /// `today`, so filtering by it happens before the limit.
    pub async fn members(&self, db: &Connection, today: NaiveDate) -> Result<Vec<Member>> {
        let status = self.status.map(MemberStatus::from);
        let filter = MemberFilter {
            search: self.search.clone(),
            trainer_id: self.trainer_id,
            expiring_after: self.expiring_after,
            expiring_before: self.expiring_before,
            limit: if status.is_some() { None } else { self.limit },
            ..Default::default()
        };
        let members: Vec<Member> = db.query(&filter).await?;
        let limit = self.limit.map_or(usize::MAX, |limit| limit as usize);
        let members = members
            .into_iter()
            .map(|m| with_current_status(m, today))
            .filter(|m| status.map_or(true, |s| m.status == s))
            .take(limit)
            .collect();
        Ok(members)
    }

    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let members = self.members(db, today).await?;
        println!("{} members.", members.len());
        members.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long)]
    pub email: String,
    #[clap(short, long, default_value = "")]
    pub phone: String,
    #[clap(short, long, default_value = "")]
    pub gender: String,
    #[clap(short, long, default_value = "")]
    pub address: String,
    /// Defaults to today
    #[clap(short, long)]
    pub join_date: Option<NaiveDate>,
    /// Membership period in months
    #[clap(short, long, default_value_t = 1)]
    pub duration: u32,
    #[clap(short, long)]
    pub fee: Money,
    #[clap(short, long)]
    pub trainer_id: Option<u32>,
}

impl AddMember {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let enrollment = Enrollment {
            name: self.name,
            email: self.email,
            phone: self.phone,
            gender: self.gender,
            address: self.address,
            join_date: self.join_date.unwrap_or(today),
            duration: self.duration,
            fee: self.fee,
            trainer_id: self.trainer_id,
        };
        enrollment.validate()?;

        println!();
        enrollment.to_member(today)?.print_formatted();
        println!();
        if !confirm("Add member and record the membership fee?")? {
            return Ok(());
        }

        let (member, payment) = enroll_member(db, enrollment, today).await?;
        println!(
            "Member added with id {}, fee of {} recorded as payment {}.",
            member.id, payment.amount, payment.id
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateMember {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
    #[clap(short, long)]
    pub phone: Option<String>,
    #[clap(short, long)]
    pub gender: Option<String>,
    #[clap(short, long)]
    pub address: Option<String>,
    #[clap(short, long)]
    pub join_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub duration: Option<u32>,
    #[clap(short, long)]
    pub fee: Option<Money>,
    #[clap(short, long, conflicts_with = "no_trainer")]
    pub trainer_id: Option<u32>,
    /// Remove the assigned trainer
    #[clap(long)]
    pub no_trainer: bool,
}

impl UpdateMember {
    fn changes(&self) -> MemberChanges {
        let trainer_id = if self.no_trainer {
            Some(None)
        } else {
            self.trainer_id.map(Some)
        };
        MemberChanges {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            gender: self.gender.clone(),
            address: self.address.clone(),
            join_date: self.join_date,
            duration: self.duration,
            fee: self.fee,
            trainer_id,
        }
    }

    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let update = self.changes().apply(&member, today)?;

        println!();
        (with_current_status(member, today), update).print_formatted();
        println!();
        if !confirm("Update member?")? {
            return Ok(());
        }

        edit_member(db, self.id, self.changes(), today).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteMember {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteMember {
    /// Payments and attendance of the member are kept
    pub async fn run(&self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        println!();
        member.print_formatted();
        println!();
        if !confirm("Delete member from database?")? {
            return Ok(());
        }
        db.delete(member).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RefreshStatus {}

impl RefreshStatus {
    pub async fn run(&self, db: &Connection, today: NaiveDate) -> Result<()> {
        let updated = refresh_statuses(db, today).await?;
        println!("{} members updated.", updated);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExportMembers {
    #[clap(short, long, default_value = "members.csv")]
    pub file: String,
}

impl ExportMembers {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let members: Vec<Member> = db.query(&MemberFilter::default()).await?;
        let count = write_export(&self.file, |out| export_members(out, &members, today))?;
        println!("{} members exported to {}.", count, self.file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gym_data::Insert;

    #[derive(Parser)]
    struct TestCli {
        #[clap(subcommand)]
        members: Members,
    }

    #[test]
    fn test_parse_add_member() {
        let cli = TestCli::try_parse_from([
            "gym", "add", "--name", "Ada", "--email", "ada@gym", "--fee", "39.90",
            "--duration", "3",
        ])
        .unwrap();
        let Members::Add(add) = cli.members else {
            panic!("expected add");
        };
        assert_eq!(add.fee, Money::from_cents(3990));
        assert_eq!(add.duration, 3);
        assert_eq!(add.join_date, None);
    }

    #[test]
    fn test_update_changes_trainer() {
        let cli =
            TestCli::try_parse_from(["gym", "set", "--id", "4", "--no-trainer"]).unwrap();
        let Members::Update(update) = cli.members else {
            panic!("expected set");
        };
        assert_eq!(update.changes().trainer_id, Some(None));

        let cli =
            TestCli::try_parse_from(["gym", "set", "--id", "4", "--trainer-id", "2"]).unwrap();
        let Members::Update(update) = cli.members else {
            panic!("expected set");
        };
        assert_eq!(update.changes().trainer_id, Some(Some(2)));
    }

    #[tokio::test]
    async fn test_list_limit_applies_after_status() {
        let (_handle, db) = gym_db::connection::open_test().await;
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        // Newest joins first, all of them still active
        for (day, expiry) in [(1, 2024), (2, 2024), (3, 2025), (4, 2025), (5, 2025)] {
            db.insert(Member {
                name: format!("Member {}", day),
                join_date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
                expiry_date: NaiveDate::from_ymd_opt(expiry, 1, 1).unwrap(),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let cli = TestCli::try_parse_from(["gym", "list", "--status", "expired", "-l", "2"])
            .unwrap();
        let Members::List(list) = cli.members else {
            panic!("expected list");
        };
        let members = list.members(&db, today).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.status == MemberStatus::Expired));
    }

    #[tokio::test]
    async fn test_empty_export_keeps_previous_file() {
        let (_handle, db) = gym_db::connection::open_test().await;
        let path = std::env::temp_dir()
            .join(format!("gym_members_export_{}.csv", std::process::id()));
        std::fs::write(&path, "Name\nprevious export\n").unwrap();

        let export = ExportMembers {
            file: path.to_string_lossy().to_string(),
        };
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(export.run(&db, today).await.is_err());

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(content, "Name\nprevious export\n");
    }
}
