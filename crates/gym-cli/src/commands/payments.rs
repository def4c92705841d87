use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use gym_data::{
    Delete,
    Member,
    Money,
    Payment,
    PaymentFilter,
    PaymentKind,
    Query,
    Retrieve,
};
use gym_db::Connection;
use gym_export::export_payments;
use gym_membership::payments::{extend_membership, record_payment, NewPayment};

use crate::commands::{confirm, write_export};
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Payments {
    /// Show a payment
    #[clap(name = "show")]
    Show(ShowPayment),
    /// List payments
    #[clap(name = "list")]
    List(ListPayments),
    /// Record a payment. Renewals extend the membership.
    #[clap(name = "record")]
    Record(RecordPayment),
    /// Delete a payment
    #[clap(name = "delete")]
    Delete(DeletePayment),
    /// Export payments as CSV
    #[clap(name = "export")]
    Export(ExportPayments),
}

impl Payments {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        match self {
            Payments::Show(cmd) => cmd.run(db).await,
            Payments::List(cmd) => cmd.run(db).await,
            Payments::Record(cmd) => cmd.run(db, today).await,
            Payments::Delete(cmd) => cmd.run(db).await,
            Payments::Export(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowPayment {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowPayment {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let payment: Payment = db.retrieve(self.id).await?;
        println!();
        payment.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListPayments {
    #[clap(short, long)]
    pub member_id: Option<u32>,
    /// Payment type, e.g. Renewal
    #[clap(short, long)]
    pub kind: Option<String>,
    #[clap(long)]
    pub method: Option<String>,
    #[clap(short, long)]
    pub after_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub before_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub limit: Option<u32>,
}

impl ListPayments {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = PaymentFilter {
            member_id: self.member_id,
            kind: self.kind.map(PaymentKind::from),
            method: self.method,
            date_after: self.after_date,
            date_before: self.before_date,
            limit: self.limit,
            ..Default::default()
        };
        let payments: Vec<Payment> = db.query(&filter).await?;
        let total: Money = payments.iter().map(|p| p.amount).sum();
        println!("{} payments, {} in total.", payments.len(), total);
        payments.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RecordPayment {
    #[clap(short, long)]
    pub member_id: u32,
    /// Payment type: Renewal, Membership Fee or anything else
    #[clap(short, long, default_value = "Renewal")]
    pub kind: String,
    #[clap(short, long)]
    pub amount: Money,
    #[clap(long, default_value = Payment::CASH)]
    pub method: String,
    /// Defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short, long)]
    pub reference: Option<String>,
    #[clap(short, long)]
    pub notes: Option<String>,
}

impl RecordPayment {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let new_payment = NewPayment {
            member_id: self.member_id,
            kind: PaymentKind::from(self.kind),
            amount: self.amount,
            method: self.method,
            date: self.date.unwrap_or(today),
            reference: self.reference,
            notes: self.notes,
        };
        new_payment.validate()?;

        let member: Member = db.retrieve(self.member_id).await?;
        println!();
        new_payment.to_payment(&member).print_formatted();
        if new_payment.kind.extends_membership() {
            let renewed = extend_membership(&member)?;
            println!(
                "Expires:\t\t{} -> {}",
                member.expiry_date, renewed.expiry_date
            );
        }
        println!();
        if !confirm("Record payment?")? {
            return Ok(());
        }

        let (payment, member) = record_payment(db, new_payment).await?;
        println!(
            "Payment recorded with id {}. {} is a member until {}.",
            payment.id, member.name, member.expiry_date
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeletePayment {
    #[clap(short, long)]
    pub id: u32,
}

impl DeletePayment {
    /// Deleting a renewal does not shorten the membership
    pub async fn run(&self, db: &Connection) -> Result<()> {
        let payment: Payment = db.retrieve(self.id).await?;
        println!();
        payment.print_formatted();
        println!();
        if !confirm("Delete payment from database?")? {
            return Ok(());
        }
        db.delete(payment).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExportPayments {
    #[clap(short, long, default_value = "payments.csv")]
    pub file: String,
}

impl ExportPayments {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let payments: Vec<Payment> = db.query(&PaymentFilter::default()).await?;
        let count = write_export(&self.file, |out| export_payments(out, &payments))?;
        println!("{} payments exported to {}.", count, self.file);
        Ok(())
    }
}
