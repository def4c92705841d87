use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use gym_data::{
    Delete,
    Money,
    Query,
    Retrieve,
    Trainer,
    TrainerFilter,
    TrainerStatus,
};
use gym_db::Connection;
use gym_export::export_trainers;
use gym_membership::trainers::{add_trainer, edit_trainer, TrainerChanges};

use crate::commands::{confirm, write_export};
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Trainers {
    /// Show a trainer
    #[clap(name = "show")]
    Show(ShowTrainer),
    /// List trainers
    #[clap(name = "list")]
    List(ListTrainers),
    /// Add a trainer
    #[clap(name = "add")]
    Add(AddTrainer),
    /// Update a trainer
    #[clap(name = "set")]
    Update(UpdateTrainer),
    /// Delete a trainer
    #[clap(name = "delete")]
    Delete(DeleteTrainer),
    /// Export trainers as CSV
    #[clap(name = "export")]
    Export(ExportTrainers),
}

impl Trainers {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        match self {
            Trainers::Show(cmd) => cmd.run(db).await,
            Trainers::List(cmd) => cmd.run(db).await,
            Trainers::Add(cmd) => cmd.run(db, today).await,
            Trainers::Update(cmd) => cmd.run(db).await,
            Trainers::Delete(cmd) => cmd.run(db).await,
            Trainers::Export(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TrainerStatusArg {
    Active,
    Inactive,
}

impl From<TrainerStatusArg> for TrainerStatus {
    fn from(status: TrainerStatusArg) -> Self {
        match status {
            TrainerStatusArg::Active => TrainerStatus::Active,
            TrainerStatusArg::Inactive => TrainerStatus::Inactive,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowTrainer {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowTrainer {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let trainer: Trainer = db.retrieve(self.id).await?;
        println!();
        trainer.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListTrainers {
    /// Match name, email, phone or specialization
    #[clap(short, long)]
    pub search: Option<String>,
    #[clap(long, value_enum)]
    pub status: Option<TrainerStatusArg>,
}

impl ListTrainers {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = TrainerFilter {
            search: self.search,
            status: self.status.map(TrainerStatus::from),
            ..Default::default()
        };
        let trainers: Vec<Trainer> = db.query(&filter).await?;
        println!("{} trainers.", trainers.len());
        trainers.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddTrainer {
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long)]
    pub email: String,
    #[clap(short, long, default_value = "")]
    pub phone: String,
    #[clap(short, long, default_value = "")]
    pub gender: String,
    #[clap(short, long, default_value = "")]
    pub specialization: String,
    /// Years of experience
    #[clap(short = 'x', long, default_value_t = 0)]
    pub experience: u32,
    /// Monthly salary
    #[clap(short = 'S', long)]
    pub salary: Money,
    /// Defaults to today
    #[clap(short, long)]
    pub join_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub certification: Option<String>,
    #[clap(short, long, default_value = "")]
    pub address: String,
    #[clap(short, long)]
    pub bio: Option<String>,
}

impl AddTrainer {
    pub async fn run(self, db: &Connection, today: NaiveDate) -> Result<()> {
        let trainer = Trainer {
            name: self.name,
            email: self.email,
            phone: self.phone,
            gender: self.gender,
            specialization: self.specialization,
            experience: self.experience,
            salary: self.salary,
            join_date: self.join_date.unwrap_or(today),
            certification: self.certification,
            address: self.address,
            bio: self.bio,
            ..Default::default()
        };

        println!();
        trainer.print_formatted();
        println!();
        if !confirm("Add trainer?")? {
            return Ok(());
        }

        let trainer = add_trainer(db, trainer).await?;
        println!("Trainer added with id {}.", trainer.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateTrainer {
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
    pub specialization: Option<String>,
    #[clap(short = 'x', long)]
    pub experience: Option<u32>,
    #[clap(short = 'S', long)]
    pub salary: Option<Money>,
    #[clap(short, long)]
    pub join_date: Option<NaiveDate>,
    /// An empty value removes the certification
    #[clap(short, long)]
    pub certification: Option<String>,
    #[clap(short, long)]
    pub address: Option<String>,
    #[clap(short, long)]
    pub bio: Option<String>,
    #[clap(long, value_enum)]
    pub status: Option<TrainerStatusArg>,
}

impl UpdateTrainer {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let trainer: Trainer = db.retrieve(self.id).await?;
        let changes = TrainerChanges {
            name: self.name,
            email: self.email,
            phone: self.phone,
            gender: self.gender,
            specialization: self.specialization,
            experience: self.experience,
            salary: self.salary,
            join_date: self.join_date,
            certification: self.certification,
            address: self.address,
            bio: self.bio,
            status: self.status.map(TrainerStatus::from),
        };
        let update = changes.clone().apply(&trainer)?;

        println!();
        update.print_formatted();
        println!();
        if !confirm("Update trainer?")? {
            return Ok(());
        }

        edit_trainer(db, self.id, changes).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteTrainer {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteTrainer {
    /// Members keep their reference to the trainer
    pub async fn run(&self, db: &Connection) -> Result<()> {
        let trainer: Trainer = db.retrieve(self.id).await?;
        println!();
        trainer.print_formatted();
        println!();
        if !confirm("Delete trainer from database?")? {
            return Ok(());
        }
        db.delete(trainer).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExportTrainers {
    #[clap(short, long, default_value = "trainers.csv")]
    pub file: String,
}

impl ExportTrainers {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let trainers: Vec<Trainer> = db.query(&TrainerFilter::default()).await?;
        let count = write_export(&self.file, |out| export_trainers(out, &trainers))?;
        println!("{} trainers exported to {}.", count, self.file);
        Ok(())
    }
}
