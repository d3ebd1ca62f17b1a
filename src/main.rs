use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

mod crcl;
mod dose;
mod error;
mod range;
mod table;

use crate::crcl::{PatientInput, Sex};
use crate::dose::DoseOutcome;
use crate::table::DoseTable;

#[derive(Parser)]
#[command(name = "crcl_dose")]
#[command(about = "Drug dose adjustment based on creatinine clearance")]
struct Cli {
    /// Reference dose table (CSV)
    #[arg(short, long, default_value = "Crcldose.csv")]
    table: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate CrCl and look up the recommended dose
    Dose {
        /// Patient age in years
        #[arg(long)]
        age: f64,

        /// Patient weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Patient sex
        #[arg(long, value_enum)]
        sex: Sex,

        /// Serum creatinine in mg/dL
        #[arg(long)]
        scr: f64,

        /// Drug name as listed in the reference table
        #[arg(long)]
        drug: String,

        /// Emit a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the drugs available in the reference table
    Drugs,
}

#[derive(Serialize)]
struct DoseReport<'a> {
    crcl: f64,
    result: &'a DoseOutcome,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let table = DoseTable::load(&cli.table)
        .with_context(|| format!("failed to load dose table {:?}", cli.table))?;

    match cli.command {
        Commands::Drugs => {
            for name in table.drug_names() {
                println!("{}", name);
            }
        }
        Commands::Dose {
            age,
            weight,
            sex,
            scr,
            drug,
            json,
        } => {
            let patient = PatientInput {
                age,
                weight_kg: weight,
                sex,
                serum_creatinine: scr,
            };
            patient.validate()?;

            let crcl = patient.crcl();
            info!("Estimated CrCl: {} mL/min", crcl);

            let outcome = dose::resolve_dose(&drug, crcl, weight, &table);
            if json {
                let report = DoseReport {
                    crcl,
                    result: &outcome,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Estimated CrCl: {} mL/min", crcl);
                println!("{}", outcome);
            }
        }
    }

    Ok(())
}
