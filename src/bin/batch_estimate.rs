//! Run liability projections for a file of households
//!
//! Writes one summary row per household; failed households are reported
//! with their error and do not stop the batch.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;

use iht_planner::estate::load_households;
use iht_planner::money::round_2dp;
use iht_planner::{Assumptions, IhtCalculator};

#[derive(Parser, Debug)]
#[command(name = "batch-estimate")]
#[command(about = "Project IHT liability for every household in a JSON array")]
struct Args {
    /// JSON array of households
    #[arg(long)]
    households: PathBuf,

    /// Summary CSV to write
    #[arg(long, default_value = "batch_estimate_output.csv")]
    output: PathBuf,

    /// Directory of assumption CSVs (defaults to the built-in tables)
    #[arg(long)]
    assumptions: Option<PathBuf>,

    #[arg(long, default_value = "2025-26")]
    tax_year: String,

    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,
}

/// One output line per household
#[derive(Debug, Default, Serialize)]
struct SummaryRow {
    person_id: String,
    joint: bool,
    years_to_second_death: u32,
    current_liability: f64,
    projected_liability: f64,
    iht_saved: f64,
    remaining_liability: f64,
    life_cover_premium: f64,
    degraded: bool,
    error: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading households from {}...", args.households.display());

    let households = load_households(&args.households)
        .with_context(|| format!("reading {}", args.households.display()))?;
    println!("Loaded {} households in {:?}", households.len(), start.elapsed());

    let assumptions = match &args.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir, &args.tax_year)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Assumptions::default_uk(),
    };
    let calculator = IhtCalculator::new(assumptions);
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = calculator.calculate_batch(&households, today);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let rows: Vec<SummaryRow> = households
        .iter()
        .zip(results)
        .map(|(household, result)| match result {
            Ok(calc) => SummaryRow {
                person_id: calc.person_id,
                joint: calc.joint,
                years_to_second_death: calc.projection.horizon_years(),
                current_liability: round_2dp(calc.current_liability),
                projected_liability: round_2dp(calc.projected_liability),
                iht_saved: round_2dp(calc.strategy.total_iht_saved),
                remaining_liability: round_2dp(calc.strategy.remaining_liability),
                life_cover_premium: calc
                    .strategy
                    .life_cover
                    .as_ref()
                    .map_or(0.0, |q| round_2dp(q.annual_premium)),
                degraded: calc.degraded,
                error: String::new(),
            },
            Err(e) => {
                log::warn!("{}: {}", household.primary.person_id, e);
                SummaryRow {
                    person_id: household.primary.person_id.clone(),
                    error: e.to_string(),
                    ..Default::default()
                }
            }
        })
        .collect();

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    let failed = rows.iter().filter(|r| !r.error.is_empty()).count();
    let total_current: f64 = rows.iter().map(|r| r.current_liability).sum();
    let total_projected: f64 = rows.iter().map(|r| r.projected_liability).sum();
    let total_saved: f64 = rows.iter().map(|r| r.iht_saved).sum();

    println!("\nBatch Summary:");
    println!("  Households:          {} ({} failed)", rows.len(), failed);
    println!("  Liability today:     £{:.0}", total_current);
    println!("  Liability projected: £{:.0}", total_projected);
    println!("  Planned IHT saving:  £{:.0}", total_saved);

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
