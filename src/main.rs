//! IHT Planner CLI
//!
//! Runs a liability projection and mitigation plan for one household

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use iht_planner::estate::{load_assets, load_gifts, load_household};
use iht_planner::projection::Projection;
use iht_planner::strategy::StrategyPlan;
use iht_planner::{Assumptions, IhtCalculation, IhtCalculator};

/// UK inheritance tax liability and planning for a household
#[derive(Parser, Debug)]
#[command(name = "iht-planner", version)]
#[command(about = "Project UK inheritance tax liability and plan mitigation")]
struct Args {
    /// Household JSON file
    #[arg(long)]
    household: PathBuf,

    /// Asset CSV replacing the primary person's assets
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Gift CSV replacing the primary person's gifts
    #[arg(long)]
    gifts: Option<PathBuf>,

    /// Directory of assumption CSVs (defaults to the built-in tables)
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Tax year to load, e.g. 2025-26
    #[arg(long)]
    tax_year: Option<String>,

    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let assumptions = match (&args.assumptions, &args.tax_year) {
        (Some(dir), year) => {
            let year = year.as_deref().unwrap_or("2025-26");
            Assumptions::from_csv_path(dir, year)
                .with_context(|| format!("loading assumptions from {}", dir.display()))?
        }
        (None, Some(year)) => Assumptions::from_csv(year)
            .with_context(|| format!("loading assumptions for {year}"))?,
        (None, None) => Assumptions::default_uk(),
    };

    let mut household = load_household(&args.household)
        .with_context(|| format!("reading household {}", args.household.display()))?;
    if let Some(path) = &args.assets {
        household.primary.estate.assets =
            load_assets(path).with_context(|| format!("reading assets {}", path.display()))?;
    }
    if let Some(path) = &args.gifts {
        household.primary.gifts =
            load_gifts(path).with_context(|| format!("reading gifts {}", path.display()))?;
    }

    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let calculator = IhtCalculator::new(assumptions);
    let result = calculator
        .calculate(&household, today)
        .with_context(|| format!("calculating {}", household.primary.person_id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn print_summary(result: &IhtCalculation) {
    println!("IHT Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("==================\n");
    println!("Household: {} ({})", result.person_id, result.tax_year);

    match &result.projection {
        Projection::Single(p) => {
            println!(
                "  Single life: {} years to expected death ({})",
                p.actuarial.years_until_death, p.actuarial.estimated_date_of_death
            );
        }
        Projection::Joint(p) => {
            println!(
                "  First death: {} in {} years, spousal exemption applied",
                p.first_death.deceased_person_id, p.first_death.years_from_today
            );
            println!(
                "  Second death: {} in {} years ({})",
                p.survivor.person_id,
                p.survivor.years_until_death,
                p.survivor.estimated_date_of_death
            );
            println!(
                "  Transferred bands: NRB £{:.2}, RNRB £{:.2}",
                p.spousal_transfer.transferable_nrb, p.spousal_transfer.transferable_rnrb
            );
        }
    }
    if result.degraded {
        println!("  Data quality: degraded");
        for issue in &result.projection.data_quality().issues {
            println!("    - {:?}", issue);
        }
    }
    println!();

    for (label, assessment) in [
        ("Today", result.projection.current()),
        ("Projected", result.projection.projected()),
    ] {
        let a = &assessment.allowance;
        println!("{} ({}):", label, assessment.valuation_date);
        println!("  Net estate:      £{:>14.2}", assessment.net_estate);
        println!("  NRB remaining:   £{:>14.2}", a.nrb_remaining);
        println!("  RNRB ({:?}): {:>6}£{:>14.2}", a.rnrb_status, "", a.rnrb_available);
        println!("  Taxable estate:  £{:>14.2}", a.taxable_estate);
        println!(
            "  Estate tax:      £{:>14.2}  at {:.0}%",
            assessment.estate_liability,
            a.tax_rate * 100.0
        );
        println!("  Gift tax:        £{:>14.2}", assessment.gifting_liability);
        println!("  Total liability: £{:>14.2}", assessment.total_liability);
        println!();
    }

    print_plan(&result.strategy);
}

fn print_plan(plan: &StrategyPlan) {
    println!("Mitigation plan:");
    for allocation in &plan.allocations {
        println!(
            "  {:<35} transfer £{:>12.2}  saves £{:>12.2}  risk {:?}",
            allocation.strategy.label(),
            allocation.amount_transferred,
            allocation.iht_saved,
            allocation.risk_level
        );
    }
    for skipped in &plan.skipped {
        println!("  {:<35} skipped ({:?})", skipped.strategy.label(), skipped.reason);
    }
    println!("  Remaining liability: £{:.2}", plan.remaining_liability);

    if let Some(cover) = &plan.life_cover {
        println!("\nLife cover ({:?}):", cover.basis);
        println!("  Cover:            £{:.2}", cover.cover_amount);
        println!(
            "  Annual premium:   £{:.2} for {} years",
            cover.annual_premium, cover.term_years
        );
        println!(
            "  Self-insurance:   £{:.2} ({:.1}% coverage, {:?} confidence)",
            cover.self_insurance_fund, cover.coverage_percent, cover.confidence
        );
        println!("  Recommendation:   {}", cover.recommendation.describe());
    }
}
