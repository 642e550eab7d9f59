//! Calculation service for single, batch and cached IHT calculations
//!
//! Holds the assumptions once and runs the projection engine and strategy
//! optimizer for each household. Batches run in parallel; households are
//! independent.

use std::path::Path;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::cache::{fingerprint_household, CachedCalculation, CalculationCache};
use crate::error::Result;
use crate::estate::Household;
use crate::projection::{Projection, ProjectionEngine};
use crate::strategy::{
    quote_life_cover, AssetClassLiquidity, InsuredLife, LiquidityClassifier, PlanningInput,
    StrategyOptimizer, StrategyPlan,
};

/// Complete result for one household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IhtCalculation {
    pub person_id: String,
    pub tax_year: String,
    pub joint: bool,

    /// Liability if death occurred today (both deaths, for a couple)
    #[serde(with = "crate::money")]
    pub current_liability: f64,

    /// Liability at the projected death
    #[serde(with = "crate::money")]
    pub projected_liability: f64,

    pub degraded: bool,
    pub projection: Projection,
    pub strategy: StrategyPlan,
}

/// Whether a cached calculation was reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Pre-loaded calculator
///
/// # Example
/// ```ignore
/// let calculator = IhtCalculator::from_csv("2025-26")?;
/// let result = calculator.calculate(&household, today)?;
/// println!("{:.2}", result.projected_liability);
/// ```
#[derive(Debug, Clone)]
pub struct IhtCalculator<L = AssetClassLiquidity> {
    engine: ProjectionEngine,
    optimizer: StrategyOptimizer,
    liquidity: L,
}

impl IhtCalculator<AssetClassLiquidity> {
    pub fn new(assumptions: Assumptions) -> Self {
        Self::with_liquidity(assumptions, AssetClassLiquidity)
    }

    /// Assumptions from data/assumptions/
    pub fn from_csv(tax_year: &str) -> Result<Self> {
        Ok(Self::new(Assumptions::from_csv(tax_year)?))
    }

    pub fn from_csv_path(path: &Path, tax_year: &str) -> Result<Self> {
        Ok(Self::new(Assumptions::from_csv_path(path, tax_year)?))
    }
}

impl Default for IhtCalculator<AssetClassLiquidity> {
    fn default() -> Self {
        Self::new(Assumptions::default_uk())
    }
}

impl<L: LiquidityClassifier> IhtCalculator<L> {
    pub fn with_liquidity(assumptions: Assumptions, liquidity: L) -> Self {
        let optimizer = StrategyOptimizer::new(assumptions.tax.clone());
        Self {
            engine: ProjectionEngine::new(assumptions),
            optimizer,
            liquidity,
        }
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }

    /// Project the household and plan mitigation against the projected liability
    pub fn calculate(&self, household: &Household, today: NaiveDate) -> Result<IhtCalculation> {
        let projection = self.engine.project(household, today)?;
        let strategy = self.plan(household, &projection);

        log::info!(
            "{}: liability {:.2} now, {:.2} projected, {:.2} after planning",
            household.primary.person_id,
            projection.current().total_liability,
            projection.projected().total_liability,
            strategy.remaining_liability
        );

        Ok(IhtCalculation {
            person_id: household.primary.person_id.clone(),
            tax_year: self.assumptions().tax.tax_year.clone(),
            joint: projection.is_joint(),
            current_liability: projection.current().total_liability,
            projected_liability: projection.projected().total_liability,
            degraded: projection.data_quality().degraded,
            projection,
            strategy,
        })
    }

    /// Calculate many households in parallel, one result per household in input order
    pub fn calculate_batch(
        &self,
        households: &[Household],
        today: NaiveDate,
    ) -> Vec<Result<IhtCalculation>> {
        households
            .par_iter()
            .map(|household| self.calculate(household, today))
            .collect()
    }

    /// Serve from `cache` when the estate fingerprint is unchanged, else recalculate and store
    pub fn calculate_cached(
        &self,
        household: &Household,
        today: NaiveDate,
        cache: &dyn CalculationCache,
    ) -> Result<(CachedCalculation, CacheStatus)> {
        let person_id = household.primary.person_id.as_str();
        let fingerprint = fingerprint_household(household);

        if let Some(record) = cache.get(person_id) {
            if record.matches(&fingerprint) {
                cache.record_lookup(true);
                log::info!("{}: cache hit ({})", person_id, &fingerprint.fingerprint[..12]);
                return Ok((record, CacheStatus::Hit));
            }
            log::info!("{}: estate changed, superseding cached result", person_id);
        } else {
            log::info!("{}: cache miss", person_id);
        }
        cache.record_lookup(false);

        let result = self.calculate(household, today)?;
        let record = CachedCalculation {
            result,
            hashes: fingerprint,
            calculation_date: today,
            is_married: household.is_married(),
            data_sharing_enabled: household.data_sharing_enabled,
        };
        cache.put(person_id, record.clone());

        Ok((record, CacheStatus::Miss))
    }

    fn plan(&self, household: &Household, projection: &Projection) -> StrategyPlan {
        let assumptions = self.assumptions();
        let projected = projection.projected();

        let people = || std::iter::once(&household.primary).chain(household.partner.as_ref());
        let input = PlanningInput {
            liability: projected.total_liability,
            years_until_death: projection.horizon_years(),
            giftable_estate: people()
                .map(|p| self.liquidity.giftable_value(&p.estate.assets))
                .sum(),
            donors: if household.is_married() { 2 } else { 1 },
            surplus_income: people().map(|p| p.income.surplus()).sum(),
            tax_rate: projected.allowance.tax_rate,
            available_nrb: projected.allowance.total_nrb,
        };

        let mut plan = self.optimizer.optimize(&input);
        plan.life_cover = quote_life_cover(
            plan.remaining_liability,
            &insured_lives(projection),
            projection.horizon_years(),
            assumptions.growth.investment,
            &assumptions.premiums,
            &assumptions.tax,
        );
        plan
    }
}

/// Lives to price cover on; empty when age or gender is unknown
fn insured_lives(projection: &Projection) -> Vec<InsuredLife> {
    let profiles = match projection {
        Projection::Single(p) => vec![&p.actuarial],
        Projection::Joint(p) => vec![&p.survivor, &p.deceased],
    };

    let lives: Vec<InsuredLife> = profiles
        .iter()
        .filter_map(|p| {
            Some(InsuredLife {
                age: p.age?,
                gender: p.gender?,
            })
        })
        .collect();

    if lives.len() == profiles.len() {
        lives
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::error::IhtError;
    use crate::estate::{
        Asset, AssetType, EstateSnapshot, Gender, IhtProfile, IncomeProfile, MaritalStatus,
        Person, PersonEstate,
    };
    use crate::strategy::{PolicyBasis, StrategyKind};
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 6, 1)
    }

    fn person(id: &str, dob: NaiveDate, gender: Gender, status: MaritalStatus) -> PersonEstate {
        PersonEstate {
            person_id: id.to_string(),
            person: Person::new(dob, gender),
            profile: IhtProfile::new(status).with_home(0.0),
            estate: EstateSnapshot {
                assets: vec![
                    Asset::main_residence("Family home", 450_000.0),
                    Asset::new(AssetType::Investment, "ISA", 250_000.0),
                    Asset::new(AssetType::Cash, "Savings", 100_000.0),
                ],
                trusts: vec![],
                liabilities: vec![20_000.0],
            },
            gifts: vec![],
            income: IncomeProfile {
                annual_income: 60_000.0,
                annual_expenditure: 40_000.0,
            },
        }
    }

    fn single_household() -> Household {
        Household::single(person(
            "alice",
            date(1956, 1, 1),
            Gender::Female,
            MaritalStatus::Widowed,
        ))
    }

    fn couple_household() -> Household {
        Household::couple(
            person("bob", date(1952, 3, 1), Gender::Male, MaritalStatus::Married),
            person("carol", date(1955, 9, 1), Gender::Female, MaritalStatus::Married),
        )
    }

    #[test]
    fn test_single_calculation() {
        let result = IhtCalculator::default()
            .calculate(&single_household(), today())
            .unwrap();

        assert!(!result.joint);
        assert_eq!(result.tax_year, "2025-26");
        // 780,000 net against 325,000 NRB and 175,000 RNRB
        assert_relative_eq!(result.current_liability, 112_000.0, epsilon = 1e-6);
        assert!(result.projected_liability > result.current_liability);

        let plan = &result.strategy;
        assert_relative_eq!(plan.starting_liability, result.projected_liability, epsilon = 1e-9);
        assert!(plan.allocation(StrategyKind::AnnualExemption).is_some());
        assert!(plan.allocation(StrategyKind::GiftingFromIncome).is_some());
        assert!(plan.remaining_liability <= plan.starting_liability);
    }

    #[test]
    fn test_joint_calculation_prices_second_death_cover() {
        let mut household = couple_household();
        // Large enough that some liability survives the waterfall
        household
            .primary
            .estate
            .assets
            .push(Asset::new(AssetType::Business, "Company shares", 3_000_000.0));

        let result = IhtCalculator::default()
            .calculate(&household, today())
            .unwrap();
        assert!(result.joint);

        let plan = &result.strategy;
        assert!(plan.remaining_liability > 0.0);
        let cover = plan.life_cover.as_ref().unwrap();
        assert_eq!(cover.basis, PolicyBasis::JointLifeSecondDeath);
        assert_relative_eq!(cover.cover_amount, plan.remaining_liability, epsilon = 1e-9);
    }

    #[test]
    fn test_joint_missing_input_fails() {
        let mut household = couple_household();
        if let Some(partner) = household.partner.as_mut() {
            partner.person.gender = None;
        }
        let err = IhtCalculator::default()
            .calculate(&household, today())
            .unwrap_err();
        assert!(matches!(
            err,
            IhtError::MissingActuarialInput { ref missing } if missing == &["partner.gender"]
        ));
    }

    #[test]
    fn test_identical_inputs_give_identical_json() {
        let calculator = IhtCalculator::default();
        let household = couple_household();

        let first = calculator.calculate(&household, today()).unwrap();
        let second = calculator.calculate(&household, today()).unwrap();
        let first = serde_json::to_string(&first).unwrap();
        let second = serde_json::to_string(&second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_matches_individual_results() {
        let calculator = IhtCalculator::default();
        let mut bad = single_household();
        bad.primary.estate.liabilities.push(-1.0);
        let households = vec![single_household(), couple_household(), bad];

        let results = calculator.calculate_batch(&households, today());
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &calculator.calculate(&households[0], today()).unwrap()
        );
        assert!(results[1].as_ref().unwrap().joint);
        assert!(matches!(results[2], Err(IhtError::InvalidEstateValue { .. })));
    }

    #[test]
    fn test_cached_calculation_reused_until_estate_changes() {
        let calculator = IhtCalculator::default();
        let cache = InMemoryCache::new();
        let mut household = single_household();

        let (first, status) = calculator.calculate_cached(&household, today(), &cache).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(cache.len(), 1);
        assert!(!first.is_married);

        let (second, status) = calculator
            .calculate_cached(&household, date(2026, 7, 1), &cache)
            .unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(second, first);

        household.primary.estate.assets[1].value += 10_000.0;
        let (third, status) = calculator.calculate_cached(&household, today(), &cache).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_ne!(third.hashes.assets_hash, first.hashes.assets_hash);
        assert_eq!(third.hashes.liabilities_hash, first.hashes.liabilities_hash);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("alice").unwrap(), third);
    }

    #[test]
    fn test_stale_record_counts_as_miss() {
        let calculator = IhtCalculator::default();
        let cache = InMemoryCache::new();
        let mut household = single_household();

        calculator.calculate_cached(&household, today(), &cache).unwrap();
        household.primary.estate.assets[2].value += 5_000.0;
        let (_, status) = calculator.calculate_cached(&household, today(), &cache).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 2);

        calculator.calculate_cached(&household, today(), &cache).unwrap();
        assert_eq!(cache.hits(), 1);
        assert_relative_eq!(cache.hit_rate(), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cache_record_flattens_result() {
        let calculator = IhtCalculator::default();
        let cache = InMemoryCache::new();
        let (record, _) = calculator
            .calculate_cached(&couple_household(), today(), &cache)
            .unwrap();

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["person_id"], "bob");
        assert_eq!(json["is_married"], true);
        assert_eq!(json["data_sharing_enabled"], true);
        assert_eq!(json["calculation_date"], "2026-06-01");
        assert_eq!(json["assets_hash"].as_str().unwrap().len(), 64);
        assert!(json["projected_liability"].is_number());
    }
}
