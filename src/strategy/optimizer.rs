//! Waterfall strategy optimizer
//!
//! Steps run in a fixed priority order against a running liability and a
//! running pool of giftable estate. A step never revisits an earlier
//! allocation; once the liability is gone every later step is recorded as
//! skipped.

use crate::assumptions::TaxParameters;

use super::types::{
    RiskLevel, ScheduledGift, SkipReason, SkippedStrategy, StrategyAllocation, StrategyKind,
    StrategyPlan,
};

/// Share of surplus income given away each year
const INCOME_GIFT_SHARE: f64 = 0.5;

/// What the waterfall works from
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningInput {
    /// Projected liability at the relevant death
    pub liability: f64,

    /// Years until that death
    pub years_until_death: u32,

    /// Liquid, chargeable estate available to give away
    pub giftable_estate: f64,

    /// 1 for a single person, 2 for a couple
    pub donors: u32,

    /// Household income less expenditure, per year
    pub surplus_income: f64,

    /// Death rate the liability was charged at
    pub tax_rate: f64,

    /// Nil-rate band that renews with each seven-year cycle
    pub available_nrb: f64,
}

/// Running totals threaded through the steps
#[derive(Debug, Clone, Copy)]
struct Running {
    liability: f64,
    estate: f64,
}

enum StepOutcome {
    Allocated(StrategyAllocation),
    Skipped(SkipReason),
}

/// Runs the mitigation waterfall
#[derive(Debug, Clone)]
pub struct StrategyOptimizer {
    params: TaxParameters,
}

impl StrategyOptimizer {
    pub fn new(params: TaxParameters) -> Self {
        Self { params }
    }

    pub fn optimize(&self, input: &PlanningInput) -> StrategyPlan {
        let steps = [
            StrategyKind::AnnualExemption,
            StrategyKind::GiftingFromIncome,
            StrategyKind::PetCycles,
            StrategyKind::CltTrust,
        ];

        let mut running = Running {
            liability: input.liability.max(0.0),
            estate: input.giftable_estate.max(0.0),
        };
        let mut allocations = Vec::new();
        let mut skipped = Vec::new();

        for strategy in steps {
            let outcome = if running.liability <= 0.0 {
                StepOutcome::Skipped(SkipReason::NoLiabilityRemaining)
            } else {
                match strategy {
                    StrategyKind::AnnualExemption => self.annual_exemption(input, &mut running),
                    StrategyKind::GiftingFromIncome => {
                        self.gifting_from_income(input, &mut running)
                    }
                    StrategyKind::PetCycles => self.pet_cycles(input, &mut running),
                    StrategyKind::CltTrust => self.clt_trust(&mut running),
                }
            };

            match outcome {
                StepOutcome::Allocated(allocation) => {
                    log::debug!(
                        "{}: transfer {:.2}, saving {:.2}, remaining liability {:.2}",
                        strategy.label(),
                        allocation.amount_transferred,
                        allocation.iht_saved,
                        running.liability
                    );
                    allocations.push(allocation);
                }
                StepOutcome::Skipped(reason) => {
                    log::debug!("{}: skipped ({:?})", strategy.label(), reason);
                    skipped.push(SkippedStrategy { strategy, reason });
                }
            }
        }

        StrategyPlan {
            starting_liability: input.liability,
            giftable_estate: input.giftable_estate,
            total_transferred: allocations.iter().map(|a| a.amount_transferred).sum(),
            total_iht_saved: allocations.iter().map(|a| a.iht_saved).sum(),
            remaining_liability: running.liability,
            allocations,
            skipped,
            life_cover: None,
        }
    }

    /// Saving on `amount` leaving the estate, capped by what is left to save
    fn saving(amount: f64, rate: f64, running: &Running) -> f64 {
        (amount * rate).min(running.liability)
    }

    fn annual_exemption(&self, input: &PlanningInput, running: &mut Running) -> StepOutcome {
        if input.years_until_death == 0 {
            return StepOutcome::Skipped(SkipReason::InsufficientYears);
        }
        if running.estate <= 0.0 {
            return StepOutcome::Skipped(SkipReason::NoGiftableEstate);
        }

        let per_year_uncapped = self.params.annual_exemption * input.donors as f64;
        let amount = (per_year_uncapped * input.years_until_death as f64).min(running.estate);
        let saved = Self::saving(amount, input.tax_rate, running);

        let schedule = spread_evenly(amount, per_year_uncapped, input.years_until_death);
        running.estate -= amount;
        running.liability -= saved;

        StepOutcome::Allocated(StrategyAllocation {
            strategy: StrategyKind::AnnualExemption,
            amount_transferred: amount,
            iht_saved: saved,
            immediate_charge: 0.0,
            risk_level: RiskLevel::None,
            schedule,
        })
    }

    fn gifting_from_income(&self, input: &PlanningInput, running: &mut Running) -> StepOutcome {
        let annual_gift = INCOME_GIFT_SHARE * input.surplus_income;
        if input.surplus_income <= 0.0 || annual_gift < self.params.income_gift_floor {
            return StepOutcome::Skipped(SkipReason::AffordabilityNotMet);
        }
        if input.years_until_death == 0 {
            return StepOutcome::Skipped(SkipReason::InsufficientYears);
        }

        // Paid from income, so the giftable estate is untouched
        let amount = annual_gift * input.years_until_death as f64;
        let saved = Self::saving(amount, input.tax_rate, running);
        running.liability -= saved;

        StepOutcome::Allocated(StrategyAllocation {
            strategy: StrategyKind::GiftingFromIncome,
            amount_transferred: amount,
            iht_saved: saved,
            immediate_charge: 0.0,
            risk_level: RiskLevel::Low,
            schedule: (0..input.years_until_death)
                .map(|year| ScheduledGift {
                    year,
                    amount: annual_gift,
                })
                .collect(),
        })
    }

    fn pet_cycles(&self, input: &PlanningInput, running: &mut Running) -> StepOutcome {
        let window = self.params.pet_window_years.max(1);
        let complete_cycles = input.years_until_death / window;
        if complete_cycles == 0 {
            return StepOutcome::Skipped(SkipReason::InsufficientYears);
        }

        let mut schedule = Vec::new();
        for cycle in 0..complete_cycles {
            let gift = input.available_nrb.min(running.estate);
            if gift <= 0.0 {
                break;
            }
            running.estate -= gift;
            schedule.push(ScheduledGift {
                year: cycle * window,
                amount: gift,
            });
        }
        if schedule.is_empty() {
            return StepOutcome::Skipped(SkipReason::NoGiftableEstate);
        }

        let amount: f64 = schedule.iter().map(|g| g.amount).sum();
        let saved = Self::saving(amount, input.tax_rate, running);
        running.liability -= saved;

        StepOutcome::Allocated(StrategyAllocation {
            strategy: StrategyKind::PetCycles,
            amount_transferred: amount,
            iht_saved: saved,
            immediate_charge: 0.0,
            risk_level: RiskLevel::Medium,
            schedule,
        })
    }

    fn clt_trust(&self, running: &mut Running) -> StepOutcome {
        if running.estate <= 0.0 {
            return StepOutcome::Skipped(SkipReason::NoGiftableEstate);
        }

        let rate = self.params.standard_rate;
        let gift = (running.liability / rate).min(running.estate);
        let immediate_charge = gift * self.params.clt_lifetime_rate;
        let gross_saving = (gift * rate).min(running.liability);
        let net_saving = gross_saving - immediate_charge;

        running.estate -= gift;
        running.liability -= gross_saving;

        StepOutcome::Allocated(StrategyAllocation {
            strategy: StrategyKind::CltTrust,
            amount_transferred: gift,
            iht_saved: net_saving,
            immediate_charge,
            risk_level: RiskLevel::High,
            schedule: vec![ScheduledGift {
                year: 0,
                amount: gift,
            }],
        })
    }
}

/// Schedule of up to `per_year` each year until `total` is used
fn spread_evenly(total: f64, per_year: f64, years: u32) -> Vec<ScheduledGift> {
    let mut remaining = total;
    let mut schedule = Vec::new();
    for year in 0..years {
        if remaining <= 0.0 {
            break;
        }
        let amount = per_year.min(remaining);
        schedule.push(ScheduledGift { year, amount });
        remaining -= amount;
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input() -> PlanningInput {
        PlanningInput {
            liability: 400_000.0,
            years_until_death: 15,
            giftable_estate: 500_000.0,
            donors: 2,
            surplus_income: 20_000.0,
            tax_rate: 0.40,
            available_nrb: 650_000.0,
        }
    }

    fn optimizer() -> StrategyOptimizer {
        StrategyOptimizer::new(TaxParameters::uk_2025_26())
    }

    #[test]
    fn test_full_waterfall() {
        let plan = optimizer().optimize(&input());

        let annual = plan.allocation(StrategyKind::AnnualExemption).unwrap();
        assert_eq!(annual.amount_transferred, 90_000.0);
        assert_relative_eq!(annual.iht_saved, 36_000.0, epsilon = 1e-9);
        assert_eq!(annual.schedule.len(), 15);
        assert_eq!(annual.risk_level, RiskLevel::None);

        let income = plan.allocation(StrategyKind::GiftingFromIncome).unwrap();
        assert_eq!(income.amount_transferred, 150_000.0);
        assert_relative_eq!(income.iht_saved, 60_000.0, epsilon = 1e-9);

        // Two complete cycles, limited by the 410,000 left to give
        let pets = plan.allocation(StrategyKind::PetCycles).unwrap();
        assert_eq!(pets.schedule.len(), 1);
        assert_eq!(pets.amount_transferred, 410_000.0);
        assert_relative_eq!(pets.iht_saved, 164_000.0, epsilon = 1e-9);

        // Nothing left to settle on trust
        assert_eq!(
            plan.skip_reason(StrategyKind::CltTrust),
            Some(SkipReason::NoGiftableEstate)
        );
        assert_relative_eq!(plan.remaining_liability, 140_000.0, epsilon = 1e-9);
        assert_relative_eq!(plan.total_iht_saved, 260_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_affordability_not_met() {
        let plan = optimizer().optimize(&PlanningInput {
            surplus_income: 1_500.0,
            ..input()
        });
        assert_eq!(
            plan.skip_reason(StrategyKind::GiftingFromIncome),
            Some(SkipReason::AffordabilityNotMet)
        );

        let plan = optimizer().optimize(&PlanningInput {
            surplus_income: 2_000.0,
            ..input()
        });
        assert!(plan.allocation(StrategyKind::GiftingFromIncome).is_some());
    }

    #[test]
    fn test_insufficient_years_for_pet_cycle() {
        let plan = optimizer().optimize(&PlanningInput {
            years_until_death: 6,
            surplus_income: 0.0,
            ..input()
        });
        assert_eq!(
            plan.skip_reason(StrategyKind::PetCycles),
            Some(SkipReason::InsufficientYears)
        );
        assert!(plan.allocation(StrategyKind::CltTrust).is_some());
    }

    #[test]
    fn test_clt_trust_step() {
        let plan = optimizer().optimize(&PlanningInput {
            liability: 100_000.0,
            years_until_death: 0,
            surplus_income: 0.0,
            giftable_estate: 1_000_000.0,
            ..input()
        });

        let clt = plan.allocation(StrategyKind::CltTrust).unwrap();
        assert_relative_eq!(clt.amount_transferred, 250_000.0, epsilon = 1e-9);
        assert_relative_eq!(clt.immediate_charge, 50_000.0, epsilon = 1e-9);
        assert_relative_eq!(clt.iht_saved, 50_000.0, epsilon = 1e-9);
        assert_eq!(clt.risk_level, RiskLevel::High);
        assert_relative_eq!(plan.remaining_liability, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stops_once_liability_cleared() {
        let plan = optimizer().optimize(&PlanningInput {
            liability: 10_000.0,
            ..input()
        });

        let annual = plan.allocation(StrategyKind::AnnualExemption).unwrap();
        assert_eq!(annual.iht_saved, 10_000.0);
        assert_eq!(plan.remaining_liability, 0.0);
        for later in [
            StrategyKind::GiftingFromIncome,
            StrategyKind::PetCycles,
            StrategyKind::CltTrust,
        ] {
            assert_eq!(plan.skip_reason(later), Some(SkipReason::NoLiabilityRemaining));
        }
    }

    #[test]
    fn test_zero_liability_skips_everything() {
        let plan = optimizer().optimize(&PlanningInput {
            liability: 0.0,
            ..input()
        });
        assert!(plan.allocations.is_empty());
        assert_eq!(plan.skipped.len(), 4);
    }
}
