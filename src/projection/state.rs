//! Estate state rolled forward through a projection

use crate::assumptions::GrowthRates;
use crate::estate::{Asset, EstateSnapshot};

/// An estate's values at some point in a projection
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedEstate {
    /// Asset records with grown values
    pub assets: Vec<Asset>,

    /// Combined IHT value of trust interests
    pub trust_value: f64,

    /// Debts, held flat
    pub liabilities: f64,

    /// Years of growth applied since the valuation date
    pub years_grown: u32,
}

impl ProjectedEstate {
    /// Starting state from today's snapshot
    pub fn from_snapshot(estate: &EstateSnapshot) -> Self {
        Self {
            assets: estate.assets.clone(),
            trust_value: estate.trusts.iter().map(|t| t.iht_value()).sum(),
            liabilities: estate.total_liabilities(),
            years_grown: 0,
        }
    }

    /// Grow every asset at its class rate and trusts at the default rate
    pub fn grown(&self, growth: &GrowthRates, years: u32) -> Self {
        let assets = self
            .assets
            .iter()
            .map(|a| Asset {
                value: a.value * growth.factor(a.asset_type, years),
                ..a.clone()
            })
            .collect();

        Self {
            assets,
            trust_value: self.trust_value * growth.default_factor(years),
            liabilities: self.liabilities,
            years_grown: self.years_grown + years,
        }
    }

    /// Two estates merged, as when one spouse inherits the other's
    pub fn combined(&self, other: &ProjectedEstate) -> Self {
        let mut assets = self.assets.clone();
        assets.extend(other.assets.iter().cloned());

        Self {
            assets,
            trust_value: self.trust_value + other.trust_value,
            liabilities: self.liabilities + other.liabilities,
            years_grown: self.years_grown.max(other.years_grown),
        }
    }

    pub fn gross_estate(&self) -> f64 {
        self.assets.iter().map(|a| a.value).sum::<f64>() + self.trust_value
    }

    pub fn exempt_assets(&self) -> f64 {
        self.assets.iter().filter(|a| a.iht_exempt).map(|a| a.value).sum()
    }

    pub fn net_estate(&self) -> f64 {
        (self.gross_estate() - self.exempt_assets() - self.liabilities).max(0.0)
    }
}
