//! Calculation assumptions: tax parameters, growth rates, life and premium tables

mod tax;
mod growth;
mod life_table;
mod premium;
pub mod loader;

pub use tax::TaxParameters;
pub use growth::GrowthRates;
pub use life_table::{
    LifeExpectancy, LifeExpectancySource, LifeTable, LifeTableRow, DEFAULT_TABLE_VERSION,
};
pub use premium::{PremiumRateRow, PremiumTable};
pub use loader::LoadedAssumptions;

use std::path::Path;

use crate::error::Result;

/// Container for all calculation assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub tax: TaxParameters,
    pub growth: GrowthRates,
    pub life_table: LifeTable,
    pub premiums: PremiumTable,
}

impl Assumptions {
    /// Built-in 2025-26 parameters with the shipped tables
    pub fn default_uk() -> Self {
        Self {
            tax: TaxParameters::uk_2025_26(),
            growth: GrowthRates::default(),
            life_table: LifeTable::uk_national(),
            premiums: PremiumTable::indicative_uk(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv(tax_year: &str) -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH), tax_year)
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path, tax_year: &str) -> Result<Self> {
        let loaded = LoadedAssumptions::load_from(path)?;
        let tax = loader::select_tax_year(loaded.tax_years, tax_year)?;

        Ok(Self {
            tax,
            growth: loaded.growth_rates,
            life_table: LifeTable::new(loaded.life_table, DEFAULT_TABLE_VERSION),
            premiums: PremiumTable::new(loaded.premium_rates),
        })
    }

    /// Same assumptions with a different tax-parameter set
    pub fn with_tax(mut self, tax: TaxParameters) -> Self {
        self.tax = tax;
        self
    }

    /// Same assumptions with different growth rates
    pub fn with_growth(mut self, growth: GrowthRates) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_life_table(mut self, life_table: LifeTable) -> Self {
        self.life_table = life_table;
        self
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_uk()
    }
}
