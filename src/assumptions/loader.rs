//! CSV-based assumption loader
//!
//! Loads tax parameters, growth rates, the life table and premium rates from
//! CSV files in data/assumptions/

use std::fs::File;
use std::path::Path;

use super::growth::GrowthRates;
use super::life_table::LifeTableRow;
use super::premium::PremiumRateRow;
use super::tax::TaxParameters;
use crate::error::{IhtError, Result};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// Load every configured tax year from tax_parameters.csv
pub fn load_tax_parameters(path: &Path) -> Result<Vec<TaxParameters>> {
    let file = File::open(path.join("tax_parameters.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut years = Vec::new();
    for result in reader.deserialize() {
        let params: TaxParameters = result?;
        years.push(params);
    }

    Ok(years)
}

/// Pick one tax year out of the loaded parameter sets
pub fn select_tax_year(years: Vec<TaxParameters>, tax_year: &str) -> Result<TaxParameters> {
    years
        .into_iter()
        .find(|p| p.tax_year == tax_year)
        .ok_or_else(|| IhtError::UnknownTaxYear(tax_year.to_string()))
}

/// Load growth rates from growth_rates.csv
/// Classes missing from the file keep their built-in defaults
pub fn load_growth_rates(path: &Path) -> Result<GrowthRates> {
    let file = File::open(path.join("growth_rates.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rates = GrowthRates::default();

    for result in reader.records() {
        let record = result?;
        let class = &record[0];
        let rate: f64 = record[1]
            .trim()
            .parse()
            .map_err(|e| IhtError::InvalidRecord(format!("growth rate for {class}: {e}")))?;

        if !rates.set(class, rate) {
            return Err(IhtError::InvalidRecord(format!("unknown asset class: {class}")));
        }
    }

    Ok(rates)
}

/// Load life table rows from life_table.csv
pub fn load_life_table(path: &Path) -> Result<Vec<LifeTableRow>> {
    let file = File::open(path.join("life_table.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: LifeTableRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// Load premium rate rows from premium_rates.csv
pub fn load_premium_rates(path: &Path) -> Result<Vec<PremiumRateRow>> {
    let file = File::open(path.join("premium_rates.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: PremiumRateRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// All assumption files from one directory
pub struct LoadedAssumptions {
    pub tax_years: Vec<TaxParameters>,
    pub growth_rates: GrowthRates,
    pub life_table: Vec<LifeTableRow>,
    pub premium_rates: Vec<PremiumRateRow>,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self {
            tax_years: load_tax_parameters(path)?,
            growth_rates: load_growth_rates(path)?,
            life_table: load_life_table(path)?,
            premium_rates: load_premium_rates(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estate::Gender;

    #[test]
    fn test_load_default_assumptions() {
        let result = LoadedAssumptions::load_default();
        assert!(result.is_ok(), "Failed to load assumptions: {:?}", result.err());

        let assumptions = result.unwrap();

        // Several tax years for historical replay
        assert!(assumptions.tax_years.len() >= 3);
        let current = select_tax_year(assumptions.tax_years.clone(), "2025-26").unwrap();
        assert_eq!(current, TaxParameters::uk_2025_26());

        assert_eq!(assumptions.growth_rates, GrowthRates::default());

        assert!(assumptions
            .life_table
            .iter()
            .any(|r| r.age == 70 && r.gender == Gender::Female));
        assert!(!assumptions.premium_rates.is_empty());
    }

    #[test]
    fn test_unknown_tax_year() {
        let err = select_tax_year(vec![TaxParameters::uk_2025_26()], "1999-00").unwrap_err();
        assert!(matches!(err, IhtError::UnknownTaxYear(ref y) if y == "1999-00"));
    }

    #[test]
    fn test_historical_rnrb() {
        let years = load_tax_parameters(Path::new(DEFAULT_ASSUMPTIONS_PATH)).unwrap();
        let first_rnrb_year = select_tax_year(years, "2017-18").unwrap();
        assert_eq!(first_rnrb_year.rnrb, 100_000.0);
        assert_eq!(first_rnrb_year.nrb, 325_000.0);
    }
}
