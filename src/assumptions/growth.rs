//! Annual growth assumptions by asset class

use serde::{Deserialize, Serialize};

use crate::estate::AssetType;

/// Compound growth rates used to roll estates forward to a projected death
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub property: f64,
    pub investment: f64,
    pub cash: f64,
    pub pension: f64,
    pub business: f64,
    /// Chattels, other assets and trust funds
    pub default: f64,
}

impl GrowthRates {
    /// Same rate for every class
    pub fn uniform(rate: f64) -> Self {
        Self {
            property: rate,
            investment: rate,
            cash: rate,
            pension: rate,
            business: rate,
            default: rate,
        }
    }

    pub fn rate_for(&self, asset_type: AssetType) -> f64 {
        match asset_type {
            AssetType::Property => self.property,
            AssetType::Investment => self.investment,
            AssetType::Cash => self.cash,
            AssetType::Pension => self.pension,
            AssetType::Business => self.business,
            AssetType::Chattel | AssetType::Other => self.default,
        }
    }

    /// Compound growth factor for an asset class over `years`
    pub fn factor(&self, asset_type: AssetType, years: u32) -> f64 {
        (1.0 + self.rate_for(asset_type)).powi(years as i32)
    }

    pub fn default_factor(&self, years: u32) -> f64 {
        (1.0 + self.default).powi(years as i32)
    }

    /// Set the rate for a named class, as found in `growth_rates.csv`
    pub fn set(&mut self, asset_class: &str, rate: f64) -> bool {
        let slot = match asset_class.trim().to_ascii_lowercase().as_str() {
            "property" => &mut self.property,
            "investment" => &mut self.investment,
            "cash" => &mut self.cash,
            "pension" => &mut self.pension,
            "business" => &mut self.business,
            "default" => &mut self.default,
            _ => return false,
        };
        *slot = rate;
        true
    }
}

impl Default for GrowthRates {
    fn default() -> Self {
        Self {
            property: 0.035,
            investment: 0.05,
            cash: 0.02,
            pension: 0.045,
            business: 0.04,
            default: 0.03,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rate_lookup() {
        let rates = GrowthRates::default();
        assert_eq!(rates.rate_for(AssetType::Property), 0.035);
        assert_eq!(rates.rate_for(AssetType::Chattel), rates.default);
        assert_eq!(rates.rate_for(AssetType::Other), rates.default);
    }

    #[test]
    fn test_compound_factor() {
        let rates = GrowthRates::uniform(0.05);
        assert_relative_eq!(rates.factor(AssetType::Cash, 25), 1.05f64.powi(25));
        assert_eq!(rates.factor(AssetType::Cash, 0), 1.0);
    }

    #[test]
    fn test_set_by_name() {
        let mut rates = GrowthRates::default();
        assert!(rates.set("Property", 0.06));
        assert_eq!(rates.property, 0.06);
        assert!(!rates.set("crypto", 0.5));
    }
}
