//! Versioned UK inheritance tax parameters
//!
//! Every threshold and rate used by the calculators lives here so a run can be
//! replayed against any configured tax year.

use serde::{Deserialize, Serialize};

/// Taper relief schedule: gifts younger than `years` pay `fraction` of the full rate
const TAPER_SCHEDULE: [(f64, f64); 4] = [(3.0, 1.0), (4.0, 0.8), (5.0, 0.6), (6.0, 0.4)];

/// Fraction payable from the last scheduled tier until the PET window closes
const FINAL_TAPER_FRACTION: f64 = 0.2;

/// Tax-parameter bundle for one tax year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxParameters {
    /// Tax year label, e.g. "2025-26"
    pub tax_year: String,

    /// Nil-rate band per person
    pub nrb: f64,

    /// Residence nil-rate band per person
    pub rnrb: f64,

    /// Net estate above which the RNRB is withdrawn
    pub rnrb_taper_threshold: f64,

    /// RNRB withdrawn per pound above the threshold
    pub rnrb_taper_rate: f64,

    /// Death rate
    pub standard_rate: f64,

    /// Death rate when enough of the estate is left to charity
    pub reduced_rate: f64,

    /// Charitable giving percentage that unlocks the reduced rate
    pub charitable_threshold_percent: f64,

    /// Annual exemption per donor
    pub annual_exemption: f64,

    /// Small-gift exemption per recipient
    pub small_gift_limit: f64,

    /// Lifetime charge on chargeable lifetime transfers
    pub clt_lifetime_rate: f64,

    /// Years after which a PET drops out entirely
    pub pet_window_years: u32,

    /// Cumulation lookback for chargeable lifetime transfers
    pub clt_lookback_years: u32,

    /// Minimum annual gift for the gifting-from-income strategy to be worthwhile
    pub income_gift_floor: f64,

    /// Discount of a joint-life second-death policy against two single-life policies
    pub joint_life_discount: f64,
}

impl TaxParameters {
    /// 2025-26 parameters (bands frozen since 2020-21)
    pub fn uk_2025_26() -> Self {
        Self {
            tax_year: "2025-26".to_string(),
            nrb: 325_000.0,
            rnrb: 175_000.0,
            rnrb_taper_threshold: 2_000_000.0,
            rnrb_taper_rate: 0.5,
            standard_rate: 0.40,
            reduced_rate: 0.36,
            charitable_threshold_percent: 10.0,
            annual_exemption: 3_000.0,
            small_gift_limit: 250.0,
            clt_lifetime_rate: 0.20,
            pet_window_years: 7,
            clt_lookback_years: 14,
            income_gift_floor: 1_000.0,
            joint_life_discount: 0.25,
        }
    }

    /// Share of the full rate still payable on a gift made `years` before death
    ///
    /// The last tier ends with `pet_window_years`, so the taper always agrees
    /// with the window the gift ledger filters on.
    pub fn taper_fraction(&self, years: f64) -> f64 {
        if years < 0.0 {
            return 1.0;
        }
        if years >= self.pet_window_years as f64 {
            return 0.0;
        }
        TAPER_SCHEDULE
            .iter()
            .find(|(limit, _)| years < *limit)
            .map(|(_, fraction)| *fraction)
            .unwrap_or(FINAL_TAPER_FRACTION)
    }

    /// Effective rate on the taxable part of a gift made `years` before death
    pub fn taper_rate(&self, years: f64) -> f64 {
        self.standard_rate * self.taper_fraction(years)
    }

    /// Death rate after the charitable-giving test
    pub fn death_rate(&self, charitable_giving_percent: f64) -> f64 {
        if charitable_giving_percent >= self.charitable_threshold_percent {
            self.reduced_rate
        } else {
            self.standard_rate
        }
    }
}

impl Default for TaxParameters {
    fn default() -> Self {
        Self::uk_2025_26()
    }
}
