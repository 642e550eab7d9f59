//! Nil-rate band, residence nil-rate band and death-rate selection
//!
//! Every intermediate figure is kept on the breakdown so a result can be
//! reproduced by hand from its inputs.

use serde::{Deserialize, Serialize};

use crate::assumptions::TaxParameters;
use crate::error::{ensure_money, ensure_percent, Result};
use crate::estate::{IhtProfile, MaritalStatus, Residence};

/// State of the residence nil-rate band after eligibility, taper and cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RnrbStatus {
    Full,
    Tapered,
    /// Limited to the value of the residence
    Capped,
    None,
}

/// Why no residence nil-rate band is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RnrbIneligibility {
    DoesNotOwnHome,
    NoResidenceValue,
    NotLeftToDescendants,
}

impl RnrbIneligibility {
    pub fn describe(&self) -> &'static str {
        match self {
            RnrbIneligibility::DoesNotOwnHome => "no qualifying residence is owned",
            RnrbIneligibility::NoResidenceValue => {
                "home ownership recorded but no residence value"
            }
            RnrbIneligibility::NotLeftToDescendants => {
                "residence is not left to direct descendants"
            }
        }
    }
}

/// Inputs to a single allowance calculation
#[derive(Debug, Clone, PartialEq)]
pub struct AllowanceInput {
    /// Chargeable estate after exempt assets and debts
    pub net_estate: f64,
    pub marital_status: MaritalStatus,
    /// NRB inherited from a late spouse
    pub transferred_nrb: f64,
    /// RNRB inherited from a late spouse
    pub transferred_rnrb: f64,
    pub own_home: bool,
    pub residence: Option<Residence>,
    pub residence_to_descendants: bool,
    pub charitable_giving_percent: f64,
    /// NRB already absorbed by gifts in the 7 years before death
    pub nrb_used_by_gifts: f64,
}

impl AllowanceInput {
    /// Build from a profile; transferred bands only count for a widowed profile
    pub fn for_profile(
        profile: &IhtProfile,
        net_estate: f64,
        residence: Option<Residence>,
        nrb_used_by_gifts: f64,
    ) -> Self {
        let inherits = profile.marital_status.inherits_spouse_allowances();
        Self {
            net_estate,
            marital_status: profile.marital_status,
            transferred_nrb: if inherits { profile.nrb_transferred_from_spouse } else { 0.0 },
            transferred_rnrb: if inherits { profile.rnrb_transferred_from_spouse } else { 0.0 },
            own_home: profile.own_home,
            residence,
            residence_to_descendants: profile.residence_to_descendants,
            charitable_giving_percent: profile.charitable_giving_percent,
            nrb_used_by_gifts,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure_money("net_estate", self.net_estate)?;
        ensure_money("transferred_nrb", self.transferred_nrb)?;
        ensure_money("transferred_rnrb", self.transferred_rnrb)?;
        ensure_money("nrb_used_by_gifts", self.nrb_used_by_gifts)?;
        ensure_percent("charitable_giving_percent", self.charitable_giving_percent)?;
        if let Some(residence) = &self.residence {
            ensure_money("residence.value", residence.value)?;
        }
        Ok(())
    }

    fn rnrb_ineligibility(&self) -> Option<RnrbIneligibility> {
        if !self.own_home {
            return Some(RnrbIneligibility::DoesNotOwnHome);
        }
        match &self.residence {
            None => Some(RnrbIneligibility::NoResidenceValue),
            Some(r) if r.value <= 0.0 => Some(RnrbIneligibility::NoResidenceValue),
            Some(_) if !self.residence_to_descendants => {
                Some(RnrbIneligibility::NotLeftToDescendants)
            }
            Some(_) => None,
        }
    }
}

/// Full allowance and liability breakdown for one estate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceBreakdown {
    pub tax_year: String,

    #[serde(with = "crate::money")]
    pub net_estate: f64,

    #[serde(with = "crate::money")]
    pub own_nrb: f64,
    #[serde(with = "crate::money")]
    pub transferred_nrb: f64,
    #[serde(with = "crate::money")]
    pub total_nrb: f64,
    #[serde(with = "crate::money")]
    pub nrb_used_by_gifts: f64,
    #[serde(with = "crate::money")]
    pub nrb_remaining: f64,

    #[serde(with = "crate::money")]
    pub rnrb_full: f64,
    #[serde(with = "crate::money")]
    pub rnrb_taper_reduction: f64,
    #[serde(with = "crate::money")]
    pub rnrb_available: f64,
    pub rnrb_status: RnrbStatus,
    pub rnrb_reason: Option<RnrbIneligibility>,

    #[serde(with = "crate::money")]
    pub total_allowance: f64,
    #[serde(with = "crate::money")]
    pub taxable_estate: f64,
    pub tax_rate: f64,
    pub reduced_rate_applied: bool,
    #[serde(with = "crate::money")]
    pub liability: f64,
    pub effective_rate: f64,
}

/// Compute the allowance breakdown and estate liability
pub fn calculate_allowance(
    input: &AllowanceInput,
    params: &TaxParameters,
) -> Result<AllowanceBreakdown> {
    input.validate()?;

    let own_nrb = params.nrb;
    let transferred_nrb = input.transferred_nrb.min(params.nrb);
    let total_nrb = own_nrb + transferred_nrb;
    let nrb_used_by_gifts = input.nrb_used_by_gifts.min(total_nrb);
    let nrb_remaining = total_nrb - nrb_used_by_gifts;

    let rnrb_reason = input.rnrb_ineligibility();
    let (rnrb_full, rnrb_taper_reduction, rnrb_available, rnrb_status) = match rnrb_reason {
        Some(_) => (0.0, 0.0, 0.0, RnrbStatus::None),
        None => {
            let full = params.rnrb + input.transferred_rnrb.min(params.rnrb);
            let excess = (input.net_estate - params.rnrb_taper_threshold).max(0.0);
            let reduction = (excess * params.rnrb_taper_rate).min(full);
            let after_taper = (full - reduction).max(0.0);
            let residence_value = input.residence.map(|r| r.value).unwrap_or(0.0);
            let available = after_taper.min(residence_value);

            let status = if available < after_taper {
                RnrbStatus::Capped
            } else if reduction > 0.0 {
                RnrbStatus::Tapered
            } else {
                RnrbStatus::Full
            };
            (full, reduction, available, status)
        }
    };

    let total_allowance = nrb_remaining + rnrb_available;
    let taxable_estate = (input.net_estate - total_allowance).max(0.0);
    let tax_rate = params.death_rate(input.charitable_giving_percent);
    let liability = taxable_estate * tax_rate;
    let effective_rate = if input.net_estate > 0.0 {
        liability / input.net_estate
    } else {
        0.0
    };

    log::debug!(
        "allowance: net={:.2} nrb_remaining={:.2} rnrb={:.2} ({:?}) taxable={:.2} rate={}",
        input.net_estate,
        nrb_remaining,
        rnrb_available,
        rnrb_status,
        taxable_estate,
        tax_rate
    );

    Ok(AllowanceBreakdown {
        tax_year: params.tax_year.clone(),
        net_estate: input.net_estate,
        own_nrb,
        transferred_nrb,
        total_nrb,
        nrb_used_by_gifts,
        nrb_remaining,
        rnrb_full,
        rnrb_taper_reduction,
        rnrb_available,
        rnrb_status,
        rnrb_reason,
        total_allowance,
        taxable_estate,
        tax_rate,
        reduced_rate_applied: tax_rate < params.standard_rate,
        liability,
        effective_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IhtError;
    use crate::estate::ResidenceSource;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn residence(value: f64) -> Option<Residence> {
        Some(Residence {
            value,
            source: ResidenceSource::FlaggedAsset,
        })
    }

    fn base_input(net_estate: f64) -> AllowanceInput {
        AllowanceInput {
            net_estate,
            marital_status: MaritalStatus::Single,
            transferred_nrb: 0.0,
            transferred_rnrb: 0.0,
            own_home: false,
            residence: None,
            residence_to_descendants: true,
            charitable_giving_percent: 0.0,
            nrb_used_by_gifts: 0.0,
        }
    }

    #[test]
    fn test_single_person_no_rnrb() {
        let params = TaxParameters::uk_2025_26();
        let result = calculate_allowance(&base_input(900_000.0), &params).unwrap();

        assert_eq!(result.total_nrb, 325_000.0);
        assert_eq!(result.rnrb_available, 0.0);
        assert_eq!(result.rnrb_status, RnrbStatus::None);
        assert_eq!(result.rnrb_reason, Some(RnrbIneligibility::DoesNotOwnHome));
        assert_eq!(result.taxable_estate, 575_000.0);
        assert_relative_eq!(result.liability, 230_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.effective_rate, 230_000.0 / 900_000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_full_rnrb_with_home() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            own_home: true,
            residence: residence(400_000.0),
            ..base_input(800_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();

        assert_eq!(result.rnrb_status, RnrbStatus::Full);
        assert_eq!(result.rnrb_available, 175_000.0);
        assert_eq!(result.total_allowance, 500_000.0);
        assert_relative_eq!(result.liability, 120_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rnrb_taper() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            own_home: true,
            residence: residence(1_000_000.0),
            ..base_input(2_100_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();

        assert_eq!(result.rnrb_status, RnrbStatus::Tapered);
        assert_eq!(result.rnrb_taper_reduction, 50_000.0);
        assert_eq!(result.rnrb_available, 125_000.0);
    }

    #[test]
    fn test_rnrb_fully_tapered() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            own_home: true,
            residence: residence(1_000_000.0),
            ..base_input(3_000_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();
        assert_eq!(result.rnrb_available, 0.0);
        assert_eq!(result.rnrb_taper_reduction, 175_000.0);
        assert_eq!(result.rnrb_status, RnrbStatus::Tapered);
    }

    #[test]
    fn test_rnrb_capped_at_residence_value() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            own_home: true,
            residence: residence(90_000.0),
            ..base_input(600_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();
        assert_eq!(result.rnrb_status, RnrbStatus::Capped);
        assert_eq!(result.rnrb_available, 90_000.0);
    }

    #[test]
    fn test_ineligibility_reasons() {
        let params = TaxParameters::uk_2025_26();

        let no_value = AllowanceInput {
            own_home: true,
            ..base_input(600_000.0)
        };
        let result = calculate_allowance(&no_value, &params).unwrap();
        assert_eq!(result.rnrb_reason, Some(RnrbIneligibility::NoResidenceValue));

        let to_spouse = AllowanceInput {
            own_home: true,
            residence: residence(300_000.0),
            residence_to_descendants: false,
            ..base_input(600_000.0)
        };
        let result = calculate_allowance(&to_spouse, &params).unwrap();
        assert_eq!(result.rnrb_reason, Some(RnrbIneligibility::NotLeftToDescendants));
        assert_eq!(result.rnrb_available, 0.0);
    }

    #[test]
    fn test_transferred_bands_capped_at_one_band() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            marital_status: MaritalStatus::Widowed,
            transferred_nrb: 500_000.0,
            transferred_rnrb: 175_000.0,
            own_home: true,
            residence: residence(700_000.0),
            ..base_input(1_500_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();
        assert_eq!(result.transferred_nrb, 325_000.0);
        assert_eq!(result.total_nrb, 650_000.0);
        assert_eq!(result.rnrb_available, 350_000.0);
        assert_eq!(result.total_allowance, 1_000_000.0);
    }

    #[test]
    fn test_profile_transfer_only_when_widowed() {
        let mut profile = IhtProfile::new(MaritalStatus::Married);
        profile.nrb_transferred_from_spouse = 325_000.0;
        let married = AllowanceInput::for_profile(&profile, 500_000.0, None, 0.0);
        assert_eq!(married.transferred_nrb, 0.0);

        profile.marital_status = MaritalStatus::Widowed;
        let widowed = AllowanceInput::for_profile(&profile, 500_000.0, None, 0.0);
        assert_eq!(widowed.transferred_nrb, 325_000.0);
    }

    #[test]
    fn test_gifts_consume_nrb() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            nrb_used_by_gifts: 200_000.0,
            ..base_input(500_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();
        assert_eq!(result.nrb_remaining, 125_000.0);
        assert_eq!(result.taxable_estate, 375_000.0);
    }

    #[test]
    fn test_charitable_rate() {
        let params = TaxParameters::uk_2025_26();
        let input = AllowanceInput {
            charitable_giving_percent: 10.0,
            ..base_input(900_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();
        assert_eq!(result.tax_rate, 0.36);
        assert!(result.reduced_rate_applied);

        let input = AllowanceInput {
            charitable_giving_percent: 9.999,
            ..base_input(900_000.0)
        };
        let result = calculate_allowance(&input, &params).unwrap();
        assert_eq!(result.tax_rate, 0.40);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let params = TaxParameters::uk_2025_26();
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = calculate_allowance(&base_input(bad), &params).unwrap_err();
            assert!(matches!(
                err,
                IhtError::InvalidEstateValue { ref field, .. } if field == "net_estate"
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_rnrb_never_negative_and_full_below_threshold(net in 0.0f64..6_000_000.0) {
            let params = TaxParameters::uk_2025_26();
            let input = AllowanceInput {
                own_home: true,
                residence: residence(10_000_000.0),
                ..base_input(net)
            };
            let result = calculate_allowance(&input, &params).unwrap();
            prop_assert!(result.rnrb_available >= 0.0);
            if net <= params.rnrb_taper_threshold {
                prop_assert_eq!(result.rnrb_available, params.rnrb);
            }
            prop_assert!(result.taxable_estate >= 0.0);
        }
    }
}
