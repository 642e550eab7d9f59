//! Life cover sizing and the self-insurance alternative
//!
//! The residual liability is priced as a level whole-of-life premium. The same
//! premium invested each year instead builds a self-insurance fund; comparing
//! the two drives the recommendation.

use serde::{Deserialize, Serialize};

use crate::assumptions::{PremiumTable, TaxParameters};
use crate::estate::Gender;

/// A life to be insured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsuredLife {
    pub age: u32,
    pub gender: Gender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyBasis {
    SingleLife,
    /// Pays out on the second death of a couple
    JointLifeSecondDeath,
}

/// How well the self-insurance fund is expected to cover the liability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_coverage(coverage_percent: f64) -> Self {
        if coverage_percent >= 100.0 {
            Confidence::High
        } else if coverage_percent >= 75.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverRecommendation {
    /// Invest the premium instead
    SelfInsure,
    /// Self-insure and buy cover for the shortfall
    PartialCover,
    LifeCover,
}

impl CoverRecommendation {
    pub fn describe(&self) -> &'static str {
        match self {
            CoverRecommendation::SelfInsure => {
                "investing the premium is expected to meet the liability in full"
            }
            CoverRecommendation::PartialCover => {
                "invest the premium and insure the expected shortfall"
            }
            CoverRecommendation::LifeCover => {
                "a whole-of-life policy in trust gives certainty self-insurance cannot"
            }
        }
    }
}

/// Life cover priced against the residual liability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeCoverQuote {
    pub basis: PolicyBasis,
    #[serde(with = "crate::money")]
    pub cover_amount: f64,
    #[serde(with = "crate::money")]
    pub annual_premium: f64,
    pub term_years: u32,
    #[serde(with = "crate::money")]
    pub total_premiums: f64,
    pub investment_rate: f64,
    /// Future value of investing the premium each year instead
    #[serde(with = "crate::money")]
    pub self_insurance_fund: f64,
    pub coverage_percent: f64,
    pub confidence: Confidence,
    /// Total premiums per pound of cover
    pub cost_benefit_ratio: f64,
    pub recommendation: CoverRecommendation,
    /// Cover still needed alongside the self-insurance fund
    #[serde(with = "crate::money")]
    pub top_up_cover: f64,
}

/// Future value of `payment` invested at the end of each year for `years`
pub fn future_value_annuity(payment: f64, years: u32, annual_rate: f64) -> f64 {
    if annual_rate.abs() < 1e-10 {
        return payment * years as f64;
    }
    payment * ((1.0 + annual_rate).powi(years as i32) - 1.0) / annual_rate
}

/// Annual premium for `cover` on one life, or second-death on two
pub fn annual_premium(
    cover: f64,
    lives: &[InsuredLife],
    premiums: &PremiumTable,
    params: &TaxParameters,
) -> Option<(PolicyBasis, f64)> {
    match lives {
        [life] => premiums
            .single_life_premium(life.age, life.gender, cover)
            .map(|p| (PolicyBasis::SingleLife, p)),
        [first, second] => {
            let a = premiums.rate_per_thousand(first.age, first.gender)?;
            let b = premiums.rate_per_thousand(second.age, second.gender)?;
            let rate = (1.0 - params.joint_life_discount) * (a + b) / 2.0;
            Some((PolicyBasis::JointLifeSecondDeath, rate * cover / 1_000.0))
        }
        _ => None,
    }
}

/// Price cover for `cover` and compare with self-insurance over `years`
///
/// Returns `None` when there is nothing to cover or no premium rate applies.
pub fn quote_life_cover(
    cover: f64,
    lives: &[InsuredLife],
    years: u32,
    investment_rate: f64,
    premiums: &PremiumTable,
    params: &TaxParameters,
) -> Option<LifeCoverQuote> {
    if cover <= 0.0 {
        return None;
    }
    let (basis, annual_premium) = annual_premium(cover, lives, premiums, params)?;

    // At least one premium is paid even when death is expected this year
    let term_years = years.max(1);
    let total_premiums = annual_premium * term_years as f64;
    let fund = future_value_annuity(annual_premium, term_years, investment_rate);
    let coverage_percent = fund / cover * 100.0;
    let confidence = Confidence::from_coverage(coverage_percent);

    let recommendation = match confidence {
        Confidence::High => CoverRecommendation::SelfInsure,
        Confidence::Medium => CoverRecommendation::PartialCover,
        Confidence::Low => CoverRecommendation::LifeCover,
    };
    let top_up_cover = match recommendation {
        CoverRecommendation::SelfInsure => 0.0,
        CoverRecommendation::PartialCover => (cover - fund).max(0.0),
        CoverRecommendation::LifeCover => cover,
    };

    log::debug!(
        "life cover {:.2}: premium {:.2}/yr over {} years, fund {:.2} ({:.1}%)",
        cover,
        annual_premium,
        term_years,
        fund,
        coverage_percent
    );

    Some(LifeCoverQuote {
        basis,
        cover_amount: cover,
        annual_premium,
        term_years,
        total_premiums,
        investment_rate,
        self_insurance_fund: fund,
        coverage_percent,
        confidence,
        cost_benefit_ratio: total_premiums / cover,
        recommendation,
        top_up_cover,
    })
}
