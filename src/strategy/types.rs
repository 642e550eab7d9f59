//! Core types for mitigation planning

use serde::{Deserialize, Serialize};

use super::life_cover::LifeCoverQuote;

/// Mitigation steps, in waterfall order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    AnnualExemption,
    GiftingFromIncome,
    PetCycles,
    CltTrust,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::AnnualExemption => "Annual exemption gifts",
            StrategyKind::GiftingFromIncome => "Regular gifts from surplus income",
            StrategyKind::PetCycles => "Seven-year PET cycles",
            StrategyKind::CltTrust => "Chargeable transfer into trust",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

/// Why a step contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Surplus income too small to sustain worthwhile gifts
    AffordabilityNotMet,
    /// Not enough projected years for the step to complete
    InsufficientYears,
    /// Earlier steps already removed the liability
    NoLiabilityRemaining,
    /// Nothing liquid left to give
    NoGiftableEstate,
}

/// A planned transfer `year` years from today
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGift {
    pub year: u32,
    #[serde(with = "crate::money")]
    pub amount: f64,
}

/// One waterfall step that was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAllocation {
    pub strategy: StrategyKind,
    #[serde(with = "crate::money")]
    pub amount_transferred: f64,
    /// Net reduction in tax, after any immediate charge
    #[serde(with = "crate::money")]
    pub iht_saved: f64,
    /// Tax payable at the time of transfer
    #[serde(with = "crate::money")]
    pub immediate_charge: f64,
    pub risk_level: RiskLevel,
    pub schedule: Vec<ScheduledGift>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStrategy {
    pub strategy: StrategyKind,
    pub reason: SkipReason,
}

/// Result of the waterfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPlan {
    #[serde(with = "crate::money")]
    pub starting_liability: f64,
    #[serde(with = "crate::money")]
    pub giftable_estate: f64,
    pub allocations: Vec<StrategyAllocation>,
    pub skipped: Vec<SkippedStrategy>,
    #[serde(with = "crate::money")]
    pub total_transferred: f64,
    #[serde(with = "crate::money")]
    pub total_iht_saved: f64,
    #[serde(with = "crate::money")]
    pub remaining_liability: f64,
    /// Cover for whatever liability the gifting steps leave
    pub life_cover: Option<LifeCoverQuote>,
}

impl StrategyPlan {
    pub fn allocation(&self, strategy: StrategyKind) -> Option<&StrategyAllocation> {
        self.allocations.iter().find(|a| a.strategy == strategy)
    }

    pub fn skip_reason(&self, strategy: StrategyKind) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.strategy == strategy)
            .map(|s| s.reason)
    }
}
