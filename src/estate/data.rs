//! Estate records supplied by the asset-aggregation collaborator

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_money, Result};

/// Asset class of a normalized asset record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Cash,
    Investment,
    Property,
    Business,
    Pension,
    Chattel,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Cash => "cash",
            AssetType::Investment => "investment",
            AssetType::Property => "property",
            AssetType::Business => "business",
            AssetType::Pension => "pension",
            AssetType::Chattel => "chattel",
            AssetType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(AssetType::Cash),
            "investment" => Some(AssetType::Investment),
            "property" => Some(AssetType::Property),
            "business" => Some(AssetType::Business),
            "pension" => Some(AssetType::Pension),
            "chattel" => Some(AssetType::Chattel),
            "other" => Some(AssetType::Other),
            _ => None,
        }
    }
}

/// How an asset is held. Joint values arrive already netted to this person's share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Individual,
    Joint,
    Trust,
}

impl Ownership {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(Ownership::Individual),
            "joint" => Some(Ownership::Joint),
            "trust" => Some(Ownership::Trust),
            _ => None,
        }
    }
}

/// A single normalized asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_type: AssetType,

    /// Free-text name from the source record
    #[serde(default)]
    pub name: String,

    /// Value attributable to this person
    pub value: f64,

    pub ownership: Ownership,

    /// Outside the chargeable estate (e.g. pension wrappers, exempt business property)
    #[serde(default)]
    pub iht_exempt: bool,

    /// Upstream flag marking the qualifying main residence
    #[serde(default)]
    pub is_main_residence: bool,
}

impl Asset {
    pub fn new(asset_type: AssetType, name: &str, value: f64) -> Self {
        Self {
            asset_type,
            name: name.to_string(),
            value,
            ownership: Ownership::Individual,
            iht_exempt: false,
            is_main_residence: false,
        }
    }

    /// Builder-style helper for the main residence
    pub fn main_residence(name: &str, value: f64) -> Self {
        Self {
            is_main_residence: true,
            ..Self::new(AssetType::Property, name, value)
        }
    }

    pub fn exempt(mut self) -> Self {
        self.iht_exempt = true;
        self
    }

    pub fn held(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }
}

/// Trust arrangements, each with its own rule for what counts in the estate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TrustType {
    Bare,
    Discretionary,
    InterestInPossession,
    LoanTrust { outstanding_loan: f64 },
    GiftWithReservation,
}

/// A trust the person has an interest in or settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trust {
    pub trust_type: TrustType,
    pub current_value: f64,

    /// Held under the relevant-property regime
    #[serde(default)]
    pub relevant_property: bool,
}

impl Trust {
    /// Portion of the trust fund that counts towards this person's estate
    pub fn iht_value(&self) -> f64 {
        match self.trust_type {
            TrustType::Bare | TrustType::Discretionary => 0.0,
            TrustType::InterestInPossession => {
                if self.relevant_property {
                    0.0
                } else {
                    self.current_value
                }
            }
            TrustType::LoanTrust { outstanding_loan } => outstanding_loan.min(self.current_value),
            TrustType::GiftWithReservation => self.current_value,
        }
    }
}

/// Snapshot of one person's estate for a single calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstateSnapshot {
    #[serde(default)]
    pub assets: Vec<Asset>,

    #[serde(default)]
    pub trusts: Vec<Trust>,

    /// Aggregated liability totals (mortgages, loans), already netted for joint ownership
    #[serde(default)]
    pub liabilities: Vec<f64>,
}

impl EstateSnapshot {
    pub fn gross_estate(&self) -> f64 {
        let assets: f64 = self.assets.iter().map(|a| a.value).sum();
        let trusts: f64 = self.trusts.iter().map(Trust::iht_value).sum();
        assets + trusts
    }

    pub fn exempt_assets(&self) -> f64 {
        self.assets.iter().filter(|a| a.iht_exempt).map(|a| a.value).sum()
    }

    pub fn total_liabilities(&self) -> f64 {
        self.liabilities.iter().sum()
    }

    /// Chargeable estate after exempt assets and debts
    pub fn net_estate(&self) -> f64 {
        (self.gross_estate() - self.exempt_assets() - self.total_liabilities()).max(0.0)
    }

    /// Reject negative or non-finite values, naming the field
    pub fn validate(&self, prefix: &str) -> Result<()> {
        for (i, asset) in self.assets.iter().enumerate() {
            ensure_money(&format!("{prefix}.assets[{i}].value"), asset.value)?;
        }
        for (i, trust) in self.trusts.iter().enumerate() {
            ensure_money(&format!("{prefix}.trusts[{i}].current_value"), trust.current_value)?;
            if let TrustType::LoanTrust { outstanding_loan } = trust.trust_type {
                ensure_money(&format!("{prefix}.trusts[{i}].outstanding_loan"), outstanding_loan)?;
            }
        }
        for (i, liability) in self.liabilities.iter().enumerate() {
            ensure_money(&format!("{prefix}.liabilities[{i}]"), *liability)?;
        }
        Ok(())
    }
}

/// Category of a lifetime transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftKind {
    /// Potentially exempt transfer
    Pet,
    /// Chargeable lifetime transfer (e.g. into a discretionary trust)
    Clt,
    /// Spouse, charity and other outright exempt transfers
    ExemptTransfer,
    /// Small gift within the per-recipient limit
    SmallGift,
}

impl GiftKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pet" => Some(GiftKind::Pet),
            "clt" => Some(GiftKind::Clt),
            "exempt_transfer" | "exempt" => Some(GiftKind::ExemptTransfer),
            "small_gift" | "small" => Some(GiftKind::SmallGift),
            _ => None,
        }
    }
}

/// A recorded lifetime gift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub date: NaiveDate,
    pub recipient: String,
    pub value: f64,
    pub kind: GiftKind,
}

impl Gift {
    pub fn new(date: NaiveDate, recipient: &str, value: f64, kind: GiftKind) -> Self {
        Self {
            date,
            recipient: recipient.to_string(),
            value,
            kind,
        }
    }

    pub fn pet(date: NaiveDate, recipient: &str, value: f64) -> Self {
        Self::new(date, recipient, value, GiftKind::Pet)
    }

    pub fn clt(date: NaiveDate, recipient: &str, value: f64) -> Self {
        Self::new(date, recipient, value, GiftKind::Clt)
    }
}

pub fn validate_gifts(gifts: &[Gift], prefix: &str) -> Result<()> {
    for (i, gift) in gifts.iter().enumerate() {
        ensure_money(&format!("{prefix}.gifts[{i}].value"), gift.value)?;
    }
    Ok(())
}
