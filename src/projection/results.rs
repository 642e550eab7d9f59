//! Projection result types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assumptions::LifeExpectancy;
use crate::estate::{Gender, Residence};
use crate::liability::{AllowanceBreakdown, CltLedger, PetLedger, SpousalTransfer};

/// A reason a result is less reliable than its inputs would suggest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "issue")]
pub enum DataQualityIssue {
    /// No life-table rows; the conservative fallback was used
    NoLifeTableData { role: String },
    /// No date of birth; projected as if death were today
    MissingDateOfBirth { role: String },
    /// No gender; the shorter life expectancy was assumed
    GenderAssumed { role: String, assumed: Gender },
    /// Residence value inferred from an asset name
    ResidenceInferredFromName { role: String },
}

/// Whether any fallback was taken while producing a result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub degraded: bool,
    pub issues: Vec<DataQualityIssue>,
}

impl DataQuality {
    pub fn flag(&mut self, issue: DataQualityIssue) {
        log::warn!("degraded calculation: {:?}", issue);
        self.degraded = true;
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }
}

/// IHT position of one estate at one valuation date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityAssessment {
    pub valuation_date: NaiveDate,

    #[serde(with = "crate::money")]
    pub gross_estate: f64,
    #[serde(with = "crate::money")]
    pub exempt_assets: f64,
    #[serde(with = "crate::money")]
    pub liabilities: f64,
    #[serde(with = "crate::money")]
    pub net_estate: f64,

    pub residence: Option<Residence>,
    pub pet_ledger: PetLedger,
    pub clt_ledger: CltLedger,
    pub allowance: AllowanceBreakdown,

    /// Tax on the estate itself
    #[serde(with = "crate::money")]
    pub estate_liability: f64,
    /// Tax on failed PETs
    #[serde(with = "crate::money")]
    pub gifting_liability: f64,
    #[serde(with = "crate::money")]
    pub total_liability: f64,
}

/// Life expectancy and projected death for one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuarialProfile {
    pub role: String,
    pub person_id: String,
    pub age: Option<u32>,
    /// Gender used for the lookup, possibly assumed
    pub gender: Option<Gender>,
    pub life_expectancy: Option<LifeExpectancy>,
    pub years_until_death: u32,
    pub estimated_age_at_death: Option<u32>,
    pub estimated_date_of_death: NaiveDate,
}

/// Projection for a person with no spouse in the calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleProjection {
    pub actuarial: ActuarialProfile,
    pub current: LiabilityAssessment,
    pub projected: LiabilityAssessment,
    pub data_quality: DataQuality,
}

/// The first death of a couple; everything passes to the survivor tax-free
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstDeathEvent {
    pub date: NaiveDate,
    pub deceased_person_id: String,
    pub years_from_today: u32,
    #[serde(with = "crate::money")]
    pub deceased_estate: f64,
    #[serde(with = "crate::money")]
    pub survivor_estate: f64,
    #[serde(with = "crate::money")]
    pub combined_value_passing: f64,
    #[serde(with = "crate::money")]
    pub iht_due: f64,
    pub spousal_exemption_applied: bool,
}

/// Second-death projection for a married couple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointProjection {
    pub survivor: ActuarialProfile,
    pub deceased: ActuarialProfile,
    pub first_death: FirstDeathEvent,
    pub spousal_transfer: SpousalTransfer,
    /// Both deaths assumed today
    pub current: LiabilityAssessment,
    /// Survivor's estate at the second death
    pub projected: LiabilityAssessment,
    pub data_quality: DataQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Projection {
    Single(SingleProjection),
    Joint(JointProjection),
}

impl Projection {
    pub fn current(&self) -> &LiabilityAssessment {
        match self {
            Projection::Single(p) => &p.current,
            Projection::Joint(p) => &p.current,
        }
    }

    pub fn projected(&self) -> &LiabilityAssessment {
        match self {
            Projection::Single(p) => &p.projected,
            Projection::Joint(p) => &p.projected,
        }
    }

    /// Years until the death on which tax falls (the second death for a couple)
    pub fn horizon_years(&self) -> u32 {
        match self {
            Projection::Single(p) => p.actuarial.years_until_death,
            Projection::Joint(p) => p.survivor.years_until_death,
        }
    }

    pub fn data_quality(&self) -> &DataQuality {
        match self {
            Projection::Single(p) => &p.data_quality,
            Projection::Joint(p) => &p.data_quality,
        }
    }

    pub fn is_joint(&self) -> bool {
        matches!(self, Projection::Joint(_))
    }
}
