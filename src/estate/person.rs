//! People, IHT profiles and households

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::data::{validate_gifts, EstateSnapshot, Gift};
use crate::error::{ensure_money, ensure_percent, Result};

/// Gender used for life-table and premium lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Actuarial facts about a person. Either field may be unknown upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Person {
    pub fn new(date_of_birth: NaiveDate, gender: Gender) -> Self {
        Self {
            date_of_birth: Some(date_of_birth),
            gender: Some(gender),
        }
    }

    /// Age in completed years on `today`
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        if today < dob {
            return Some(0);
        }
        let mut age = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        Some(age.max(0) as u32)
    }

    /// Names of missing actuarial fields, prefixed with the person's role
    pub fn missing_fields(&self, role: &str) -> Vec<String> {
        let mut missing = Vec::new();
        if self.date_of_birth.is_none() {
            missing.push(format!("{role}.date_of_birth"));
        }
        if self.gender.is_none() {
            missing.push(format!("{role}.gender"));
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    CivilPartnership,
    Widowed,
    Divorced,
}

impl MaritalStatus {
    pub fn has_spouse(&self) -> bool {
        matches!(self, MaritalStatus::Married | MaritalStatus::CivilPartnership)
    }

    /// Whether allowances transferred from a late spouse apply on this person's death
    pub fn inherits_spouse_allowances(&self) -> bool {
        matches!(self, MaritalStatus::Widowed)
    }
}

/// Per-person IHT profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IhtProfile {
    pub marital_status: MaritalStatus,

    #[serde(default)]
    pub own_home: bool,

    #[serde(default)]
    pub home_value: f64,

    /// NRB inherited from a late spouse (widowed profiles only)
    #[serde(default)]
    pub nrb_transferred_from_spouse: f64,

    /// RNRB inherited from a late spouse (widowed profiles only)
    #[serde(default)]
    pub rnrb_transferred_from_spouse: f64,

    /// Share of the estate left to charity, in percent
    #[serde(default)]
    pub charitable_giving_percent: f64,

    /// The residence is left to direct descendants on this person's death
    #[serde(default = "default_true")]
    pub residence_to_descendants: bool,
}

fn default_true() -> bool {
    true
}

impl IhtProfile {
    pub fn new(marital_status: MaritalStatus) -> Self {
        Self {
            marital_status,
            own_home: false,
            home_value: 0.0,
            nrb_transferred_from_spouse: 0.0,
            rnrb_transferred_from_spouse: 0.0,
            charitable_giving_percent: 0.0,
            residence_to_descendants: true,
        }
    }

    pub fn with_home(mut self, home_value: f64) -> Self {
        self.own_home = true;
        self.home_value = home_value;
        self
    }

    pub fn validate(&self, prefix: &str) -> Result<()> {
        ensure_money(&format!("{prefix}.home_value"), self.home_value)?;
        ensure_money(
            &format!("{prefix}.nrb_transferred_from_spouse"),
            self.nrb_transferred_from_spouse,
        )?;
        ensure_money(
            &format!("{prefix}.rnrb_transferred_from_spouse"),
            self.rnrb_transferred_from_spouse,
        )?;
        ensure_percent(
            &format!("{prefix}.charitable_giving_percent"),
            self.charitable_giving_percent,
        )?;
        Ok(())
    }
}

/// Annual income and spending, used for gifting-from-income capacity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeProfile {
    #[serde(default)]
    pub annual_income: f64,
    #[serde(default)]
    pub annual_expenditure: f64,
}

impl IncomeProfile {
    pub fn surplus(&self) -> f64 {
        self.annual_income - self.annual_expenditure
    }
}

/// Everything the core needs about one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonEstate {
    pub person_id: String,
    pub person: Person,
    pub profile: IhtProfile,

    #[serde(default)]
    pub estate: EstateSnapshot,

    #[serde(default)]
    pub gifts: Vec<Gift>,

    #[serde(default)]
    pub income: IncomeProfile,
}

impl PersonEstate {
    pub fn validate(&self, role: &str) -> Result<()> {
        self.estate.validate(role)?;
        self.profile.validate(&format!("{role}.profile"))?;
        validate_gifts(&self.gifts, role)?;
        ensure_money(&format!("{role}.income.annual_income"), self.income.annual_income)?;
        ensure_money(
            &format!("{role}.income.annual_expenditure"),
            self.income.annual_expenditure,
        )?;
        Ok(())
    }
}

/// One calculation subject: a person and optionally their spouse or civil partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub primary: PersonEstate,

    #[serde(default)]
    pub partner: Option<PersonEstate>,

    #[serde(default)]
    pub data_sharing_enabled: bool,
}

impl Household {
    pub fn single(primary: PersonEstate) -> Self {
        Self {
            primary,
            partner: None,
            data_sharing_enabled: false,
        }
    }

    pub fn couple(primary: PersonEstate, partner: PersonEstate) -> Self {
        Self {
            primary,
            partner: Some(partner),
            data_sharing_enabled: true,
        }
    }

    pub fn is_married(&self) -> bool {
        self.partner.is_some() || self.primary.profile.marital_status.has_spouse()
    }

    pub fn validate(&self) -> Result<()> {
        self.primary.validate("primary")?;
        if let Some(partner) = &self.partner {
            partner.validate("partner")?;
        }
        Ok(())
    }
}
