//! Main residence identification for the residence nil-rate band
//!
//! Precedence: an upstream `is_main_residence` flag, then the profile's home
//! value, then a name-based guess over property assets. The name guess is
//! never authoritative and marks the result as degraded.

use serde::{Deserialize, Serialize};

use super::data::{AssetType, EstateSnapshot};
use super::person::IhtProfile;

const RESIDENCE_KEYWORDS: [&str; 5] = ["home", "residence", "house", "main", "primary"];

/// Where the residence value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidenceSource {
    FlaggedAsset,
    Profile,
    NameHeuristic,
}

/// A qualifying residence and its value at the valuation date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Residence {
    #[serde(with = "crate::money")]
    pub value: f64,
    pub source: ResidenceSource,
}

impl Residence {
    pub fn is_authoritative(&self) -> bool {
        self.source != ResidenceSource::NameHeuristic
    }

    /// Same residence with its value scaled by a growth factor
    pub fn grown(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            ..self
        }
    }
}

/// Find the qualifying residence, if any
pub fn identify_residence(profile: &IhtProfile, estate: &EstateSnapshot) -> Option<Residence> {
    if !profile.own_home {
        return None;
    }

    let flagged: f64 = estate
        .assets
        .iter()
        .filter(|a| a.is_main_residence)
        .map(|a| a.value)
        .sum();
    if flagged > 0.0 {
        return Some(Residence {
            value: flagged,
            source: ResidenceSource::FlaggedAsset,
        });
    }

    if profile.home_value > 0.0 {
        return Some(Residence {
            value: profile.home_value,
            source: ResidenceSource::Profile,
        });
    }

    estate
        .assets
        .iter()
        .filter(|a| a.asset_type == AssetType::Property && a.value > 0.0)
        .find(|a| {
            let name = a.name.to_ascii_lowercase();
            RESIDENCE_KEYWORDS.iter().any(|k| name.contains(k))
        })
        .map(|a| Residence {
            value: a.value,
            source: ResidenceSource::NameHeuristic,
        })
}
