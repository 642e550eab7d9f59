//! Unused nil-rate bands carried from the first spouse to die to the survivor

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::gifts::pets_within_window;
use crate::assumptions::TaxParameters;
use crate::error::{ensure_money, Result};
use crate::estate::{PersonEstate, Residence};

/// Who takes the deceased's residence at the first death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidenceBequest {
    /// Passes to the surviving spouse with the rest of the estate
    Spouse,
    /// Left directly to descendants, using the deceased's own RNRB
    Descendants,
}

/// Bands transferable from the deceased spouse at the first death
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpousalTransfer {
    pub first_death_date: NaiveDate,

    /// NRB absorbed by the deceased's PETs in the seven years before death
    #[serde(with = "crate::money")]
    pub own_nrb_used: f64,

    #[serde(with = "crate::money")]
    pub transferable_nrb: f64,

    /// The deceased's residence went to descendants, using their RNRB
    pub rnrb_used_on_first_death: bool,

    #[serde(with = "crate::money")]
    pub transferable_rnrb: f64,
}

impl SpousalTransfer {
    /// Nothing to carry over
    pub fn none(first_death_date: NaiveDate) -> Self {
        Self {
            first_death_date,
            own_nrb_used: 0.0,
            transferable_nrb: 0.0,
            rnrb_used_on_first_death: false,
            transferable_rnrb: 0.0,
        }
    }
}

/// Work out what the deceased spouse leaves unused
///
/// `net_estate_at_death` and `residence_at_death` are the deceased's own
/// figures grown to the first-death date. The RNRB is only used up when a
/// residence actually goes to descendants.
pub fn track_spousal_transfer(
    deceased: &PersonEstate,
    first_death_date: NaiveDate,
    net_estate_at_death: f64,
    residence_at_death: Option<&Residence>,
    bequest: ResidenceBequest,
    params: &TaxParameters,
) -> Result<SpousalTransfer> {
    ensure_money("deceased.net_estate_at_death", net_estate_at_death)?;

    let pets = pets_within_window(&deceased.gifts, first_death_date, params);
    let own_nrb_used = params.nrb.min(pets);
    let transferable_nrb = params.nrb - own_nrb_used;

    let rnrb_used_on_first_death = bequest == ResidenceBequest::Descendants
        && residence_at_death.is_some_and(|r| r.value > 0.0);
    let transferable_rnrb = if rnrb_used_on_first_death {
        0.0
    } else {
        let excess = (net_estate_at_death - params.rnrb_taper_threshold).max(0.0);
        (params.rnrb - excess * params.rnrb_taper_rate).max(0.0)
    };

    log::debug!(
        "spousal transfer from {}: nrb={:.2} rnrb={:.2}",
        deceased.person_id,
        transferable_nrb,
        transferable_rnrb
    );

    Ok(SpousalTransfer {
        first_death_date,
        own_nrb_used,
        transferable_nrb,
        rnrb_used_on_first_death,
        transferable_rnrb,
    })
}
