//! Liability calculators: allowances, lifetime gifts and spousal transfers

pub mod allowance;
pub mod gifts;
pub mod spousal;

pub use allowance::{
    calculate_allowance, AllowanceBreakdown, AllowanceInput, RnrbIneligibility, RnrbStatus,
};
pub use gifts::{
    add_years, clt_ledger, pet_ledger, pets_within_window, years_between, CltEntry, CltLedger,
    LedgerNote, PetEntry, PetLedger,
};
pub use spousal::{track_spousal_transfer, ResidenceBequest, SpousalTransfer};
