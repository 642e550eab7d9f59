//! Estate input records and loaders

mod data;
mod person;
pub mod loader;
pub mod residence;

pub use data::{
    validate_gifts, Asset, AssetType, EstateSnapshot, Gift, GiftKind, Ownership, Trust, TrustType,
};
pub use person::{
    Gender, Household, IhtProfile, IncomeProfile, MaritalStatus, Person, PersonEstate,
};
pub use residence::{identify_residence, Residence, ResidenceSource};
pub use loader::{load_assets, load_gifts, load_household, load_households};
