//! Content-hash keyed cache of derived calculation results

mod fingerprint;
mod store;

pub use fingerprint::{fingerprint_household, fingerprint_values, EstateFingerprint};
pub use store::{CachedCalculation, CalculationCache, InMemoryCache};
