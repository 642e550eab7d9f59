//! Content fingerprint of the values a calculation depends on
//!
//! ```text
//! assets       = sorted asset values, 2dp, comma-joined
//! liabilities  = sorted liability values, 2dp, comma-joined
//! fingerprint  = SHA-256(assets ++ liabilities)
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::estate::Household;

/// Hex SHA-256 digests identifying an estate's values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EstateFingerprint {
    pub fingerprint: String,
    pub assets_hash: String,
    pub liabilities_hash: String,
}

/// Sorted two-decimal rendering used as hash input
fn canonical_values(values: &[f64]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
        .iter()
        .map(|v| format!("{:.2}", crate::money::round_2dp(*v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn sha256_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

pub fn fingerprint_values(assets: &[f64], liabilities: &[f64]) -> EstateFingerprint {
    let assets = canonical_values(assets);
    let liabilities = canonical_values(liabilities);

    EstateFingerprint {
        fingerprint: sha256_hex(&[&assets, &liabilities]),
        assets_hash: sha256_hex(&[&assets]),
        liabilities_hash: sha256_hex(&[&liabilities]),
    }
}

/// Fingerprint over every asset and liability in the household
pub fn fingerprint_household(household: &Household) -> EstateFingerprint {
    let people = std::iter::once(&household.primary).chain(household.partner.as_ref());

    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    for person in people {
        assets.extend(person.estate.assets.iter().map(|a| a.value));
        liabilities.extend(person.estate.liabilities.iter().copied());
    }

    fingerprint_values(&assets, &liabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        let a = fingerprint_values(&[100.0, 250_000.5, 3.0], &[10.0, 20.0]);
        let b = fingerprint_values(&[3.0, 100.0, 250_000.5], &[20.0, 10.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_change_fingerprint() {
        let base = fingerprint_values(&[100.0, 200.0], &[50.0]);
        let asset_changed = fingerprint_values(&[100.0, 200.01], &[50.0]);
        let liability_changed = fingerprint_values(&[100.0, 200.0], &[51.0]);

        assert_ne!(base.fingerprint, asset_changed.fingerprint);
        assert_ne!(base.assets_hash, asset_changed.assets_hash);
        assert_eq!(base.liabilities_hash, asset_changed.liabilities_hash);

        assert_ne!(base.fingerprint, liability_changed.fingerprint);
        assert_eq!(base.assets_hash, liability_changed.assets_hash);
    }

    #[test]
    fn test_sub_penny_noise_ignored() {
        let a = fingerprint_values(&[100.001], &[]);
        let b = fingerprint_values(&[100.0], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_digest() {
        // SHA-256 of the empty string
        let empty = fingerprint_values(&[], &[]);
        assert_eq!(
            empty.fingerprint,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        let fp = fingerprint_values(&[2.0, 1.5], &[]);
        assert_eq!(fp.assets_hash, sha256_hex(&["1.50,2.00"]));
        assert_eq!(fp.fingerprint, fp.assets_hash);
    }
}
