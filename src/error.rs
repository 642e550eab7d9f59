//! Error taxonomy for IHT calculations and input loading
//!
//! Only deterministic validation failures are errors. Degraded-data fallbacks
//! (missing life-table rows, unaffordable income gifting, RNRB ineligibility)
//! are carried inside the results instead.

use thiserror::Error;

/// Errors surfaced by the calculation core and its loaders
#[derive(Debug, Error)]
pub enum IhtError {
    /// A monetary or percentage input was negative or non-finite
    #[error("invalid estate value for `{field}`: {value}")]
    InvalidEstateValue { field: String, value: f64 },

    /// A joint projection was requested without complete actuarial inputs
    #[error("missing actuarial input for joint projection: {}", missing.join(", "))]
    MissingActuarialInput { missing: Vec<String> },

    /// No tax-parameter row exists for the requested tax year
    #[error("no tax parameters configured for tax year {0}")]
    UnknownTaxYear(String),

    /// A loaded record could not be interpreted
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IhtError>;

/// Reject negative or non-finite money, naming the offending field
pub fn ensure_money(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(IhtError::InvalidEstateValue {
            field: field.to_string(),
            value,
        })
    }
}

/// Reject percentages outside [0, 100]
pub fn ensure_percent(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(IhtError::InvalidEstateValue {
            field: field.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_money() {
        assert_eq!(ensure_money("assets[0].value", 10.0).unwrap(), 10.0);
        assert_eq!(ensure_money("assets[0].value", 0.0).unwrap(), 0.0);

        let err = ensure_money("assets[0].value", -1.0).unwrap_err();
        match err {
            IhtError::InvalidEstateValue { field, value } => {
                assert_eq!(field, "assets[0].value");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(ensure_money("x", f64::NAN).is_err());
        assert!(ensure_money("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_missing_input_message_names_fields() {
        let err = IhtError::MissingActuarialInput {
            missing: vec!["partner.date_of_birth".into(), "partner.gender".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing actuarial input for joint projection: partner.date_of_birth, partner.gender"
        );
    }

    #[test]
    fn test_ensure_percent() {
        assert!(ensure_percent("charitable_giving_percent", 10.0).is_ok());
        assert!(ensure_percent("charitable_giving_percent", 100.5).is_err());
        assert!(ensure_percent("charitable_giving_percent", -0.1).is_err());
    }
}
