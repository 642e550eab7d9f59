//! Presentation rounding for monetary figures
//!
//! Arithmetic inside the engine stays unrounded. Money is rounded to pence
//! only when a result is serialized, via `#[serde(with = "crate::money")]`.

use serde::{Deserialize, Deserializer, Serializer};

/// Round to 2 decimal places, half away from zero
pub fn round_2dp(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid emitting "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round_2dp(*value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Figure {
        #[serde(with = "crate::money")]
        amount: f64,
        rate: f64,
    }

    #[test]
    fn test_round_2dp() {
        assert_eq!(round_2dp(1.005_000_1), 1.01);
        assert_eq!(round_2dp(4_063_271.215_6), 4_063_271.22);
        assert_eq!(round_2dp(-0.001), 0.0);
    }

    #[test]
    fn test_only_money_fields_are_rounded() {
        let fig = Figure {
            amount: 1234.5678,
            rate: 0.358_712,
        };
        let json = serde_json::to_string(&fig).unwrap();
        assert_eq!(json, r#"{"amount":1234.57,"rate":0.358712}"#);

        let back: Figure = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, 1234.57);
    }
}
