//! Whole-of-life level premium rates for life-cover sizing

use serde::{Deserialize, Serialize};

use super::life_table::interpolate_by_age;
use crate::estate::Gender;

/// Annual premium per £1,000 of cover for a single life
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumRateRow {
    pub age: u32,
    pub gender: Gender,
    pub annual_rate_per_thousand: f64,
}

/// Premium rate table, interpolated by age like the life table
#[derive(Debug, Clone)]
pub struct PremiumTable {
    rows: Vec<PremiumRateRow>,
}

impl PremiumTable {
    pub fn new(rows: Vec<PremiumRateRow>) -> Self {
        Self { rows }
    }

    /// Indicative non-smoker whole-of-life rates at 5-year ages
    pub fn indicative_uk() -> Self {
        let points: [(u32, f64, f64); 12] = [
            // (age, male, female)
            (30, 6.0, 5.0),
            (35, 7.2, 6.0),
            (40, 8.8, 7.4),
            (45, 10.9, 9.2),
            (50, 13.6, 11.5),
            (55, 17.2, 14.6),
            (60, 21.9, 18.6),
            (65, 28.3, 24.1),
            (70, 37.0, 31.6),
            (75, 49.0, 42.0),
            (80, 65.5, 56.5),
            (85, 88.0, 76.0),
        ];

        let mut rows = Vec::with_capacity(points.len() * 2);
        for (age, male, female) in points {
            rows.push(PremiumRateRow {
                age,
                gender: Gender::Male,
                annual_rate_per_thousand: male,
            });
            rows.push(PremiumRateRow {
                age,
                gender: Gender::Female,
                annual_rate_per_thousand: female,
            });
        }
        Self::new(rows)
    }

    pub fn rows(&self) -> &[PremiumRateRow] {
        &self.rows
    }

    /// Annual rate per £1,000 of cover; ages outside the table take the nearest edge
    pub fn rate_per_thousand(&self, age: u32, gender: Gender) -> Option<f64> {
        let points: Vec<(u32, f64)> = self
            .rows
            .iter()
            .filter(|r| r.gender == gender)
            .map(|r| (r.age, r.annual_rate_per_thousand))
            .collect();
        interpolate_by_age(&points, age).map(|(rate, _)| rate)
    }

    /// Annual single-life premium for `cover`
    pub fn single_life_premium(&self, age: u32, gender: Gender, cover: f64) -> Option<f64> {
        self.rate_per_thousand(age, gender)
            .map(|rate| rate * cover / 1_000.0)
    }
}

impl Default for PremiumTable {
    fn default() -> Self {
        Self::indicative_uk()
    }
}
