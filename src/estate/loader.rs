//! Load estate inputs from CSV exports and household JSON documents

use super::{Asset, AssetType, Gift, GiftKind, Household, Ownership};
use crate::error::{IhtError, Result};
use chrono::NaiveDate;
use csv::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw CSV row matching the aggregator's asset export
#[derive(Debug, serde::Deserialize)]
struct AssetCsvRow {
    #[serde(rename = "type")]
    asset_type: String,
    name: String,
    value: f64,
    ownership: String,
    #[serde(default)]
    iht_exempt: Option<String>,
    #[serde(default)]
    is_main_residence: Option<String>,
}

impl AssetCsvRow {
    fn to_asset(self) -> Result<Asset> {
        let asset_type = AssetType::parse(&self.asset_type).ok_or_else(|| {
            IhtError::InvalidRecord(format!("unknown asset type: {}", self.asset_type))
        })?;
        let ownership = Ownership::parse(&self.ownership).ok_or_else(|| {
            IhtError::InvalidRecord(format!("unknown ownership: {}", self.ownership))
        })?;

        Ok(Asset {
            asset_type,
            name: self.name,
            value: self.value,
            ownership,
            iht_exempt: parse_flag(self.iht_exempt.as_deref())?,
            is_main_residence: parse_flag(self.is_main_residence.as_deref())?,
        })
    }
}

/// Raw CSV row for the gift history
#[derive(Debug, serde::Deserialize)]
struct GiftCsvRow {
    date: String,
    recipient: String,
    value: f64,
    kind: String,
}

impl GiftCsvRow {
    fn to_gift(self) -> Result<Gift> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| IhtError::InvalidRecord(format!("bad gift date {}: {}", self.date, e)))?;
        let kind = GiftKind::parse(&self.kind)
            .ok_or_else(|| IhtError::InvalidRecord(format!("unknown gift kind: {}", self.kind)))?;

        Ok(Gift {
            date,
            recipient: self.recipient,
            value: self.value,
            kind,
        })
    }
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "false" | "no" | "n" | "0" => Ok(false),
            "true" | "yes" | "y" | "1" => Ok(true),
            other => Err(IhtError::InvalidRecord(format!("bad boolean flag: {other}"))),
        },
    }
}

/// Load assets from a CSV file
pub fn load_assets<P: AsRef<Path>>(path: P) -> Result<Vec<Asset>> {
    let file = File::open(path)?;
    load_assets_from_reader(file)
}

/// Load assets from any reader (e.g., string buffer, network stream)
pub fn load_assets_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Asset>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut assets = Vec::new();

    for result in csv_reader.deserialize() {
        let row: AssetCsvRow = result?;
        assets.push(row.to_asset()?);
    }

    Ok(assets)
}

/// Load the gift history from a CSV file, preserving file order
pub fn load_gifts<P: AsRef<Path>>(path: P) -> Result<Vec<Gift>> {
    let file = File::open(path)?;
    load_gifts_from_reader(file)
}

pub fn load_gifts_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Gift>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut gifts = Vec::new();

    for result in csv_reader.deserialize() {
        let row: GiftCsvRow = result?;
        gifts.push(row.to_gift()?);
    }

    Ok(gifts)
}

/// Load a single household document
pub fn load_household<P: AsRef<Path>>(path: P) -> Result<Household> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load a JSON array of households
pub fn load_households<P: AsRef<Path>>(path: P) -> Result<Vec<Household>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
