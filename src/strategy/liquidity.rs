//! Asset liquidity for deciding what can be given away

use serde::{Deserialize, Serialize};

use crate::estate::{Asset, AssetType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liquidity {
    Liquid,
    SemiLiquid,
    Illiquid,
}

/// Decides how readily an asset could be gifted
pub trait LiquidityClassifier: Send + Sync {
    fn classify(&self, asset: &Asset) -> Liquidity;

    /// Chargeable value of the liquid assets
    fn giftable_value(&self, assets: &[Asset]) -> f64 {
        assets
            .iter()
            .filter(|a| !a.iht_exempt)
            .filter(|a| self.classify(a) == Liquidity::Liquid)
            .map(|a| a.value)
            .sum()
    }
}

/// Liquidity by asset class alone
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetClassLiquidity;

impl LiquidityClassifier for AssetClassLiquidity {
    fn classify(&self, asset: &Asset) -> Liquidity {
        match asset.asset_type {
            AssetType::Cash | AssetType::Investment => Liquidity::Liquid,
            AssetType::Pension => Liquidity::SemiLiquid,
            AssetType::Property | AssetType::Business | AssetType::Chattel | AssetType::Other => {
                Liquidity::Illiquid
            }
        }
    }
}
