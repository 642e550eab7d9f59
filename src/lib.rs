//! IHT Planner - UK inheritance tax liability and projection engine
//!
//! This library provides:
//! - Nil-rate band and residence nil-rate band allowance calculations
//! - PET taper relief and CLT cumulation over lifetime gifts
//! - Single-life and joint-life (second-death) projections to expected death
//! - A waterfall of mitigation strategies and life-cover sizing
//! - Content-hash keyed caching of derived results

pub mod error;
pub mod money;
pub mod estate;
pub mod assumptions;
pub mod liability;
pub mod projection;
pub mod strategy;
pub mod cache;
pub mod calculator;

// Re-export commonly used types
pub use error::{IhtError, Result};
pub use estate::{Asset, AssetType, Gift, GiftKind, Household, PersonEstate};
pub use assumptions::{Assumptions, LifeTable, TaxParameters};
pub use liability::{calculate_allowance, AllowanceBreakdown, AllowanceInput};
pub use projection::{Projection, ProjectionEngine};
pub use strategy::{StrategyOptimizer, StrategyPlan};
pub use cache::{CalculationCache, InMemoryCache};
pub use calculator::{CacheStatus, IhtCalculation, IhtCalculator};
