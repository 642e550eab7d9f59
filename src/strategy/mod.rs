//! Mitigation planning: the gifting waterfall and life cover sizing

mod types;
mod optimizer;
pub mod liquidity;
pub mod life_cover;

pub use types::{
    RiskLevel, ScheduledGift, SkipReason, SkippedStrategy, StrategyAllocation, StrategyKind,
    StrategyPlan,
};
pub use optimizer::{PlanningInput, StrategyOptimizer};
pub use liquidity::{AssetClassLiquidity, Liquidity, LiquidityClassifier};
pub use life_cover::{
    quote_life_cover, Confidence, CoverRecommendation, InsuredLife, LifeCoverQuote, PolicyBasis,
};
