//! Projection engine for single and joint-life (second-death) projections

mod state;
mod engine;
mod results;

pub use state::ProjectedEstate;
pub use engine::ProjectionEngine;
pub use results::{
    ActuarialProfile, DataQuality, DataQualityIssue, FirstDeathEvent, JointProjection,
    LiabilityAssessment, Projection, SingleProjection,
};
