//! Gravity-model opportunity scoring.
//!
//! Turns evaluation units, weighted demand and supply points and any number of
//! accessibility layers into per-unit demand, competition-adjusted supply and
//! accessibility, standardizes each channel robustly and combines them into one
//! composite score. All inputs must share one planar projection in metres.
pub mod aggregate;
pub mod config;
pub mod distance;
pub mod error;
pub mod kernel;
pub mod normalize;
pub mod score;
pub mod unit;

pub use config::{CompositeWeights, LayerParams, ScoringConfig};
pub use error::{ConfigError, ScoreError};
pub use kernel::KernelKind;
pub use normalize::{robust_z, RobustScale};
pub use score::{composite, score_units, ScoreResult};
pub use unit::{AccessibilityLayer, DemandPoint, EvaluationUnit, LayerPoint, SupplyPoint, WeightedSite};
