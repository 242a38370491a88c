#![doc = "Hawker-centre siting opportunity: ingestion, projection and export around the gravity scoring core"]
pub mod cli;
pub mod commands;
mod common;
pub mod geom;
pub mod io;
pub mod pipeline;
pub mod settings;
pub mod summary;
pub mod telemetry;

#[doc(inline)]
pub use hawker_gravity::{score_units, ScoreResult, ScoringConfig};

#[doc(inline)]
pub use pipeline::{run_job, DemandSource, FieldNames, ScoreJob};

#[doc(inline)]
pub use settings::Settings;
