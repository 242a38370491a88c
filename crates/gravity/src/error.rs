use thiserror::Error;

/// A configuration value was rejected before any computation started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A decay scale was zero, negative, or not finite.
    #[error("decay scale `{name}` must be a positive finite length in metres, got {value}")]
    DecayScale { name: String, value: f64 },

    /// A composite weight or layer multiplier was negative or not finite.
    #[error("weight `{name}` must be a non-negative finite number, got {value}")]
    Weight { name: String, value: f64 },

    /// The kernel family name did not match any known family.
    #[error("unknown kernel family `{0}` (expected `exponential` or `gaussian`)")]
    UnknownKernel(String),
}

/// Errors surfaced by the scoring engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A point weight (population, capacity, layer weight) was negative or not finite.
    #[error("{set} point {index} has invalid weight {value}; weights must be non-negative and finite")]
    InvalidWeight { set: String, index: usize, value: f64 },

    /// A geometry had no representative point (empty polygon, empty collection).
    #[error("evaluation unit `{0}` has an empty geometry")]
    EmptyGeometry(String),

    /// A geometry was neither a point nor areal.
    #[error("evaluation unit `{id}` has unsupported geometry type {kind}")]
    UnsupportedGeometry { id: String, kind: &'static str },
}
