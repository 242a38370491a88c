use crate::{error::ConfigError, kernel::KernelKind};

/// Default demand → unit decay scale, metres.
pub const DEFAULT_LAMBDA_DEMAND: f64 = 700.0;
/// Default supply → unit decay scale, metres.
pub const DEFAULT_LAMBDA_SUPPLY: f64 = 700.0;
/// Default demand → supply (competition) decay scale, metres.
pub const DEFAULT_LAMBDA_COMPETITION: f64 = 700.0;

fn check_decay(name: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 { Ok(value) }
    else { Err(ConfigError::DecayScale { name: name.to_string(), value }) }
}

fn check_weight(name: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 { Ok(value) }
    else { Err(ConfigError::Weight { name: name.to_string(), value }) }
}

/// Weights of the three standardized channels in the composite score.
/// Supply is applied with a negative sign by the scorer; all three are stored non-negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeWeights {
    demand: f64,
    supply: f64,
    accessibility: f64,
}

impl CompositeWeights {
    pub fn new(demand: f64, supply: f64, accessibility: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            demand: check_weight("w_D", demand)?,
            supply: check_weight("w_S", supply)?,
            accessibility: check_weight("w_A", accessibility)?,
        })
    }

    #[inline] pub fn demand(&self) -> f64 { self.demand }
    #[inline] pub fn supply(&self) -> f64 { self.supply }
    #[inline] pub fn accessibility(&self) -> f64 { self.accessibility }
}

impl Default for CompositeWeights {
    fn default() -> Self { Self { demand: 0.5, supply: 0.3, accessibility: 0.2 } }
}

/// Per-layer decay scale and importance multiplier for an accessibility layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerParams {
    decay: f64,
    multiplier: f64,
}

impl LayerParams {
    pub fn new(decay: f64, multiplier: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            decay: check_decay("lambda", decay)?,
            multiplier: check_weight("beta", multiplier)?,
        })
    }

    /// Same as [`LayerParams::new`], naming the layer in any error.
    pub fn named(layer: &str, decay: f64, multiplier: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            decay: check_decay(&format!("layers.{layer}.lambda"), decay)?,
            multiplier: check_weight(&format!("layers.{layer}.beta"), multiplier)?,
        })
    }

    #[inline] pub fn decay(&self) -> f64 { self.decay }
    #[inline] pub fn multiplier(&self) -> f64 { self.multiplier }
}

/// Validated scoring configuration. Construct once, pass by value into [`crate::score_units`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringConfig {
    kernel: KernelKind,
    lambda_demand: f64,
    lambda_supply: f64,
    lambda_competition: f64,
    weights: CompositeWeights,
}

impl ScoringConfig {
    pub fn new(
        kernel: KernelKind,
        lambda_demand: f64,
        lambda_supply: f64,
        lambda_competition: f64,
        weights: CompositeWeights,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            kernel,
            lambda_demand: check_decay("lambda_D", lambda_demand)?,
            lambda_supply: check_decay("lambda_S", lambda_supply)?,
            lambda_competition: check_decay("lambda_C", lambda_competition)?,
            weights,
        })
    }

    #[inline] pub fn kernel(&self) -> KernelKind { self.kernel }
    #[inline] pub fn lambda_demand(&self) -> f64 { self.lambda_demand }
    #[inline] pub fn lambda_supply(&self) -> f64 { self.lambda_supply }
    #[inline] pub fn lambda_competition(&self) -> f64 { self.lambda_competition }
    #[inline] pub fn weights(&self) -> CompositeWeights { self.weights }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            kernel: KernelKind::Exponential,
            lambda_demand: DEFAULT_LAMBDA_DEMAND,
            lambda_supply: DEFAULT_LAMBDA_SUPPLY,
            lambda_competition: DEFAULT_LAMBDA_COMPETITION,
            weights: CompositeWeights::default(),
        }
    }
}
