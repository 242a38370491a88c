use std::{fmt, str::FromStr};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Distance-decay family used to turn a distance into an influence weight in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    /// `exp(-d / λ)`; weight ≈ 0.37 at `d = λ`.
    #[default]
    #[serde(alias = "exp")]
    Exponential,
    /// `exp(-(d / λ)² / 2)`; flat near zero, steeper tail.
    #[serde(alias = "gauss")]
    Gaussian,
}

impl KernelKind {
    /// Influence weight at `distance` for decay scale `lambda`.
    /// Negative distances are clipped to zero, so the result is always in [0, 1].
    #[inline]
    pub fn weight(self, distance: f64, lambda: f64) -> f64 {
        let t = (distance / lambda).max(0.0);
        match self {
            KernelKind::Exponential => (-t).exp(),
            KernelKind::Gaussian => (-(t * t) / 2.0).exp(),
        }
    }

    /// Apply the kernel elementwise to a distance matrix, in place.
    /// Each element is independent, so the map is sharded across threads.
    pub fn apply(self, mut distances: Array2<f64>, lambda: f64) -> Array2<f64> {
        distances.par_mapv_inplace(|d| self.weight(d, lambda));
        distances
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Exponential => write!(f, "exponential"),
            KernelKind::Gaussian => write!(f, "gaussian"),
        }
    }
}

impl FromStr for KernelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exp" | "exponential" => Ok(KernelKind::Exponential),
            "gauss" | "gaussian" => Ok(KernelKind::Gaussian),
            _ => Err(ConfigError::UnknownKernel(s.to_string())),
        }
    }
}
