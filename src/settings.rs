use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use hawker_gravity::{CompositeWeights, ConfigError, KernelKind, LayerParams, ScoringConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::write_atomic;

/// Decay scale and importance multiplier for one accessibility layer, as written in the settings file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub lambda: f64,
    #[serde(default = "one")]
    pub beta: f64,
}

fn one() -> f64 { 1.0 }

fn default_layers() -> BTreeMap<String, LayerEntry> {
    BTreeMap::from([
        ("mrt".to_string(), LayerEntry { lambda: 900.0, beta: 1.0 }),
        ("bus".to_string(), LayerEntry { lambda: 500.0, beta: 1.0 }),
    ])
}

/// On-disk settings, using the reference key names. Unvalidated.
///
/// The flat `lambda_M` / `lambda_B` / `beta_MRT` / `beta_BUS` keys are accepted
/// and override the `mrt` and `bus` entries of `layers`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(non_snake_case)]
pub struct SettingsFile {
    pub kernel_kind: KernelKind,
    pub lambda_D: f64,
    pub lambda_S: f64,
    pub lambda_C: f64,
    pub w_D: f64,
    pub w_S: f64,
    pub w_A: f64,
    pub layers: BTreeMap<String, LayerEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_M: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_B: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_MRT: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_BUS: Option<f64>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            kernel_kind: KernelKind::Exponential,
            lambda_D: 700.0,
            lambda_S: 700.0,
            lambda_C: 700.0,
            w_D: 0.5,
            w_S: 0.3,
            w_A: 0.2,
            layers: default_layers(),
            lambda_M: None,
            lambda_B: None,
            beta_MRT: None,
            beta_BUS: None,
        }
    }
}

impl SettingsFile {
    /// Fold the flat per-layer keys into `layers`.
    fn layer_entries(&self) -> BTreeMap<String, LayerEntry> {
        let mut layers = self.layers.clone();
        for (name, lambda, beta) in [("mrt", self.lambda_M, self.beta_MRT), ("bus", self.lambda_B, self.beta_BUS)] {
            if lambda.is_none() && beta.is_none() { continue }
            let entry = layers.entry(name.to_string())
                .or_insert(LayerEntry { lambda: lambda.unwrap_or(f64::NAN), beta: 1.0 });
            if let Some(lambda) = lambda { entry.lambda = lambda }
            if let Some(beta) = beta { entry.beta = beta }
        }
        layers
    }
}

/// Validated settings: the scoring configuration plus per-layer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SettingsFile", into = "SettingsFile")]
pub struct Settings {
    pub scoring: ScoringConfig,
    pub layers: BTreeMap<String, LayerParams>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::try_from(SettingsFile::default()).expect("built-in default settings are valid")
    }
}

impl TryFrom<SettingsFile> for Settings {
    type Error = ConfigError;

    fn try_from(file: SettingsFile) -> Result<Self, Self::Error> {
        let weights = CompositeWeights::new(file.w_D, file.w_S, file.w_A)?;
        let scoring = ScoringConfig::new(file.kernel_kind, file.lambda_D, file.lambda_S, file.lambda_C, weights)?;
        let layers = file.layer_entries().into_iter()
            .map(|(name, entry)| LayerParams::named(&name, entry.lambda, entry.beta).map(|params| (name, params)))
            .collect::<Result<_, _>>()?;
        Ok(Self { scoring, layers })
    }
}

impl From<Settings> for SettingsFile {
    fn from(settings: Settings) -> Self {
        let weights = settings.scoring.weights();
        Self {
            kernel_kind: settings.scoring.kernel(),
            lambda_D: settings.scoring.lambda_demand(),
            lambda_S: settings.scoring.lambda_supply(),
            lambda_C: settings.scoring.lambda_competition(),
            w_D: weights.demand(),
            w_S: weights.supply(),
            w_A: weights.accessibility(),
            layers: settings.layers.into_iter()
                .map(|(name, params)| (name, LayerEntry { lambda: params.decay(), beta: params.multiplier() }))
                .collect(),
            lambda_M: None,
            lambda_B: None,
            beta_MRT: None,
            beta_BUS: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults; a malformed or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "settings file not found; using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize settings")
    }

    /// Write settings to `path` as pretty JSON, refusing to overwrite unless `force`.
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        write_atomic(path, self.to_json_pretty()?.as_bytes(), force)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        info!(path = %path.display(), "wrote settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.layers["mrt"].decay(), 900.0);
        assert_eq!(settings.layers["bus"].decay(), 500.0);
    }

    #[test]
    fn reads_reference_config() {
        let text = r#"{
            "kernel_kind": "exp", "lambda_D": 650.0, "lambda_S": 700.0, "lambda_C": 800.0,
            "lambda_M": 1000.0, "lambda_B": 400.0, "w_D": 0.6, "w_S": 0.2, "w_A": 0.2,
            "beta_MRT": 1.5, "beta_BUS": 0.5
        }"#;
        let settings = Settings::from_json(text).unwrap();
        assert_eq!(settings.scoring.kernel(), KernelKind::Exponential);
        assert_eq!(settings.scoring.lambda_demand(), 650.0);
        assert_eq!(settings.scoring.lambda_competition(), 800.0);
        assert_eq!(settings.layers["mrt"], LayerParams::new(1000.0, 1.5).unwrap());
        assert_eq!(settings.layers["bus"], LayerParams::new(400.0, 0.5).unwrap());
    }

    #[test]
    fn open_layer_list() {
        let text = r#"{"layers": {"lrt": {"lambda": 600.0}, "ferry": {"lambda": 1200.0, "beta": 0.25}}}"#;
        let settings = Settings::from_json(text).unwrap();
        assert_eq!(settings.layers.len(), 2);
        assert_eq!(settings.layers["lrt"].multiplier(), 1.0);
        assert_eq!(settings.layers["ferry"].multiplier(), 0.25);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Settings::from_json(r#"{"lambda_D": 0}"#).is_err());
        assert!(Settings::from_json(r#"{"w_S": -0.1}"#).is_err());
        assert!(Settings::from_json(r#"{"kernel_kind": "triangular"}"#).is_err());
        assert!(Settings::from_json(r#"{"layers": {"mrt": {"lambda": -5}}}"#).is_err());
        // A flat beta for a layer with no scale anywhere has nothing to attach to.
        assert!(Settings::from_json(r#"{"layers": {}, "beta_BUS": 2.0}"#).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let settings = Settings::from_json(r#"{"kernel_kind": "gaussian", "w_A": 0.0}"#).unwrap();
        let again = Settings::from_json(&settings.to_json_pretty().unwrap()).unwrap();
        assert_eq!(settings, again);
        assert!(settings.to_json_pretty().unwrap().contains("\"gaussian\""));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings::from_json(r#"{"lambda_S": 450.0}"#).unwrap();
        settings.save(&path, false).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert!(settings.save(&path, false).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
