use ndarray::{Array1, ArrayView1, Zip};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    aggregate,
    config::{CompositeWeights, ScoringConfig},
    error::ScoreError,
    normalize::robust_z,
    unit::{unit_coords, AccessibilityLayer, DemandPoint, EvaluationUnit, PointSet, SupplyPoint},
};

/// Scores for one evaluation unit, with every intermediate channel kept for inspection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreResult {
    pub id: String,
    #[serde(rename = "Dem")]
    pub dem: f64,
    #[serde(rename = "Sup")]
    pub sup: f64,
    #[serde(rename = "Acc")]
    pub acc: f64,
    #[serde(rename = "Z_Dem")]
    pub z_dem: f64,
    #[serde(rename = "Z_Sup")]
    pub z_sup: f64,
    #[serde(rename = "Z_Acc")]
    pub z_acc: f64,
    #[serde(rename = "H_score")]
    pub h_score: f64,
}

/// `H(i) = w_D·Z_Dem(i) − w_S·Z_Sup(i) + w_A·Z_Acc(i)`.
pub fn composite(
    z_dem: ArrayView1<f64>,
    z_sup: ArrayView1<f64>,
    z_acc: ArrayView1<f64>,
    weights: CompositeWeights,
) -> Array1<f64> {
    Zip::from(z_dem).and(z_sup).and(z_acc).map_collect(|&d, &s, &a| {
        weights.demand() * d - weights.supply() * s + weights.accessibility() * a
    })
}

/// Score every evaluation unit. Output order and identity match `units`.
///
/// Zero units short-circuits to an empty result without touching the point sets.
/// Empty point sets and empty layer lists contribute zero to their channel.
pub fn score_units(
    units: &[EvaluationUnit],
    demand: &[DemandPoint],
    supply: &[SupplyPoint],
    layers: &[AccessibilityLayer],
    config: ScoringConfig,
) -> Result<Vec<ScoreResult>, ScoreError> {
    if units.is_empty() {
        debug!("no evaluation units; nothing to score");
        return Ok(Vec::new());
    }

    let unit_xy = unit_coords(units)?;
    let demand = PointSet::from_sites(demand)?;
    let supply = PointSet::from_sites(supply)?;
    let kernel = config.kernel();

    info!(
        units = units.len(),
        demand_points = demand.len(),
        supply_points = supply.len(),
        layers = layers.len(),
        %kernel,
        "scoring evaluation units"
    );

    let dem = aggregate::demand(&demand, unit_xy.view(), kernel, config.lambda_demand());
    let sup = aggregate::effective_supply(
        &demand, &supply, unit_xy.view(), kernel,
        config.lambda_competition(), config.lambda_supply(),
    );
    let acc = aggregate::accessibility(layers, unit_xy.view(), kernel)?;

    let z_dem = robust_z(dem.view());
    let z_sup = robust_z(sup.view());
    let z_acc = robust_z(acc.view());
    let h = composite(z_dem.view(), z_sup.view(), z_acc.view(), config.weights());

    Ok(units.iter().enumerate()
        .map(|(i, unit)| ScoreResult {
            id: unit.id.clone(),
            dem: dem[i],
            sup: sup[i],
            acc: acc[i],
            z_dem: z_dem[i],
            z_sup: z_sup[i],
            z_acc: z_acc[i],
            h_score: h[i],
        })
        .collect())
}
