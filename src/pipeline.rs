use std::{collections::HashMap, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use geo::{Geometry, Point};
use hawker_gravity::{
    score_units, AccessibilityLayer, DemandPoint, EvaluationUnit, LayerPoint, ScoreResult, SupplyPoint,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    geom::{bounds, Projection, Reprojector},
    io::{
        geojson::{read_geojson, Feature, FeatureCollection},
        population::{join_key, read_population_csv},
    },
    settings::Settings,
};

/// Where demand points come from.
#[derive(Clone, Debug)]
pub enum DemandSource {
    /// A point (or polygon) layer carrying a population property.
    Points(PathBuf),
    /// A census table joined to the evaluation units by name; units become the demand points.
    Population(PathBuf),
}

/// Property and column names used to read inputs.
#[derive(Clone, Debug)]
pub struct FieldNames {
    pub name: String,
    pub population: String,
    pub capacity: String,
    pub weight: String,
    pub table_name: String,
    pub table_total: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "SUBZONE_N".into(),
            population: "population".into(),
            capacity: "capacity".into(),
            weight: "weight".into(),
            table_name: "Number".into(),
            table_total: "Total_Total".into(),
        }
    }
}

/// Everything needed for one scoring run.
#[derive(Clone, Debug)]
pub struct ScoreJob {
    pub units: PathBuf,
    pub demand: DemandSource,
    pub supply: PathBuf,
    pub layers: Vec<(String, PathBuf)>,
    pub settings: Settings,
    pub projection: Projection,
    pub fields: FieldNames,
}

/// Weighted point layer read from disk, still in input coordinates.
struct RawPoints {
    label: String,
    points: Vec<(Point<f64>, Option<f64>)>,
}

fn read_points(label: &str, path: &Path, weight_field: &str) -> Result<RawPoints> {
    let collection = read_geojson(path)?;
    let mut skipped = 0usize;
    let points = collection.features.iter()
        .filter_map(|feature| match feature.location() {
            Some(location) => Some((location, feature.number(weight_field))),
            None => { skipped += 1; None }
        })
        .collect::<Vec<_>>();
    if skipped > 0 {
        warn!(layer = label, skipped, "features without a usable point location were skipped");
    }
    if !points.is_empty() && points.iter().all(|(_, w)| w.is_none()) {
        info!(layer = label, field = weight_field, "no weights found; using the default weight for every point");
    }
    Ok(RawPoints { label: label.to_string(), points })
}

/// Identifier for a unit: the name property, then `Name`, then the feature index.
fn unit_id(feature: &Feature, name_field: &str, index: usize) -> String {
    feature.text(name_field)
        .or_else(|| feature.text("Name"))
        .unwrap_or_else(|| index.to_string())
}

/// Run one scoring job, returning the scored units as an augmented FeatureCollection.
///
/// Features without geometry are dropped (with a warning); every other unit is
/// returned once, in input order, with its original properties and geometry plus
/// `Dem, Sup, Acc, Z_Dem, Z_Sup, Z_Acc, H_score`.
pub fn run_job(job: &ScoreJob) -> Result<FeatureCollection> {
    let mut unit_collection = read_geojson(&job.units)?;
    let before = unit_collection.features.len();
    unit_collection.features.retain(|feature| feature.geometry.is_some());
    if unit_collection.features.len() < before {
        warn!(dropped = before - unit_collection.features.len(), "evaluation units without geometry were dropped");
    }

    // Layers named on the command line must have parameters; configured layers without data add nothing.
    for (name, _) in &job.layers {
        if !job.settings.layers.contains_key(name) {
            bail!("no decay scale configured for accessibility layer `{name}`; add it to `layers` in the settings file");
        }
    }

    let supply = read_points("supply", &job.supply, &job.fields.capacity)?;
    let demand = match &job.demand {
        DemandSource::Points(path) => Some(read_points("demand", path, &job.fields.population)?),
        DemandSource::Population(_) => None,
    };
    let layers = job.layers.iter()
        .map(|(name, path)| read_points(name, path, &job.fields.weight))
        .collect::<Result<Vec<_>>>()?;

    // Pick the transform from the extent of everything we read.
    let extent = {
        let point_geometries: Vec<Geometry<f64>> = std::iter::once(&supply)
            .chain(demand.iter())
            .chain(layers.iter())
            .flat_map(|raw| raw.points.iter().map(|(p, _)| Geometry::Point(*p)))
            .collect();
        bounds(unit_collection.features.iter().filter_map(|f| f.geometry.as_ref()).chain(point_geometries.iter()))
    };
    let reprojector = Reprojector::new(job.projection, extent)?;
    if let Some(reprojector) = &reprojector {
        info!(target_crs = reprojector.target(), "reprojecting inputs");
    }
    let project_point = |p: Point<f64>| -> Result<Point<f64>> {
        match &reprojector {
            Some(r) => Ok(Point::from(r.project_coord(p.0)?)),
            None => Ok(p),
        }
    };

    let units = unit_collection.features.iter().enumerate()
        .map(|(index, feature)| {
            let id = unit_id(feature, &job.fields.name, index);
            let geometry = feature.geometry.as_ref().context("unit without geometry")?;
            let geometry = match &reprojector {
                Some(r) => r.project(geometry).with_context(|| format!("failed to reproject unit `{id}`"))?,
                None => geometry.clone(),
            };
            Ok(EvaluationUnit::new(id, geometry))
        })
        .collect::<Result<Vec<_>>>()?;

    let demand_points = match (&job.demand, demand) {
        (_, Some(raw)) => raw.points.iter()
            .map(|&(p, population)| Ok(DemandPoint { location: project_point(p)?, population }))
            .collect::<Result<Vec<_>>>()?,
        (DemandSource::Population(path), None) => {
            demand_from_population(&units, &unit_collection, path, &job.fields)?
        }
        (DemandSource::Points(_), None) => Vec::new(),
    };

    let supply_points = supply.points.iter()
        .map(|&(p, capacity)| Ok(SupplyPoint { location: project_point(p)?, capacity }))
        .collect::<Result<Vec<_>>>()?;

    let accessibility_layers = layers.iter()
        .map(|raw| {
            let points = raw.points.iter()
                .map(|&(p, weight)| Ok(LayerPoint { location: project_point(p)?, weight }))
                .collect::<Result<Vec<_>>>()?;
            Ok(AccessibilityLayer::new(raw.label.clone(), points, job.settings.layers[&raw.label]))
        })
        .collect::<Result<Vec<_>>>()?;

    for name in job.settings.layers.keys().filter(|name| !job.layers.iter().any(|(n, _)| n == *name)) {
        info!(layer = %name, "configured accessibility layer has no data; it contributes nothing");
    }

    let results = score_units(&units, &demand_points, &supply_points, &accessibility_layers, job.settings.scoring)
        .context("scoring failed")?;

    Ok(augment(unit_collection, &results))
}

/// Demand points at the units' representative points, weighted by the joined census population.
fn demand_from_population(
    units: &[EvaluationUnit],
    collection: &FeatureCollection,
    table: &Path,
    fields: &FieldNames,
) -> Result<Vec<DemandPoint>> {
    let rows = read_population_csv(table, &fields.table_name, &fields.table_total)?;
    let population: HashMap<String, f64> = rows.into_iter()
        .map(|row| (join_key(&row.subzone), row.population))
        .collect();

    let mut unmatched = Vec::new();
    let points = units.iter().zip(collection.features.iter())
        .map(|(unit, feature)| {
            let key = feature.text(&fields.name).map(|name| join_key(&name));
            let value = key.as_ref().and_then(|k| population.get(k)).copied();
            if value.is_none() { unmatched.push(unit.id.clone()) }
            Ok(DemandPoint { location: unit.representative_point()?, population: Some(value.unwrap_or(0.0)) })
        })
        .collect::<Result<Vec<_>>>()?;

    if !unmatched.is_empty() {
        warn!(count = unmatched.len(), first = %unmatched[0], "units without a population row are given zero population");
    }
    Ok(points)
}

/// Attach score fields to each unit's properties, in order.
pub fn augment(mut collection: FeatureCollection, results: &[ScoreResult]) -> FeatureCollection {
    for (feature, result) in collection.features.iter_mut().zip(results) {
        for (key, value) in [
            ("Dem", result.dem),
            ("Sup", result.sup),
            ("Acc", result.acc),
            ("Z_Dem", result.z_dem),
            ("Z_Sup", result.z_sup),
            ("Z_Acc", result.z_acc),
            ("H_score", result.h_score),
        ] {
            feature.properties.insert(key.to_string(), finite_or_null(value));
        }
    }
    collection
}

#[inline]
fn finite_or_null(value: f64) -> Value {
    if value.is_finite() { json!(value) } else { Value::Null }
}
