use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Centroid, Coord, Geometry, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::common::write_atomic;

/// One GeoJSON feature. The raw geometry is kept so output can echo the input CRS untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub raw_geometry: Value,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Numeric property, accepting JSON numbers and strings like `"1,234"`.
    /// `null`, `""` and `"-"` are treated as missing.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.properties.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() || cleaned == "-" { None } else { cleaned.parse().ok() }
            }
            _ => None,
        }
    }

    /// String property; numbers are formatted.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A single representative location for use as a weighted point:
    /// the point itself, the first point of a MultiPoint, or the centroid of a polygon.
    pub fn location(&self) -> Option<Point<f64>> {
        match self.geometry.as_ref()? {
            Geometry::Point(p) => Some(*p),
            Geometry::MultiPoint(mp) => mp.0.first().copied(),
            other @ (Geometry::Polygon(_) | Geometry::MultiPolygon(_)) => other.centroid(),
            _ => None,
        }
    }
}

/// A GeoJSON FeatureCollection. Top-level members other than `features` (`name`, `crs`, ...) are preserved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub members: Map<String, Value>,
}

/// Read a FeatureCollection from a `.geojson` file.
pub fn read_geojson(path: &Path) -> Result<FeatureCollection> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    let collection = read_from_geojson_bytes(&bytes)
        .with_context(|| format!("Failed to parse GeoJSON file: {}", path.display()))?;
    info!(path = %path.display(), features = collection.features.len(), "read GeoJSON");
    Ok(collection)
}

/// Parse a FeatureCollection from GeoJSON bytes.
pub fn read_from_geojson_bytes(bytes: &[u8]) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let Value::Object(mut members) = value else { bail!("GeoJSON root must be an object") };

    if members.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        bail!("GeoJSON root must be a FeatureCollection");
    }
    let features = match members.remove("features") {
        Some(Value::Array(features)) => features,
        Some(_) => bail!("`features` must be an array"),
        None => Vec::new(),
    };

    let features = features.into_iter().enumerate()
        .map(|(index, feature)| parse_feature(feature).with_context(|| format!("Invalid feature at index {index}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection { features, members })
}

fn parse_feature(feature: Value) -> Result<Feature> {
    let Value::Object(mut feature) = feature else { bail!("feature must be an object") };
    let raw_geometry = feature.remove("geometry").unwrap_or(Value::Null);
    let properties = match feature.remove("properties") {
        Some(Value::Object(properties)) => properties,
        _ => Map::new(),
    };
    Ok(Feature { geometry: parse_geometry(&raw_geometry)?, raw_geometry, properties })
}

/// Parse a GeoJSON geometry object. `null` is a feature without geometry, not an error.
pub fn parse_geometry(value: &Value) -> Result<Option<Geometry<f64>>> {
    if value.is_null() { return Ok(None) }

    let kind = value["type"].as_str().ok_or_else(|| anyhow!("geometry is missing `type`"))?;
    let coords = &value["coordinates"];
    let geometry = match kind {
        "Point" => Geometry::Point(Point::from(parse_coord(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            as_array(coords)?.iter().map(|c| parse_coord(c).map(Point::from)).collect::<Result<_>>()?,
        )),
        "Polygon" => Geometry::Polygon(parse_polygon_coords(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
            as_array(coords)?.iter().map(parse_polygon_coords).collect::<Result<_>>()?,
        )),
        other => {
            warn!(kind = other, "unsupported geometry type; feature treated as having no geometry");
            return Ok(None);
        }
    };
    Ok(Some(geometry))
}

#[inline]
fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("coordinates must be an array"))
}

fn parse_coord(value: &Value) -> Result<Coord<f64>> {
    let pair = as_array(value)?;
    if pair.len() < 2 { bail!("coordinate must have at least two components") }
    let x = pair[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
    let y = pair[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}

/// Polygon coordinates: `[exterior, hole, hole, ...]`, each ring `[[x, y], ...]`.
fn parse_polygon_coords(value: &Value) -> Result<Polygon<f64>> {
    let rings = as_array(value)?.iter().map(parse_ring_coords).collect::<Result<Vec<_>>>()?;
    let mut rings = rings.into_iter();
    let exterior = rings.next().ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn parse_ring_coords(value: &Value) -> Result<LineString<f64>> {
    let mut points = as_array(value)?.iter().map(parse_coord).collect::<Result<Vec<_>>>()?;
    // Ensure ring is closed (first point == last point)
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}

/// Serialize a FeatureCollection to GeoJSON bytes.
pub fn write_to_geojson_bytes(collection: &FeatureCollection) -> Result<Vec<u8>> {
    let features: Vec<Value> = collection.features.iter()
        .map(|feature| json!({
            "type": "Feature",
            "properties": feature.properties,
            "geometry": feature.raw_geometry,
        }))
        .collect();

    let mut root = collection.members.clone();
    root.insert("type".into(), json!("FeatureCollection"));
    root.insert("features".into(), Value::Array(features));

    serde_json::to_vec(&Value::Object(root)).context("Failed to serialize GeoJSON to bytes")
}

/// Write a FeatureCollection to `path`, refusing to overwrite unless `force`.
pub fn write_geojson(path: &Path, collection: &FeatureCollection, force: bool) -> Result<()> {
    let bytes = write_to_geojson_bytes(collection)?;
    write_atomic(path, &bytes, force)
        .with_context(|| format!("Failed to write GeoJSON file: {}", path.display()))?;
    info!(path = %path.display(), features = collection.features.len(), "wrote GeoJSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "name": "subzones",
        "features": [
            {"type": "Feature", "properties": {"SUBZONE_N": "ALPHA", "pop": "1,234"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2]]]}},
            {"type": "Feature", "properties": {"Name": "kml_2", "pop": 50},
             "geometry": {"type": "Point", "coordinates": [103.8, 1.3, 0.0]}},
            {"type": "Feature", "properties": {"pop": "-"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn reads_features_and_members() {
        let collection = read_from_geojson_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(collection.features.len(), 3);
        assert_eq!(collection.members["name"], json!("subzones"));
        assert!(matches!(collection.features[0].geometry, Some(Geometry::Polygon(_))));
        assert_eq!(collection.features[1].geometry, Some(Geometry::Point(Point::new(103.8, 1.3))));
        assert_eq!(collection.features[2].geometry, None);
    }

    #[test]
    fn polygon_rings_are_closed() {
        let collection = read_from_geojson_bytes(SAMPLE.as_bytes()).unwrap();
        let Some(Geometry::Polygon(polygon)) = &collection.features[0].geometry else { panic!("expected polygon") };
        assert_eq!(polygon.exterior().0.len(), 5);
    }

    #[test]
    fn numbers_are_cleaned() {
        let collection = read_from_geojson_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(collection.features[0].number("pop"), Some(1234.0));
        assert_eq!(collection.features[1].number("pop"), Some(50.0));
        assert_eq!(collection.features[2].number("pop"), None);
        assert_eq!(collection.features[0].number("absent"), None);
    }

    #[test]
    fn location_uses_centroid_for_polygons() {
        let collection = read_from_geojson_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(collection.features[0].location(), Some(Point::new(1.0, 1.0)));
        assert_eq!(collection.features[2].location(), None);
    }

    #[test]
    fn write_preserves_raw_geometry_and_members() {
        let collection = read_from_geojson_bytes(SAMPLE.as_bytes()).unwrap();
        let bytes = write_to_geojson_bytes(&collection).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["name"], "subzones");
        assert_eq!(value["features"][1]["geometry"]["coordinates"], json!([103.8, 1.3, 0.0]));
        assert_eq!(value["features"][2]["geometry"], Value::Null);
    }

    #[test]
    fn rejects_non_collections() {
        assert!(read_from_geojson_bytes(br#"{"type": "Feature"}"#).is_err());
        assert!(read_from_geojson_bytes(b"[]").is_err());
    }
}
