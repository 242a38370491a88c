use std::{cmp::Ordering, collections::BTreeSet};

use serde::Serialize;

use crate::io::FeatureCollection;

/// One row of the ranking table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnitSummary {
    pub name: String,
    pub h_score: Option<f64>,
    pub dem: Option<f64>,
    pub sup: Option<f64>,
    pub acc: Option<f64>,
}

/// Summaries of every unit in a scored collection, best first.
/// Ties keep input order; units without an `H_score` sort last.
pub fn rank(collection: &FeatureCollection, name_field: &str) -> Vec<UnitSummary> {
    let mut rows: Vec<UnitSummary> = collection.features.iter().enumerate()
        .map(|(index, feature)| UnitSummary {
            name: feature.text(name_field)
                .or_else(|| feature.text("Name"))
                .unwrap_or_else(|| index.to_string()),
            h_score: feature.number("H_score"),
            dem: feature.number("Dem"),
            sup: feature.number("Sup"),
            acc: feature.number("Acc"),
        })
        .collect();

    rows.sort_by(|a, b| match (a.h_score, b.h_score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

/// Distinct unit names, sorted.
pub fn names(collection: &FeatureCollection, name_field: &str) -> Vec<String> {
    collection.features.iter()
        .filter_map(|feature| feature.text(name_field).or_else(|| feature.text("subzone")))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::geojson::read_from_geojson_bytes;

    const SCORED: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "geometry": null, "properties": {"SUBZONE_N": "B", "H_score": 0.5, "Dem": 10}},
        {"type": "Feature", "geometry": null, "properties": {"SUBZONE_N": "A", "H_score": 1.5}},
        {"type": "Feature", "geometry": null, "properties": {"SUBZONE_N": "C", "H_score": null}},
        {"type": "Feature", "geometry": null, "properties": {"SUBZONE_N": "D", "H_score": 0.5}},
        {"type": "Feature", "geometry": null, "properties": {"SUBZONE_N": "A", "H_score": -2}}
    ]}"#;

    #[test]
    fn ranks_descending_with_stable_ties() {
        let collection = read_from_geojson_bytes(SCORED.as_bytes()).unwrap();
        let order: Vec<_> = rank(&collection, "SUBZONE_N").into_iter()
            .map(|row| (row.name, row.h_score))
            .collect();
        assert_eq!(order, vec![
            ("A".to_string(), Some(1.5)),
            ("B".to_string(), Some(0.5)),
            ("D".to_string(), Some(0.5)),
            ("A".to_string(), Some(-2.0)),
            ("C".to_string(), None),
        ]);
    }

    #[test]
    fn names_are_distinct_and_sorted() {
        let collection = read_from_geojson_bytes(SCORED.as_bytes()).unwrap();
        assert_eq!(names(&collection, "SUBZONE_N"), vec!["A", "B", "C", "D"]);
    }
}
