// End-to-end scoring on small hand-checkable layouts.

use geo::{polygon, Point};
use hawker_gravity::{
    score_units, AccessibilityLayer, CompositeWeights, DemandPoint, EvaluationUnit, KernelKind,
    LayerParams, LayerPoint, ScoreError, ScoringConfig, SupplyPoint,
};

fn close(a: f64, b: f64, tol: f64) -> bool { (a - b).abs() <= tol }

/// Two units 1 km apart, one demand point on the first, one amenity halfway.
fn two_unit_layout() -> (Vec<EvaluationUnit>, Vec<DemandPoint>, Vec<SupplyPoint>) {
    (
        vec![
            EvaluationUnit::new("west", Point::new(0.0, 0.0)),
            EvaluationUnit::new("east", Point::new(1000.0, 0.0)),
        ],
        vec![DemandPoint::new(Point::new(0.0, 0.0), 100.0)],
        vec![SupplyPoint::new(Point::new(500.0, 0.0), 10.0)],
    )
}

fn unit_weights_config() -> ScoringConfig {
    ScoringConfig::new(
        KernelKind::Exponential, 700.0, 700.0, 700.0,
        CompositeWeights::new(1.0, 1.0, 0.0).unwrap(),
    ).unwrap()
}

#[test]
fn two_unit_scenario_matches_hand_computation() {
    let (units, demand, supply) = two_unit_layout();
    let results = score_units(&units, &demand, &supply, &[], unit_weights_config()).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "west");
    assert_eq!(results[1].id, "east");

    // Demand: 100·exp(0) and 100·exp(−1000/700)
    assert!(close(results[0].dem, 100.0, 1e-9));
    assert!(close(results[1].dem, 100.0 * (-1000.0f64 / 700.0).exp(), 1e-9));
    assert!(close(results[1].dem, 23.97, 0.01));

    // Draw at the amenity is 100·exp(−500/700) ≈ 48.95; both units are 500 m away.
    let draw = 100.0 * (-500.0f64 / 700.0).exp();
    assert!(close(draw, 48.95, 0.01));
    let expected_sup = 10.0 / draw * (-500.0f64 / 700.0).exp();
    assert!(close(results[0].sup, expected_sup, 1e-12));
    assert_eq!(results[0].sup, results[1].sup);

    // Equal supply standardizes to zero; no layers means zero accessibility.
    assert_eq!(results[0].z_sup, 0.0);
    assert_eq!(results[1].z_sup, 0.0);
    assert_eq!(results[0].acc, 0.0);
    assert_eq!(results[0].z_acc, 0.0);

    // Two values: median is the midpoint, IQR half the gap, so z = ±1.
    assert!(close(results[0].z_dem, 1.0, 1e-12));
    assert!(close(results[1].z_dem, -1.0, 1e-12));
    assert!(results[0].h_score > results[1].h_score);
}

#[test]
fn polygon_units_are_scored_at_their_centroids() {
    let square = polygon![(x: -50.0, y: -50.0), (x: 50.0, y: -50.0), (x: 50.0, y: 50.0), (x: -50.0, y: 50.0)];
    let units = vec![
        EvaluationUnit::new("block", square),
        EvaluationUnit::new("point", Point::new(0.0, 0.0)),
    ];
    let demand = vec![DemandPoint::new(Point::new(0.0, 0.0), 25.0)];
    let results = score_units(&units, &demand, &[], &[], ScoringConfig::default()).unwrap();
    assert!(close(results[0].dem, results[1].dem, 1e-9));
}

#[test]
fn accessibility_layers_raise_nearby_units() {
    let (units, demand, supply) = two_unit_layout();
    let rail = AccessibilityLayer::new(
        "mrt",
        vec![LayerPoint::new(Point::new(1000.0, 0.0))],
        LayerParams::new(900.0, 1.0).unwrap(),
    );
    let config = ScoringConfig::new(
        KernelKind::Exponential, 700.0, 700.0, 700.0,
        CompositeWeights::new(0.0, 0.0, 1.0).unwrap(),
    ).unwrap();
    let results = score_units(&units, &demand, &supply, &[rail], config).unwrap();
    assert!(close(results[1].acc, 1.0, 1e-12));
    assert!(close(results[0].acc, (-1000.0f64 / 900.0).exp(), 1e-12));
    assert!(results[1].h_score > results[0].h_score);
}

#[test]
fn empty_point_sets_give_zero_channels() {
    let units = vec![
        EvaluationUnit::new("a", Point::new(0.0, 0.0)),
        EvaluationUnit::new("b", Point::new(10.0, 0.0)),
    ];
    let results = score_units(&units, &[], &[], &[], ScoringConfig::default()).unwrap();
    for r in &results {
        assert_eq!((r.dem, r.sup, r.acc), (0.0, 0.0, 0.0));
        assert_eq!((r.z_dem, r.z_sup, r.z_acc, r.h_score), (0.0, 0.0, 0.0, 0.0));
    }
}

#[test]
fn supply_without_demand_keeps_nominal_capacity() {
    let units = vec![EvaluationUnit::new("a", Point::new(0.0, 0.0))];
    let supply = vec![SupplyPoint::new(Point::new(0.0, 0.0), 3.0)];
    let results = score_units(&units, &[], &supply, &[], ScoringConfig::default()).unwrap();
    assert!(close(results[0].sup, 3.0, 1e-12));
}

#[test]
fn gaussian_kernel_is_supported() {
    let (units, demand, supply) = two_unit_layout();
    let config = ScoringConfig::new(
        KernelKind::Gaussian, 700.0, 700.0, 700.0, CompositeWeights::default(),
    ).unwrap();
    let results = score_units(&units, &demand, &supply, &[], config).unwrap();
    let t: f64 = 1000.0 / 700.0;
    assert!(close(results[1].dem, 100.0 * (-(t * t) / 2.0).exp(), 1e-9));
}

#[test]
fn invalid_point_weight_is_rejected() {
    let (units, mut demand, supply) = two_unit_layout();
    demand.push(DemandPoint::new(Point::new(1.0, 1.0), -5.0));
    let err = score_units(&units, &demand, &supply, &[], ScoringConfig::default()).unwrap_err();
    assert_eq!(err, ScoreError::InvalidWeight { set: "demand".into(), index: 1, value: -5.0 });
}

#[test]
fn scoring_is_deterministic() {
    let (units, demand, supply) = two_unit_layout();
    let first = score_units(&units, &demand, &supply, &[], ScoringConfig::default()).unwrap();
    let second = score_units(&units, &demand, &supply, &[], ScoringConfig::default()).unwrap();
    assert_eq!(first, second);
}
