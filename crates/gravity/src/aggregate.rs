use ndarray::{Array1, ArrayView1, ArrayView2};
use tracing::debug;

use crate::{
    distance::pairwise_distances,
    kernel::KernelKind,
    unit::{AccessibilityLayer, PointSet},
    error::ScoreError,
};

/// Weighted distance-decay sum from `sources` (n, 2) onto `targets` (m, 2):
/// `out[i] = Σ_s weights[s] · kernel(distance(s, i), lambda)`.
///
/// An empty source set contributes zero to every target. Only one (n, m)
/// matrix is alive at a time.
pub fn gravity_sum(
    sources: ArrayView2<f64>,
    weights: ArrayView1<f64>,
    targets: ArrayView2<f64>,
    kernel: KernelKind,
    lambda: f64,
) -> Array1<f64> {
    debug_assert_eq!(sources.nrows(), weights.len());
    if sources.nrows() == 0 || targets.nrows() == 0 {
        return Array1::zeros(targets.nrows());
    }
    let decay = kernel.apply(pairwise_distances(sources, targets), lambda); // (n, m)
    weights.dot(&decay)
}

/// Population-weighted demand reaching each unit: `Dem(i) = Σ_u pop(u) · k(d(u, i), λ_D)`.
pub(crate) fn demand(
    demand: &PointSet,
    units: ArrayView2<f64>,
    kernel: KernelKind,
    lambda_demand: f64,
) -> Array1<f64> {
    let dem = gravity_sum(demand.coords.view(), demand.weights.view(), units, kernel, lambda_demand);
    debug!(demand_points = demand.len(), units = units.nrows(), total = dem.sum(), "demand aggregated");
    dem
}

/// Stage 1 of the supply model: demand drawn toward each supply point,
/// `draw(j) = Σ_u pop(u) · k(d(u, j), λ_C)`, floored to 1.0 where it is not positive.
pub(crate) fn competitive_draw(
    demand: &PointSet,
    supply: &PointSet,
    kernel: KernelKind,
    lambda_competition: f64,
) -> Array1<f64> {
    gravity_sum(demand.coords.view(), demand.weights.view(), supply.coords.view(), kernel, lambda_competition)
        .mapv(|draw| if draw > 0.0 { draw } else { 1.0 })
}

/// Competition-adjusted supply reaching each unit:
/// `Sup(i) = Σ_j (cap(j) / draw(j)) · k(d(j, i), λ_S)`.
pub(crate) fn effective_supply(
    demand: &PointSet,
    supply: &PointSet,
    units: ArrayView2<f64>,
    kernel: KernelKind,
    lambda_competition: f64,
    lambda_supply: f64,
) -> Array1<f64> {
    if supply.is_empty() {
        return Array1::zeros(units.nrows());
    }
    let draw = competitive_draw(demand, supply, kernel, lambda_competition);
    let share = &supply.weights / &draw;
    let sup = gravity_sum(supply.coords.view(), share.view(), units, kernel, lambda_supply);
    debug!(supply_points = supply.len(), min_draw = draw.fold(f64::INFINITY, |a, &b| a.min(b)), total = sup.sum(), "supply aggregated");
    sup
}

/// Multi-layer accessibility: `Acc(i) = Σ_layer β · Σ_p w(p) · k(d(p, i), λ_layer)`.
/// No layers, or only empty layers, give zero everywhere.
pub(crate) fn accessibility(
    layers: &[AccessibilityLayer],
    units: ArrayView2<f64>,
    kernel: KernelKind,
) -> Result<Array1<f64>, ScoreError> {
    let mut acc = Array1::<f64>::zeros(units.nrows());
    for layer in layers {
        let points = PointSet::from_sites(&layer.points)?;
        let contribution = gravity_sum(points.coords.view(), points.weights.view(), units, kernel, layer.params.decay());
        acc.scaled_add(layer.params.multiplier(), &contribution);
        debug!(layer = %layer.name, points = points.len(), total = contribution.sum(), "accessibility layer aggregated");
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LayerParams, unit::{DemandPoint, LayerPoint, SupplyPoint}};
    use geo::Point;
    use ndarray::array;

    fn demand_set(points: &[(f64, f64, f64)]) -> PointSet {
        let sites = points.iter().map(|&(x, y, p)| DemandPoint::new(Point::new(x, y), p)).collect::<Vec<_>>();
        PointSet::from_sites(&sites).unwrap()
    }

    fn supply_set(points: &[(f64, f64, f64)]) -> PointSet {
        let sites = points.iter().map(|&(x, y, c)| SupplyPoint::new(Point::new(x, y), c)).collect::<Vec<_>>();
        PointSet::from_sites(&sites).unwrap()
    }

    #[test]
    fn gravity_sum_over_empty_sources_is_zero() {
        let sources = ndarray::Array2::<f64>::zeros((0, 2));
        let weights = Array1::<f64>::zeros(0);
        let targets = array![[0.0, 0.0], [10.0, 0.0]];
        let out = gravity_sum(sources.view(), weights.view(), targets.view(), KernelKind::Exponential, 700.0);
        assert_eq!(out, array![0.0, 0.0]);
    }

    #[test]
    fn demand_matches_hand_computation() {
        let units = array![[0.0, 0.0], [1000.0, 0.0]];
        let dem = demand(&demand_set(&[(0.0, 0.0, 100.0)]), units.view(), KernelKind::Exponential, 700.0);
        assert!((dem[0] - 100.0).abs() < 1e-9);
        assert!((dem[1] - 100.0 * (-1000.0f64 / 700.0).exp()).abs() < 1e-9);
    }

    #[test]
    fn draw_is_floored_for_isolated_supply() {
        let no_demand = demand_set(&[]);
        let supply = supply_set(&[(0.0, 0.0, 4.0)]);
        let draw = competitive_draw(&no_demand, &supply, KernelKind::Exponential, 700.0);
        assert_eq!(draw, array![1.0]);

        // Zero population everywhere also floors.
        let zero_pop = demand_set(&[(0.0, 0.0, 0.0)]);
        assert_eq!(competitive_draw(&zero_pop, &supply, KernelKind::Exponential, 700.0), array![1.0]);
    }

    #[test]
    fn isolated_supply_keeps_full_capacity() {
        let units = array![[0.0, 0.0]];
        let sup = effective_supply(&demand_set(&[]), &supply_set(&[(0.0, 0.0, 4.0)]), units.view(), KernelKind::Exponential, 700.0, 700.0);
        assert!((sup[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn empty_supply_is_zero() {
        let units = array![[0.0, 0.0], [5.0, 5.0]];
        let sup = effective_supply(&demand_set(&[(0.0, 0.0, 10.0)]), &supply_set(&[]), units.view(), KernelKind::Gaussian, 700.0, 700.0);
        assert_eq!(sup, array![0.0, 0.0]);
    }

    #[test]
    fn accessibility_sums_layers_with_multipliers() {
        let units = array![[0.0, 0.0]];
        let rail = AccessibilityLayer::new("mrt", vec![LayerPoint::new(Point::new(0.0, 0.0))], LayerParams::new(900.0, 2.0).unwrap());
        let bus = AccessibilityLayer::new(
            "bus",
            vec![LayerPoint::weighted(Point::new(0.0, 0.0), 3.0), LayerPoint::new(Point::new(500.0, 0.0))],
            LayerParams::new(500.0, 1.0).unwrap(),
        );
        let acc = accessibility(&[rail, bus], units.view(), KernelKind::Exponential).unwrap();
        let expected = 2.0 * 1.0 + (3.0 + (-1.0f64).exp());
        assert!((acc[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn accessibility_without_layers_is_zero() {
        let units = array![[0.0, 0.0], [1.0, 1.0]];
        let empty = AccessibilityLayer::new("bus", vec![], LayerParams::new(500.0, 1.0).unwrap());
        assert_eq!(accessibility(&[], units.view(), KernelKind::Exponential).unwrap(), array![0.0, 0.0]);
        assert_eq!(accessibility(&[empty], units.view(), KernelKind::Exponential).unwrap(), array![0.0, 0.0]);
    }
}
