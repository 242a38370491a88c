use ndarray::{Array1, Array2, ArrayView2, Zip};

#[inline]
fn squared_norms(points: ArrayView2<f64>) -> Array1<f64> {
    points.rows().into_iter().map(|p| p[0] * p[0] + p[1] * p[1]).collect()
}

/// All-pairs Euclidean distances between the rows of `a` (n, 2) and `b` (m, 2), as an (n, m) matrix.
///
/// Uses the expansion `|a|² + |b|² − 2·a·bᵗ`; negative squared distances from
/// floating-point cancellation are clipped to zero before the square root.
/// The cross term is evaluated with the same operation order as the norms,
/// so `pairwise_distances(a, a)` has an exactly zero diagonal and is exactly symmetric.
pub fn pairwise_distances(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    debug_assert!(a.ncols() == 2 && b.ncols() == 2, "coordinate arrays must be (n, 2)");

    let a_sq = squared_norms(a); // (n,)
    let b_sq = squared_norms(b); // (m,)

    let mut distances = Array2::<f64>::zeros((a.nrows(), b.nrows()));
    Zip::indexed(&mut distances).par_for_each(|(i, j), d| {
        let cross = a[[i, 0]] * b[[j, 0]] + a[[i, 1]] * b[[j, 1]];
        *d = (a_sq[i] + b_sq[j] - 2.0 * cross).max(0.0).sqrt();
    });
    distances
}
