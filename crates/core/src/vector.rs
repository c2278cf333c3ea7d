use nalgebra::DVector;

/// Dense state vector used throughout the corrector.
pub type Vector = DVector<f64>;

/// Returns the weighted root-mean-square norm of `v` with weights `w`.
///
/// The norm is `sqrt(sum((v[i] * w[i])^2) / n)`. An empty vector has norm zero.
///
/// # Panics
///
/// Panics if `v` and `w` have different lengths.
#[must_use]
pub fn wrms_norm(v: &Vector, w: &Vector) -> f64 {
    assert_eq!(v.len(), w.len(), "vector and weights must match in length");

    if v.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = v.len() as f64;
    let sum: f64 = v.iter().zip(w.iter()).map(|(x, w)| (x * w).powi(2)).sum();
    (sum / n).sqrt()
}
