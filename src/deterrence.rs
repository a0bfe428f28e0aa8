//! Elementwise transforms applied before the flow kernel: cost deterrence and attractiveness elasticity.

use nalgebra::{DMatrix, DVector};

/// Maps a cost matrix to its exponential deterrence `exp(-beta * cost)`.
///
/// Large `beta * cost` products underflow to zero; that is a legitimate
/// (if degenerate) model input and is not reported.
pub fn deterrence_matrix(costs: &DMatrix<f64>, beta: f64) -> DMatrix<f64> {
    costs.map(|cost| (-beta * cost).exp())
}

/// Raises each destination weight to the elasticity `alpha`.
///
/// Follows `f64::powf`: `0^0 = 1`, and a negative weight with a fractional
/// `alpha` yields NaN, which is passed on to the caller unchanged.
pub fn weight_power(weights: &DVector<f64>, alpha: f64) -> DVector<f64> {
    weights.map(|weight| weight.powf(alpha))
}
