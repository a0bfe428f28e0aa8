//! Wilson's output-constrained entropy-maximizing flow model.
//!
//! For deterrence `D`, origin outputs `X` and powered destination weights
//! `W = Z^alpha`, the flow from origin `i` to destination `j` is
//!
//! ```text
//! A_i    = sum_j D[i, j] * W[j]
//! Y[i,j] = X[i] * W[j] * D[i, j] / A_i
//! ```
//!
//! Each row of `Y` is `X[i]` times a probability distribution over
//! destinations, so row sums reproduce the outputs exactly. Nothing constrains
//! the column sums; those are the destination inflows that drive the BLV
//! dynamics in [`crate::dynamics`].
//!
//! Rows are computed in parallel. Every normalizer is reduced sequentially
//! within its own row, so the result does not depend on the thread count.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Computes the output-constrained flow matrix.
///
/// Shapes are assumed to be consistent (`deterrence` is `n x n`, both vectors
/// have length `n`); the public entry points validate them beforehand.
///
/// A zero normalizer `A_i` produces a non-finite row. It is deliberately not
/// trapped so the caller can see the degeneracy in the result.
pub fn output_constrained_flows(
    deterrence: &DMatrix<f64>,
    outputs: &DVector<f64>,
    weight_power: &DVector<f64>,
) -> DMatrix<f64> {
    let origins = deterrence.nrows();
    let destinations = deterrence.ncols();

    // Rayon's collect keeps origin order, so this is the matrix in row-major layout.
    let row_major: Vec<f64> = (0..origins)
        .into_par_iter()
        .flat_map_iter(|origin| {
            let normalizer = row_normalizer(deterrence, weight_power, origin);
            (0..destinations).map(move |destination| {
                outputs[origin] * weight_power[destination] * deterrence[(origin, destination)]
                    / normalizer
            })
        })
        .collect();

    DMatrix::from_row_slice(origins, destinations, &row_major)
}

/// Returns the per-origin normalizing constants `A_i = sum_j D[i, j] * W[j]`.
pub fn normalizers(deterrence: &DMatrix<f64>, weight_power: &DVector<f64>) -> DVector<f64> {
    DVector::from_fn(deterrence.nrows(), |origin, _| {
        row_normalizer(deterrence, weight_power, origin)
    })
}

/// Total flow attracted by each destination (column sums of the flow matrix).
pub fn inflows(flows: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(flows.ncols(), flows.column_iter().map(|column| column.sum()))
}

fn row_normalizer(deterrence: &DMatrix<f64>, weight_power: &DVector<f64>, origin: usize) -> f64 {
    deterrence
        .row(origin)
        .iter()
        .zip(weight_power.iter())
        .map(|(d, w)| d * w)
        .sum()
}
