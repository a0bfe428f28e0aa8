//! Boltzmann-Lotka-Volterra (BLV) dynamics: evolving destination weights to a fixed point.
//!
//! Each iteration runs the Wilson output-constrained model with the current
//! weights, compares the resulting destination inflows with the weights, and
//! takes an explicit Euler step of `dZ/dt = inflow - Z` (optionally damped by
//! `Z`). A fixed point is a weight vector that every destination attracts
//! exactly.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::deterrence::weight_power;
use crate::error::Result;
use crate::solving::{ConvergenceMonitor, EquilibriumOptions, SolveStatus, UpdateRule};
use crate::wilson::{inflows, output_constrained_flows};

/// Final state of an equilibrium run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumResult {
    /// Flow matrix computed in the last iteration, i.e. from the weights
    /// before the final update. With zero iterations it is the flow implied
    /// by the initial weights.
    pub flows: DMatrix<f64>,
    /// Zero-based index of the iteration the loop stopped at, or
    /// `max_iterations` when the cap was exhausted. An early exit at index
    /// `t` has applied `t + 1` Euler steps.
    pub iterations: usize,
    /// Destination weights after the last step.
    pub weights: DVector<f64>,
    /// How the run terminated.
    pub status: SolveStatus,
    /// Update norm seen by the most recent convergence test, if one ran.
    pub delta_norm: Option<f64>,
}

impl EquilibriumResult {
    /// Whether the run stopped because the tolerance was met.
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    /// Whether every flow and weight is finite.
    ///
    /// A `false` here is how zero normalizers or undefined powers surface.
    pub fn is_finite(&self) -> bool {
        self.flows.iter().all(|value| value.is_finite())
            && self.weights.iter().all(|value| value.is_finite())
    }

    /// Total flow attracted by each destination under the final flow matrix.
    pub fn inflows(&self) -> DVector<f64> {
        inflows(&self.flows)
    }
}

/// Runs the BLV iteration on a precomputed deterrence matrix.
///
/// Shapes must already be consistent; see [`crate::solve_equilibrium`] for
/// the validating entry point. Non-finite values are propagated through the
/// weights unless `options.halt_on_non_finite` is set.
pub fn run_blv(
    deterrence: &DMatrix<f64>,
    outputs: &DVector<f64>,
    alpha: f64,
    initial_weights: &DVector<f64>,
    options: &EquilibriumOptions,
) -> Result<EquilibriumResult> {
    let monitor = ConvergenceMonitor::from_options(options)?;
    debug!(
        "starting BLV iteration: n={}, alpha={}, epsilon={}, max_iterations={}, rule={:?}",
        outputs.len(),
        alpha,
        options.epsilon,
        options.max_iterations,
        options.update_rule
    );

    let mut weights = initial_weights.clone();
    let mut flows = None;
    let mut status = SolveStatus::Exhausted;
    let mut iterations = options.max_iterations;
    let mut delta_norm = None;

    for iteration in 0..options.max_iterations {
        let (step_flows, delta) = blv_step(deterrence, outputs, alpha, &mut weights, options);
        flows = Some(step_flows);

        if monitor.is_due(iteration) {
            let check = monitor.check(&delta, &weights);
            trace!(
                "iteration {}: |delta|={:e}, |weights|={:e}",
                iteration,
                check.delta_norm,
                check.weights_norm
            );
            delta_norm = Some(check.delta_norm);
            if check.converged {
                status = SolveStatus::Converged;
                iterations = iteration;
                break;
            }
        }

        if options.halt_on_non_finite && weights.iter().any(|weight| !weight.is_finite()) {
            status = SolveStatus::NonFinite;
            iterations = iteration;
            break;
        }
    }

    let flows = match flows {
        Some(flows) => flows,
        None => output_constrained_flows(deterrence, outputs, &weight_power(&weights, alpha)),
    };

    debug!("BLV iteration finished: status={status:?}, iterations={iterations}");

    Ok(EquilibriumResult {
        flows,
        iterations,
        weights,
        status,
        delta_norm,
    })
}

/// One Euler step: returns the flows for the current weights and the update direction.
fn blv_step(
    deterrence: &DMatrix<f64>,
    outputs: &DVector<f64>,
    alpha: f64,
    weights: &mut DVector<f64>,
    options: &EquilibriumOptions,
) -> (DMatrix<f64>, DVector<f64>) {
    let flows = output_constrained_flows(deterrence, outputs, &weight_power(weights, alpha));

    let mut delta = inflows(&flows) - &*weights;
    if options.update_rule == UpdateRule::Quadratic {
        delta.component_mul_assign(&*weights);
    }
    weights.axpy(options.epsilon, &delta, 1.0);

    (flows, delta)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::deterrence::deterrence_matrix;

    fn two_sites() -> (DMatrix<f64>, DVector<f64>) {
        let costs = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        (deterrence_matrix(&costs, 1.0), DVector::from_vec(vec![1.0, 1.0]))
    }

    /// Identical sites attract exactly their own output, so the first step is already stationary.
    #[test]
    fn symmetric_system_is_a_fixed_point() {
        let (deterrence, outputs) = two_sites();
        let options = EquilibriumOptions::default()
            .with_epsilon(0.5)
            .with_max_iterations(100)
            .with_conv_check(1)
            .with_precision(1e-9);

        let result =
            run_blv(&deterrence, &outputs, 1.0, &DVector::from_element(2, 1.0), &options).unwrap();

        assert!(result.converged());
        assert_eq!(result.iterations, 0);
        assert_relative_eq!(result.weights, DVector::from_element(2, 1.0), epsilon = 1e-12);
        assert_relative_eq!(result.flows[(0, 1)], result.flows[(1, 0)], epsilon = 1e-15);
        assert_relative_eq!(result.flows[(0, 0)], 1.0 / (1.0 + (-1.0_f64).exp()), epsilon = 1e-12);
    }

    /// A stationary start still waits for the first scheduled check, at loop index `conv_check - 1`.
    #[test]
    fn early_exit_reports_loop_index() {
        let (deterrence, outputs) = two_sites();
        let options = EquilibriumOptions::default()
            .with_epsilon(0.5)
            .with_max_iterations(100)
            .with_conv_check(3)
            .with_precision(1e-9);

        let result =
            run_blv(&deterrence, &outputs, 1.0, &DVector::from_element(2, 1.0), &options).unwrap();

        assert!(result.converged());
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn zero_iterations_return_initial_state() {
        let (deterrence, outputs) = two_sites();
        let initial = DVector::from_vec(vec![2.0, 0.5]);
        let options = EquilibriumOptions::default().with_max_iterations(0);

        let result = run_blv(&deterrence, &outputs, 1.0, &initial, &options).unwrap();

        assert_eq!(result.iterations, 0);
        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.weights, initial);
        assert_eq!(result.delta_norm, None);
        let expected =
            output_constrained_flows(&deterrence, &outputs, &weight_power(&initial, 1.0));
        assert_eq!(result.flows, expected);
    }

    #[test]
    fn quadratic_rule_keeps_empty_destination_empty() {
        let (deterrence, outputs) = two_sites();
        let initial = DVector::from_vec(vec![1.0, 0.0]);
        let options = EquilibriumOptions::default()
            .with_epsilon(0.1)
            .with_max_iterations(50)
            .quadratic(true);

        // alpha = 0 lets the empty destination attract flow, so only the damping holds it at zero.
        let result = run_blv(&deterrence, &outputs, 0.0, &initial, &options).unwrap();
        assert_eq!(result.weights[1], 0.0);
        assert!(result.inflows()[1] > 0.0);
    }

    #[test]
    fn linear_rule_moves_empty_destination() {
        let (deterrence, outputs) = two_sites();
        let initial = DVector::from_vec(vec![1.0, 0.0]);
        let options = EquilibriumOptions::default()
            .with_epsilon(0.1)
            .with_max_iterations(50);

        let result = run_blv(&deterrence, &outputs, 0.0, &initial, &options).unwrap();
        assert!(result.weights[1] > 0.0);
    }

    #[test]
    fn exhausted_run_reports_cap() {
        let (deterrence, outputs) = two_sites();
        let options = EquilibriumOptions::default()
            .with_epsilon(0.01)
            .with_max_iterations(3)
            .with_conv_check(1)
            .with_precision(1e-12);

        let initial = DVector::from_vec(vec![3.0, 0.1]);
        let result = run_blv(&deterrence, &outputs, 0.5, &initial, &options).unwrap();

        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.iterations, 3);
        assert!(result.delta_norm.is_some());
    }

    #[test]
    fn non_finite_weights_propagate_by_default() {
        let deterrence = deterrence_matrix(&DMatrix::from_element(1, 1, 1.0), 1.0);
        let outputs = DVector::from_element(1, 1.0);
        let options = EquilibriumOptions::default()
            .with_max_iterations(20)
            .with_conv_check(1);

        let result = run_blv(&deterrence, &outputs, 1.0, &DVector::zeros(1), &options).unwrap();

        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.iterations, 20);
        assert!(result.weights[0].is_nan());
        assert!(!result.is_finite());
    }

    #[test]
    fn non_finite_weights_halt_when_requested() {
        let deterrence = deterrence_matrix(&DMatrix::from_element(1, 1, 1.0), 1.0);
        let outputs = DVector::from_element(1, 1.0);
        let options = EquilibriumOptions::default()
            .with_max_iterations(20)
            .with_halt_on_non_finite(true);

        let result = run_blv(&deterrence, &outputs, 1.0, &DVector::zeros(1), &options).unwrap();

        assert_eq!(result.status, SolveStatus::NonFinite);
        assert_eq!(result.iterations, 0);
        assert!(result.flows[(0, 0)].is_nan());
    }
}
