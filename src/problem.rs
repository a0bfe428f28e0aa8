//! High-level problem facade and the two validating entry points.

use nalgebra::{DMatrix, DVector};

use crate::data::SpatialData;
use crate::deterrence::{deterrence_matrix, weight_power};
use crate::dynamics::{run_blv, EquilibriumResult};
use crate::error::Result;
use crate::solving::EquilibriumOptions;
use crate::wilson::output_constrained_flows;

/// A spatial interaction system with fixed elasticity `alpha` and cost sensitivity `beta`.
///
/// The deterrence matrix is computed once on construction and reused by
/// every flow evaluation and equilibrium run.
#[derive(Clone, Debug)]
pub struct SpatialProblem {
    data: SpatialData,
    alpha: f64,
    beta: f64,
    deterrence: DMatrix<f64>,
}

impl SpatialProblem {
    /// Binds validated data to model parameters.
    pub fn new(data: SpatialData, alpha: f64, beta: f64) -> Self {
        let deterrence = deterrence_matrix(data.costs(), beta);
        Self {
            data,
            alpha,
            beta,
            deterrence,
        }
    }

    /// Accessor for the location data.
    pub fn data(&self) -> &SpatialData {
        &self.data
    }

    /// Attractiveness elasticity.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Cost sensitivity.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// The cached `exp(-beta * cost)` matrix.
    pub fn deterrence(&self) -> &DMatrix<f64> {
        &self.deterrence
    }

    /// Output-constrained flows for fixed destination weights.
    pub fn flows(&self, weights: &DVector<f64>) -> Result<DMatrix<f64>> {
        self.data.check_weights("weights length", weights)?;
        Ok(self.flows_unchecked(weights))
    }

    /// Evolves the destination weights with the BLV dynamics.
    pub fn solve(
        &self,
        initial_weights: &DVector<f64>,
        options: &EquilibriumOptions,
    ) -> Result<EquilibriumResult> {
        self.data
            .check_weights("initial weights length", initial_weights)?;
        options.validate()?;
        self.solve_unchecked(initial_weights, options)
    }

    fn flows_unchecked(&self, weights: &DVector<f64>) -> DMatrix<f64> {
        output_constrained_flows(
            &self.deterrence,
            self.data.outputs(),
            &weight_power(weights, self.alpha),
        )
    }

    fn solve_unchecked(
        &self,
        initial_weights: &DVector<f64>,
        options: &EquilibriumOptions,
    ) -> Result<EquilibriumResult> {
        run_blv(
            &self.deterrence,
            self.data.outputs(),
            self.alpha,
            initial_weights,
            options,
        )
    }
}

/// Computes Wilson's output-constrained flow matrix in one shot.
///
/// Fails with [`BlvError`](crate::BlvError) when `costs` is not square, is
/// empty, the vectors do not match its side length, or a cost or output is
/// negative. Validation happens before the deterrence matrix is built.
pub fn flow_once(
    costs: &DMatrix<f64>,
    outputs: &DVector<f64>,
    alpha: f64,
    beta: f64,
    weights: &DVector<f64>,
) -> Result<DMatrix<f64>> {
    let data = SpatialData::new(costs.clone(), outputs.clone())?;
    data.check_weights("weights length", weights)?;
    Ok(SpatialProblem::new(data, alpha, beta).flows_unchecked(weights))
}

/// Runs the BLV fixed-point iteration from `initial_weights`.
///
/// Shapes, signs and `options.conv_check` are validated before any computation.
pub fn solve_equilibrium(
    costs: &DMatrix<f64>,
    outputs: &DVector<f64>,
    alpha: f64,
    beta: f64,
    initial_weights: &DVector<f64>,
    options: &EquilibriumOptions,
) -> Result<EquilibriumResult> {
    let data = SpatialData::new(costs.clone(), outputs.clone())?;
    data.check_weights("initial weights length", initial_weights)?;
    options.validate()?;
    SpatialProblem::new(data, alpha, beta).solve_unchecked(initial_weights, options)
}
