//! Equilibrium solver configuration, convergence monitoring and diagnostics.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{BlvError, Result};

/// Dynamic rule used to turn the inflow gap into a weight update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRule {
    /// `delta = inflow - weights`.
    #[default]
    Linear,
    /// `delta = (inflow - weights) * weights`, the Lotka-Volterra style damping.
    ///
    /// The update vanishes wherever a weight is zero, so empty destinations
    /// stay empty and weights approaching zero slow down instead of crossing it.
    Quadratic,
}

impl From<bool> for UpdateRule {
    /// Maps the conventional `quadratic` flag onto a rule.
    fn from(quadratic: bool) -> Self {
        if quadratic {
            Self::Quadratic
        } else {
            Self::Linear
        }
    }
}

/// Configuration for the Boltzmann-Lotka-Volterra fixed-point iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquilibriumOptions {
    /// Explicit Euler step size applied to the weight update.
    pub epsilon: f64,
    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,
    /// Convergence is only tested every `conv_check` iterations.
    pub conv_check: usize,
    /// Tolerance of the combined relative/absolute convergence test.
    pub precision: f64,
    /// Damping rule for the weight dynamics.
    pub update_rule: UpdateRule,
    /// Stop early once the weights contain NaN or infinite entries.
    pub halt_on_non_finite: bool,
}

impl Default for EquilibriumOptions {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            max_iterations: 10_000,
            conv_check: 100,
            precision: 1e-6,
            update_rule: UpdateRule::Linear,
            halt_on_non_finite: false,
        }
    }
}

impl EquilibriumOptions {
    /// Override the Euler step size.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Override how often convergence is tested.
    pub fn with_conv_check(mut self, conv_check: usize) -> Self {
        self.conv_check = conv_check;
        self
    }

    /// Override the convergence tolerance.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Select the damping rule.
    pub fn with_update_rule(mut self, update_rule: UpdateRule) -> Self {
        self.update_rule = update_rule;
        self
    }

    /// Select the damping rule from the boolean `quadratic` flag.
    pub fn quadratic(self, quadratic: bool) -> Self {
        self.with_update_rule(quadratic.into())
    }

    /// Enable or disable stopping on non-finite weights.
    pub fn with_halt_on_non_finite(mut self, halt: bool) -> Self {
        self.halt_on_non_finite = halt;
        self
    }

    /// Rejects settings the iteration cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.conv_check == 0 {
            return Err(BlvError::invalid_parameter("conv_check", self.conv_check));
        }
        Ok(())
    }
}

/// Terminal state of an equilibrium run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The convergence test passed at a `conv_check` boundary.
    Converged,
    /// All `max_iterations` iterations ran without meeting the tolerance.
    Exhausted,
    /// The weights became non-finite and `halt_on_non_finite` was set.
    NonFinite,
}

/// Outcome of one convergence test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergenceCheck {
    /// Euclidean norm of the last weight update direction.
    pub delta_norm: f64,
    /// Euclidean norm of the weights after the update.
    pub weights_norm: f64,
    /// Whether `delta_norm < precision * (weights_norm + precision)`.
    pub converged: bool,
}

/// Periodic convergence test on the weight dynamics.
///
/// The criterion `|delta| < precision * (|weights| + precision)` is relative
/// for large weights and degrades to an absolute `precision^2` bound when the
/// weights approach zero.
#[derive(Clone, Copy, Debug)]
pub struct ConvergenceMonitor {
    conv_check: usize,
    precision: f64,
}

impl ConvergenceMonitor {
    /// Creates a monitor testing every `conv_check` iterations.
    pub fn new(conv_check: usize, precision: f64) -> Result<Self> {
        if conv_check == 0 {
            return Err(BlvError::invalid_parameter("conv_check", conv_check));
        }
        Ok(Self {
            conv_check,
            precision,
        })
    }

    /// Builds a monitor from solver options.
    pub fn from_options(options: &EquilibriumOptions) -> Result<Self> {
        Self::new(options.conv_check, options.precision)
    }

    /// Whether a test is scheduled after the zero-based `iteration`.
    pub fn is_due(&self, iteration: usize) -> bool {
        (iteration + 1) % self.conv_check == 0
    }

    /// Evaluates the tolerance for an update direction and the updated weights.
    pub fn check(&self, delta: &DVector<f64>, weights: &DVector<f64>) -> ConvergenceCheck {
        let delta_norm = delta.norm();
        let weights_norm = weights.norm();
        ConvergenceCheck {
            delta_norm,
            weights_norm,
            converged: delta_norm < self.precision * (weights_norm + self.precision),
        }
    }
}
