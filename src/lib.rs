//! Production-constrained spatial interaction models and their Boltzmann-Lotka-Volterra equilibria.
//!
//! Given pairwise interaction costs between `n` locations, the output produced
//! at each origin and a destination attractiveness ("weight") vector, this
//! crate computes how much flow moves from every origin to every destination.
//! It offers tools to
//!
//! - validate location data (`data` module),
//! - turn costs into exponential deterrence (`deterrence` module),
//! - evaluate Wilson's output-constrained entropy-maximizing model (`wilson` module),
//! - configure and monitor the fixed-point iteration (`solving` module), and
//! - evolve destination weights with the BLV dynamics (`dynamics` module).
//!
//! Malformed shapes are rejected with [`BlvError`]. Numerical degeneracy, such
//! as an origin whose reachable destinations all have zero weight, is not an
//! error: it shows up as NaN in the returned flows and weights.
//!
//! # Quick start
//!
//! ```no_run
//! use blvrs::{solve_equilibrium, EquilibriumOptions};
//! use nalgebra::{DMatrix, DVector};
//!
//! let costs = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
//! let outputs = DVector::from_vec(vec![1.0, 2.0, 1.0]);
//! let initial = DVector::from_element(3, 4.0 / 3.0);
//!
//! let options = EquilibriumOptions::default()
//!     .with_epsilon(0.1)
//!     .with_conv_check(10)
//!     .quadratic(false);
//!
//! let result = solve_equilibrium(&costs, &outputs, 1.1, 1.5, &initial, &options)
//!     .expect("well-formed problem");
//! println!("{:?} after {} iterations", result.status, result.iterations);
//! ```

pub mod data;
pub mod deterrence;
pub mod dynamics;
pub mod error;
pub mod problem;
pub mod solving;
pub mod wilson;

pub use data::{SpatialData, SpatialDataBuilder};
pub use dynamics::EquilibriumResult;
pub use error::{BlvError, Result};
pub use problem::{flow_once, solve_equilibrium, SpatialProblem};
pub use solving::{ConvergenceMonitor, EquilibriumOptions, SolveStatus, UpdateRule};
