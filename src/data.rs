//! Location-level data containers and validation utilities for spatial interaction models.

use nalgebra::{DMatrix, DVector};

use crate::error::{BlvError, Result};

/// Pairwise costs and origin outputs for a system of `n` locations.
///
/// Every location acts both as an origin (row of the cost matrix) and as a
/// destination (column). Shapes and signs are validated on construction, so
/// the numerical kernels downstream never re-check them.
#[derive(Clone, Debug)]
pub struct SpatialData {
    costs: DMatrix<f64>,
    outputs: DVector<f64>,
}

impl SpatialData {
    /// Creates a `SpatialData` instance from validated components.
    pub fn new(costs: DMatrix<f64>, outputs: DVector<f64>) -> Result<Self> {
        SpatialDataBuilder::new(costs).outputs(outputs).build()
    }

    /// Number of locations.
    pub fn location_count(&self) -> usize {
        self.outputs.len()
    }

    /// Returns a read-only view of the cost matrix.
    pub fn costs(&self) -> &DMatrix<f64> {
        &self.costs
    }

    /// Returns a read-only view of the origin outputs (`X`).
    pub fn outputs(&self) -> &DVector<f64> {
        &self.outputs
    }

    /// Total output produced across all origins.
    pub fn total_output(&self) -> f64 {
        self.outputs.sum()
    }

    /// Checks that a weight vector matches the number of locations.
    pub fn check_weights(&self, context: &'static str, weights: &DVector<f64>) -> Result<()> {
        check_len(context, self.location_count(), weights.len())
    }
}

/// Builder that validates dimensions and signs before constructing [`SpatialData`].
#[derive(Debug)]
pub struct SpatialDataBuilder {
    costs: DMatrix<f64>,
    outputs: Option<DVector<f64>>,
}

impl SpatialDataBuilder {
    /// Start building from the pairwise cost matrix.
    pub fn new(costs: DMatrix<f64>) -> Self {
        Self {
            costs,
            outputs: None,
        }
    }

    /// Sets the origin outputs (`X`).
    pub fn outputs(mut self, outputs: DVector<f64>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    /// Sets every origin output to one, which turns flows into origin-level probabilities.
    pub fn unit_outputs(mut self) -> Self {
        self.outputs = Some(DVector::from_element(self.costs.nrows(), 1.0));
        self
    }

    /// Finalizes construction after validating shapes and rejecting negative or NaN entries.
    pub fn build(self) -> Result<SpatialData> {
        let n = self.costs.nrows();
        if n == 0 {
            return Err(BlvError::EmptyProblem);
        }
        if self.costs.ncols() != n {
            return Err(BlvError::dimension_mismatch(
                "cost matrix columns",
                n,
                self.costs.ncols(),
            ));
        }

        let outputs = self
            .outputs
            .ok_or_else(|| BlvError::dimension_mismatch("outputs length", n, 0))?;
        check_len("outputs length", n, outputs.len())?;

        // Row-major scan so the reported index reads as `row * n + column`.
        for (row_index, row) in self.costs.row_iter().enumerate() {
            for (column, cost) in row.iter().enumerate() {
                check_nonnegative("cost", row_index * n + column, *cost)?;
            }
        }
        for (index, output) in outputs.iter().enumerate() {
            check_nonnegative("output", index, *output)?;
        }

        Ok(SpatialData {
            costs: self.costs,
            outputs,
        })
    }
}

fn check_len(context: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(BlvError::dimension_mismatch(context, expected, found));
    }
    Ok(())
}

/// Rejects negative values and NaN; `+inf` passes (an infinite cost is an unreachable pair).
fn check_nonnegative(context: &'static str, index: usize, value: f64) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(BlvError::NegativeValue {
            context,
            index,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_and_constructs() {
        let costs = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
        let outputs = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let data = SpatialDataBuilder::new(costs)
            .outputs(outputs)
            .build()
            .expect("valid data");

        assert_eq!(data.location_count(), 3);
        assert_eq!(data.total_output(), 6.0);
        assert!(data
            .check_weights("weights", &DVector::from_element(3, 1.0))
            .is_ok());
    }

    #[test]
    fn builder_rejects_non_square_costs() {
        let costs = DMatrix::from_row_slice(2, 3, &[0.0, 1.0, 2.0, 1.0, 0.0, 1.0]);
        let result = SpatialData::new(costs, DVector::from_element(2, 1.0));
        assert!(matches!(
            result,
            Err(BlvError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_mismatched_outputs() {
        let costs = DMatrix::<f64>::zeros(2, 2);
        let result = SpatialData::new(costs, DVector::from_element(3, 1.0));
        assert!(matches!(result, Err(BlvError::DimensionMismatch { .. })));
    }

    #[test]
    fn builder_rejects_negative_cost() {
        let costs = DMatrix::from_row_slice(2, 2, &[0.0, -3.0, 1.0, 0.0]);
        let result = SpatialData::new(costs, DVector::from_element(2, 1.0));
        assert!(matches!(
            result,
            Err(BlvError::NegativeValue {
                context: "cost",
                index: 1,
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_negative_and_nan_outputs() {
        let costs = DMatrix::<f64>::zeros(2, 2);

        let negative = SpatialData::new(costs.clone(), DVector::from_vec(vec![-1.0, 1.0]));
        assert!(matches!(
            negative,
            Err(BlvError::NegativeValue {
                context: "output",
                index: 0,
                ..
            })
        ));

        let nan = SpatialData::new(costs, DVector::from_vec(vec![1.0, f64::NAN]));
        match nan {
            Err(BlvError::NegativeValue {
                context: "output",
                index: 1,
                value,
            }) => assert!(value.is_nan()),
            other => panic!("expected a rejected NaN output, got {other:?}"),
        }
    }

    #[test]
    fn infinite_cost_is_accepted() {
        let costs = DMatrix::from_row_slice(2, 2, &[0.0, f64::INFINITY, 1.0, 0.0]);
        assert!(SpatialData::new(costs, DVector::from_element(2, 1.0)).is_ok());
    }

    #[test]
    fn builder_rejects_empty_problem() {
        let result = SpatialData::new(DMatrix::zeros(0, 0), DVector::zeros(0));
        assert!(matches!(result, Err(BlvError::EmptyProblem)));
    }

    #[test]
    fn unit_outputs_fill_every_origin() {
        let data = SpatialDataBuilder::new(DMatrix::zeros(4, 4))
            .unit_outputs()
            .build()
            .unwrap();
        assert_eq!(data.outputs(), &DVector::from_element(4, 1.0));
    }

    #[test]
    fn weights_of_wrong_length_are_rejected() {
        let data = SpatialData::new(DMatrix::zeros(2, 2), DVector::from_element(2, 1.0)).unwrap();
        let result = data.check_weights("weights", &DVector::from_element(1, 1.0));
        assert!(matches!(
            result,
            Err(BlvError::DimensionMismatch {
                context: "weights",
                expected: 2,
                found: 1,
            })
        ));
    }
}
