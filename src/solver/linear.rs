use thiserror::Error;
use tracing::debug;

use crate::models::{Ingredient, Nutrient};
use crate::solver::config::SolverConfig;

/// Why a linear solution was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinearSolveError {
    #[error("equation {equation} residual {residual:e} exceeds tolerance {tolerance:e}")]
    Residual {
        equation: usize,
        residual: f64,
        tolerance: f64,
    },

    #[error("ingredient {index} would need a negative mass ({mass:.3})")]
    NegativeMass { index: usize, mass: f64 },

    #[error("system has no equations")]
    Empty,
}

/// Dense linear system `A·x = b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    coefficients: Vec<Vec<f64>>,
    rhs: Vec<f64>,
}

impl LinearSystem {
    pub fn new(coefficients: Vec<Vec<f64>>, rhs: Vec<f64>) -> Self {
        Self { coefficients, rhs }
    }

    /// Mass-balance system for a blend.
    ///
    /// Row 0 conserves mass, then one row per targeted nutrient. Filler rows
    /// (zero for already constrained ingredients, one for the rest, rhs 0)
    /// pad the system until it is square.
    pub fn for_blend(
        ingredients: &[Ingredient],
        targeted: &[(Nutrient, f64)],
        total_mass: f64,
    ) -> Self {
        let cols = ingredients.len();
        let mut coefficients = Vec::with_capacity(cols.max(targeted.len() + 1));
        let mut rhs = Vec::with_capacity(coefficients.capacity());

        coefficients.push(vec![1.0; cols]);
        rhs.push(total_mass);

        for &(nutrient, target) in targeted {
            coefficients.push(ingredients.iter().map(|i| i.fraction(nutrient) / 100.0).collect());
            rhs.push(target / 100.0 * total_mass);
        }

        while coefficients.len() < cols {
            let filled = coefficients.len();
            coefficients.push((0..cols).map(|j| if j < filled { 0.0 } else { 1.0 }).collect());
            rhs.push(0.0);
        }

        Self { coefficients, rhs }
    }

    pub fn rows(&self) -> usize {
        self.coefficients.len()
    }

    pub fn cols(&self) -> usize {
        self.coefficients.first().map(Vec::len).unwrap_or(0)
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Solve and validate.
    ///
    /// The result is either a non-negative mass vector or an error; a
    /// partially negative vector is never returned.
    pub fn solve(&self, config: &SolverConfig) -> Result<Vec<f64>, LinearSolveError> {
        if self.rows() == 0 || self.cols() == 0 {
            return Err(LinearSolveError::Empty);
        }
        let candidate = self.eliminate(config.pivot_epsilon);
        self.validate(candidate, config)
    }

    /// Gauss-Jordan elimination with partial pivoting.
    ///
    /// Columns whose best pivot is below `pivot_epsilon` are skipped and left
    /// undetermined; validation decides whether the result is usable.
    fn eliminate(&self, pivot_epsilon: f64) -> Vec<f64> {
        let n = self.rows();
        let m = self.cols();
        let mut a = self.coefficients.clone();
        let mut b = self.rhs.clone();

        for col in 0..n.min(m) {
            let mut pivot_row = col;
            for row in (col + 1)..n {
                if a[row][col].abs() > a[pivot_row][col].abs() {
                    pivot_row = row;
                }
            }
            a.swap(col, pivot_row);
            b.swap(col, pivot_row);

            let pivot = a[col][col];
            if pivot.abs() < pivot_epsilon {
                debug!(column = col, pivot, "singular dimension, skipping column");
                continue;
            }

            for k in col..m {
                a[col][k] /= pivot;
            }
            b[col] /= pivot;

            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in col..m {
                    a[row][k] -= factor * a[col][k];
                }
                b[row] -= factor * b[col];
            }
        }

        b.resize(m, 0.0);
        b
    }

    /// Check residuals against the original equations, then clean up the
    /// solution entries.
    fn validate(
        &self,
        mut solution: Vec<f64>,
        config: &SolverConfig,
    ) -> Result<Vec<f64>, LinearSolveError> {
        for (i, (row, &rhs)) in self.coefficients.iter().zip(&self.rhs).enumerate() {
            let reconstructed: f64 = row.iter().zip(&solution).map(|(a, x)| a * x).sum();
            let residual = (reconstructed - rhs).abs();
            let tolerance = config.residual_tolerance.max(config.residual_tolerance * rhs.abs());
            if !residual.is_finite() || residual > tolerance {
                return Err(LinearSolveError::Residual {
                    equation: i,
                    residual,
                    tolerance,
                });
            }
        }

        for (index, x) in solution.iter_mut().enumerate() {
            if *x < config.negative_tolerance {
                return Err(LinearSolveError::NegativeMass { index, mass: *x });
            }
            if *x < 0.0 || x.abs() < config.snap_to_zero {
                *x = 0.0;
            }
        }

        Ok(solution)
    }
}
