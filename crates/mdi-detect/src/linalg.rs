// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Small dense helpers over row-major `d x d` matrices.

use mdi_core::MdiError;

/// Lower Cholesky factor of a symmetric positive definite matrix.
#[derive(Clone, Debug)]
pub(crate) struct Cholesky {
    lower: Vec<f64>,
    dim: usize,
}

impl Cholesky {
    pub(crate) fn factor(mut matrix: Vec<f64>, dim: usize) -> Result<Self, MdiError> {
        cholesky_in_place(&mut matrix, dim)?;
        Ok(Self { lower: matrix, dim })
    }

    /// `log |A|` from the factor diagonal.
    pub(crate) fn log_det(&self) -> f64 {
        2.0 * (0..self.dim)
            .map(|i| self.lower[i * self.dim + i].ln())
            .sum::<f64>()
    }

    /// `v^T A^{-1} v`.
    pub(crate) fn mahalanobis(&self, v: &[f64]) -> f64 {
        let y = self.forward_substitute(v);
        y.iter().map(|value| value * value).sum()
    }

    /// `trace(A^{-1} B)` for row-major `B`.
    pub(crate) fn trace_solve(&self, other: &[f64]) -> f64 {
        let dim = self.dim;
        let mut trace = 0.0;
        let mut column = vec![0.0; dim];
        for col in 0..dim {
            for row in 0..dim {
                column[row] = other[row * dim + col];
            }
            let solved = self.solve(&column);
            trace += solved[col];
        }
        trace
    }

    fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        let y = self.forward_substitute(rhs);
        let dim = self.dim;
        let mut x = vec![0.0; dim];
        for i in (0..dim).rev() {
            let mut sum = y[i];
            for k in i + 1..dim {
                sum -= self.lower[k * dim + i] * x[k];
            }
            x[i] = sum / self.lower[i * dim + i];
        }
        x
    }

    fn forward_substitute(&self, rhs: &[f64]) -> Vec<f64> {
        let dim = self.dim;
        let mut y = vec![0.0; dim];
        for i in 0..dim {
            let mut sum = rhs[i];
            for k in 0..i {
                sum -= self.lower[i * dim + k] * y[k];
            }
            y[i] = sum / self.lower[i * dim + i];
        }
        y
    }
}

fn cholesky_in_place(matrix: &mut [f64], n: usize) -> Result<(), MdiError> {
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i * n + j];
            for k in 0..j {
                sum -= matrix[i * n + k] * matrix[j * n + k];
            }

            if i == j {
                if !sum.is_finite() || sum <= 0.0 {
                    return Err(MdiError::numerical_issue(
                        "covariance is not positive definite",
                    ));
                }
                matrix[i * n + i] = sum.sqrt();
            } else {
                matrix[i * n + j] = sum / matrix[j * n + j];
            }
        }

        for j in i + 1..n {
            matrix[i * n + j] = 0.0;
        }
    }
    Ok(())
}
