//! Solver configuration and result types

use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Configuration options for Conjugate Gradient solver
#[derive(Debug, Clone, Copy)]
pub struct CgOptions {
    /// Maximum number of iterations (default: 1000)
    pub max_iter: usize,
    /// Relative tolerance on `‖r‖ / ‖b‖` per column (default: 1e-10)
    ///
    /// Raised to `10 · ε(dtype)` when smaller, so reduced precision still terminates.
    pub rtol: f64,
    /// Absolute tolerance on `‖r‖` per column (default: 1e-14)
    pub atol: f64,
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            rtol: 1e-10,
            atol: 1e-14,
        }
    }
}

impl CgOptions {
    /// Set the maximum number of iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the relative tolerance
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }
}

/// Result of Conjugate Gradient solver
#[derive(Debug, Clone)]
pub struct CgResult<R: Runtime> {
    /// Solution x such that Ax ≈ b, same shape as b
    pub solution: Tensor<R>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Largest per-column residual norm ‖b - Ax‖ at exit
    pub residual_norm: f64,
    /// Whether every column converged within tolerance
    pub converged: bool,
}
