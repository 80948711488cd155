//! CPU implementation of linear algebra algorithms
//!
//! Implements [`LinearAlgebraAlgorithms`] for [`CpuClient`] plus the
//! structural kernels behind [`LinalgOps`](crate::ops::LinalgOps). Batched
//! inputs are processed one matrix at a time.

mod cholesky;
mod eig_symmetric;
mod structure;
mod triangular;

pub(crate) use structure::{diag_embed_impl, diag_impl, kron_impl};

use super::{CpuClient, CpuRuntime, CpuTensor};
use crate::algorithm::linalg::{CholeskyDecomposition, EigenDecomposition, LinearAlgebraAlgorithms};
use crate::dtype::Element;
use crate::error::Result;

/// Element types the decompositions compute in (F32 and F64)
///
/// Reduced-precision inputs are promoted to F32 before reaching these kernels.
pub trait LinalgElement: Element {
    /// Machine epsilon for this type
    fn epsilon_val() -> f64;
    /// Absolute value
    fn abs_val(self) -> Self;
    /// Square root
    fn sqrt_val(self) -> Self;
}

impl LinalgElement for f32 {
    #[inline]
    fn epsilon_val() -> f64 {
        f32::EPSILON as f64
    }
    #[inline]
    fn abs_val(self) -> Self {
        self.abs()
    }
    #[inline]
    fn sqrt_val(self) -> Self {
        self.sqrt()
    }
}

impl LinalgElement for f64 {
    #[inline]
    fn epsilon_val() -> f64 {
        f64::EPSILON
    }
    #[inline]
    fn abs_val(self) -> Self {
        self.abs()
    }
    #[inline]
    fn sqrt_val(self) -> Self {
        self.sqrt()
    }
}

impl LinearAlgebraAlgorithms<CpuRuntime> for CpuClient {
    fn cholesky_decompose(
        &self,
        a: &CpuTensor,
    ) -> Result<CholeskyDecomposition<CpuRuntime>> {
        cholesky::cholesky_decompose_impl(self, a)
    }

    fn solve_triangular_lower(
        &self,
        l: &CpuTensor,
        b: &CpuTensor,
        unit_diagonal: bool,
    ) -> Result<CpuTensor> {
        triangular::solve_triangular_impl(self, l, b, triangular::Triangle::Lower { unit_diagonal })
    }

    fn solve_triangular_upper(
        &self,
        u: &CpuTensor,
        b: &CpuTensor,
    ) -> Result<CpuTensor> {
        triangular::solve_triangular_impl(self, u, b, triangular::Triangle::Upper)
    }

    fn eig_decompose_symmetric(
        &self,
        a: &CpuTensor,
    ) -> Result<EigenDecomposition<CpuRuntime>> {
        eig_symmetric::eig_decompose_symmetric_impl(self, a)
    }
}
