//! Dense factorizations
//!
//! [`LinearAlgebraAlgorithms`] is what a runtime client must provide for the
//! operator layer: Cholesky, triangular solves and a symmetric
//! eigendecomposition. `helpers` holds the shape and dtype checks the
//! backends share.

mod helpers;

pub use helpers::*;

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// `A = L Lᵀ`
#[derive(Clone, Debug)]
pub struct CholeskyDecomposition<R: Runtime> {
    /// Lower triangular `[..., n, n]`, zeros above the diagonal
    pub l: Tensor<R>,
}

/// `A = V diag(λ) Vᵀ` for symmetric `A`
///
/// `V` is orthogonal and column `i` of `V` pairs with `λ[i]`.
#[derive(Clone, Debug)]
pub struct EigenDecomposition<R: Runtime> {
    /// `[..., n]`
    pub eigenvalues: Tensor<R>,
    /// `[..., n, n]`
    pub eigenvectors: Tensor<R>,
}

/// Factorizations a backend provides
///
/// Inputs carry an arbitrary leading batch `[..., n, n]`, factored one
/// matrix at a time. Half-precision inputs are factored in F32 and the
/// results cast back.
pub trait LinearAlgebraAlgorithms<R: Runtime> {
    /// Cholesky factor of a symmetric positive definite matrix
    ///
    /// Only the lower triangle of `a` is read.
    ///
    /// # Errors
    ///
    /// `NotPositiveDefinite` when a pivot is not strictly positive.
    fn cholesky_decompose(&self, a: &Tensor<R>) -> Result<CholeskyDecomposition<R>>;

    /// Forward substitution for `L x = b`
    ///
    /// `b` is `[..., n, k]` with the same batch as `l`. With `unit_diagonal`
    /// the diagonal of `l` is taken to be all ones.
    fn solve_triangular_lower(
        &self,
        l: &Tensor<R>,
        b: &Tensor<R>,
        unit_diagonal: bool,
    ) -> Result<Tensor<R>>;

    /// Back substitution for `U x = b`
    fn solve_triangular_upper(&self, u: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Symmetric eigendecomposition by cyclic Jacobi rotations
    ///
    /// At most 30 sweeps, stopping once every off-diagonal entry is below
    /// `n · ε · ‖A‖_F`. Eigenvalues come out ordered by decreasing magnitude
    /// with the eigenvector columns permuted to match.
    fn eig_decompose_symmetric(&self, a: &Tensor<R>) -> Result<EigenDecomposition<R>>;
}
