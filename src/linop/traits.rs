//! The linear operator contract

use std::fmt;

use super::diag::DiagOperator;
use super::helpers::{
    cholesky_logdet, cholesky_solve, eig_root, inv_quad_logdet_impl, restore_vector, rhs_as_matrix,
};
use super::root::RootOperator;
use super::types::InvQuadLogdet;
use crate::algorithm::linalg::{EigenDecomposition, LinearAlgebraAlgorithms};
use crate::dtype::DType;
use crate::error::Result;
use crate::ops::LinalgOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// A square matrix `[..batch, n, n]` known through its action
///
/// Implementors supply `matmul` and `to_dense`; everything else has a dense
/// fallback that structured operators override. Right-hand sides are
/// `[..., n]` vectors or `[..., n, k]` matrices, with batch dimensions
/// broadcast against the operator's.
///
/// The trait is object safe: heterogeneous operators compose as
/// `Arc<dyn LinearOperator<R>>`.
pub trait LinearOperator<R: Runtime>: Send + Sync + fmt::Debug {
    /// Full shape `[..batch, n, n]`
    fn shape(&self) -> &[usize];

    /// Element type
    fn dtype(&self) -> DType;

    /// Device holding the operator's data
    fn device(&self) -> &R::Device;

    /// `A @ rhs`
    fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>>;

    /// Materialize `A` as a `[..batch, n, n]` tensor
    fn to_dense(&self, client: &R::Client) -> Result<Tensor<R>>;

    /// Matrix dimension `n`
    fn size(&self) -> usize {
        let shape = self.shape();
        shape[shape.len() - 1]
    }

    /// Leading batch dimensions
    fn batch_shape(&self) -> &[usize] {
        let shape = self.shape();
        &shape[..shape.len() - 2]
    }

    /// Main diagonal `[..batch, n]`
    fn diagonal(&self, client: &R::Client) -> Result<Tensor<R>> {
        client.diag(&self.to_dense(client)?)
    }

    /// Symmetric eigendecomposition `A = Q diag(λ) Qᵀ`
    fn symeig(&self, client: &R::Client) -> Result<EigenDecomposition<R>> {
        client.eig_decompose_symmetric(&self.to_dense(client)?)
    }

    /// Capability query: `Some` when this operator is diagonal
    fn as_diag(&self) -> Option<&DiagOperator<R>> {
        None
    }

    /// `A⁻¹ rhs`
    ///
    /// # Errors
    ///
    /// - `NotPositiveDefinite` if the dense Cholesky factorization fails
    fn solve(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let (rhs, is_vector) = rhs_as_matrix(self.shape(), rhs)?;
        let x = cholesky_solve(client, &self.to_dense(client)?, &rhs)?;
        Ok(restore_vector(x, is_vector))
    }

    /// `log |A|`, shape `[..batch]`
    fn logdet(&self, client: &R::Client) -> Result<Tensor<R>> {
        cholesky_logdet(client, &self.to_dense(client)?)
    }

    /// Inverse quadratic form `Σ_rows rhs ∘ A⁻¹ rhs` and/or `log |A|`
    ///
    /// The quadratic term is `[..., k]`, summed over `k` when
    /// `reduce_inv_quad`. The log-determinant is computed for
    /// `logdet == Some(true)`.
    fn inv_quad_logdet(
        &self,
        client: &R::Client,
        inv_quad_rhs: Option<&Tensor<R>>,
        logdet: Option<bool>,
        reduce_inv_quad: bool,
    ) -> Result<InvQuadLogdet<R>> {
        let solve = |rhs: &Tensor<R>| self.solve(client, rhs);
        inv_quad_logdet_impl(self, client, inv_quad_rhs, logdet, reduce_inv_quad, &solve)
    }

    /// `R` with `R Rᵀ = A`
    fn root_decomposition(&self, client: &R::Client) -> Result<RootOperator<R>> {
        eig_root(self, client, false)
    }

    /// `R` with `R Rᵀ = A⁻¹`
    ///
    /// `initial_vectors` seeds iterative methods; the eigendecomposition
    /// path does not use it.
    fn root_inv_decomposition(
        &self,
        client: &R::Client,
        initial_vectors: Option<&Tensor<R>>,
    ) -> Result<RootOperator<R>> {
        let _ = initial_vectors;
        eig_root(self, client, true)
    }
}
