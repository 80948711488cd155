//! Matrix products, reductions and structural rearrangements
//!
//! Everything here is batched over leading dimensions. Factorizations live
//! in [`LinearAlgebraAlgorithms`](crate::algorithm::linalg::LinearAlgebraAlgorithms).

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Batched matrix product
pub trait MatmulOps<R: Runtime> {
    /// `[..., m, k] @ [..., k, n] -> [..., m, n]`
    ///
    /// Batch dimensions broadcast, so a rank-2 operand is shared across the
    /// other's batch.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` on rank below two or differing inner dimensions,
    /// `DTypeMismatch` on mixed dtypes.
    fn matmul(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
}

/// Summation
pub trait ReduceOps<R: Runtime> {
    /// Sum over `dims`, dropping them unless `keepdim`
    ///
    /// An empty `dims` copies the input.
    fn sum(&self, a: &Tensor<R>, dims: &[usize], keepdim: bool) -> Result<Tensor<R>>;
}

/// Diagonals and Kronecker products
pub trait LinalgOps<R: Runtime> {
    /// `[..., n, n] -> [..., n]`
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the trailing matrix is not square.
    fn diag(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// `[..., n] -> [..., n, n]` with zeros off the diagonal
    fn diag_embed(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// `[..., p, q] ⊗ [..., r, s] -> [..., p·r, q·s]`
    ///
    /// ```text
    /// (A ⊗ B)[i·r + k, j·s + l] = A[i, j] · B[k, l]
    /// ```
    ///
    /// The two batch shapes must be equal.
    ///
    /// ```
    /// # use linopr::prelude::*;
    /// # let device = CpuDevice::new();
    /// # let client = CpuRuntime::default_client(&device);
    /// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
    /// let k = client.kron(&a, &client.eye(2, DType::F64)?)?;
    /// assert_eq!(k.shape(), &[4, 4]);
    /// assert_eq!(k.to_vec::<f64>()[..4], [1.0, 0.0, 2.0, 0.0]);
    /// # Ok::<(), linopr::error::Error>(())
    /// ```
    fn kron(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
}
