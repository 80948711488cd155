//! Kronecker product plus diagonal, solved through the eigendecomposition

use std::sync::Arc;

use super::added_diag::AddedDiagOperator;
use super::diag::DiagOperator;
use super::helpers::{restore_vector, rhs_as_matrix};
use super::root::RootOperator;
use super::traits::LinearOperator;
use super::types::{AddedDiagOptions, InvQuadLogdet, Preconditioner};
use crate::algorithm::linalg::EigenDecomposition;
use crate::dtype::DType;
use crate::error::Result;
use crate::ops::{BinaryOps, MatmulOps, ReduceOps, TypeConversionOps, UnaryOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// `K + D` where `K` is Kronecker-structured and `D` is diagonal
///
/// With `K = Q diag(λ) Qᵀ`, a diagonal `D` that is constant along the
/// Kronecker structure shares the eigenvectors `Q`, so
///
/// ```text
/// K + D = Q diag(λ + d) Qᵀ
/// ```
///
/// Solves, log-determinants and roots then only need the factor-wise
/// eigendecomposition of `K`. A diagonal that varies along the structure
/// breaks this identity and gives wrong results.
///
/// The eigendecomposition is recomputed on every call.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use linopr::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
///
/// let k = Tensor::<CpuRuntime>::from_slice(&[2.0f64, 0.0, 0.0, 3.0], &[2, 2], &device);
/// let kron = KroneckerProductOperator::new(vec![
///     Arc::new(DenseOperator::new(k)?) as Arc<dyn LinearOperator<CpuRuntime>>,
/// ])?;
/// let noise = DiagOperator::<CpuRuntime>::constant(1.0, 2, DType::F64, &device)?;
/// let components: Vec<Arc<dyn LinearOperator<CpuRuntime>>> = vec![Arc::new(noise), Arc::new(kron)];
/// let op = KroneckerProductAddedDiagOperator::new(components, None)?;
///
/// let rhs = Tensor::<CpuRuntime>::from_slice(&[3.0f64, 4.0], &[2], &device);
/// let x = op.solve(&client, &rhs)?;
/// let x = x.to_vec::<f64>();
/// assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 1.0).abs() < 1e-12);
/// # Ok::<(), linopr::error::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct KroneckerProductAddedDiagOperator<R: Runtime> {
    base: AddedDiagOperator<R>,
}

impl<R: Runtime> KroneckerProductAddedDiagOperator<R> {
    /// Build from a structured operator and a diagonal, in either order
    ///
    /// # Errors
    ///
    /// - `ComponentCount` unless exactly two components are given
    /// - `DiagonalComponent` unless exactly one component is diagonal
    /// - `ShapeMismatch` / `DTypeMismatch` if the components disagree
    pub fn new(
        components: Vec<Arc<dyn LinearOperator<R>>>,
        preconditioner_override: Option<Preconditioner<R>>,
    ) -> Result<Self> {
        let base = AddedDiagOperator::new(components, preconditioner_override, AddedDiagOptions::default())?;
        Ok(Self { base })
    }

    /// The diagonal component `D`
    pub fn diag_operator(&self) -> &DiagOperator<R> {
        self.base.diag_operator()
    }

    /// The Kronecker-structured component `K`
    pub fn structured_operator(&self) -> &Arc<dyn LinearOperator<R>> {
        self.base.operator()
    }

    /// The generic added-diagonal operator this one specializes
    pub fn base(&self) -> &AddedDiagOperator<R> {
        &self.base
    }

    /// Always [`Preconditioner::none`]: solves never iterate
    pub fn preconditioner(&self) -> Preconditioner<R> {
        Preconditioner::none()
    }

    /// `(K + D)⁻¹ rhs = Q D'^{-1/2} (D'^{-1/2} (Qᵀ rhs))` with `D' = λ + d`
    ///
    /// Computed in F64 and cast back to the dtype of `rhs`. The
    /// preconditioner and `num_tridiag` are accepted for interface parity
    /// and ignored.
    pub fn solve_with(
        &self,
        client: &R::Client,
        rhs: &Tensor<R>,
        preconditioner: Option<&Preconditioner<R>>,
        num_tridiag: usize,
    ) -> Result<Tensor<R>> {
        let _ = (preconditioner, num_tridiag);
        let rhs_dtype = rhs.dtype();
        let (rhs, is_vector) = rhs_as_matrix(self.shape(), rhs)?;
        let (q, shifted) = self.shifted_eigensystem(client, DType::F64)?;
        let rhs = client.cast(&rhs, DType::F64)?;

        let inv_sqrt = client.recip(&client.sqrt(&shifted)?)?.unsqueeze(-1)?;
        let projected = client.matmul(&q.transpose(-2, -1)?, &rhs)?;
        let half = client.mul(&inv_sqrt, &projected)?;
        let scaled = client.mul(&inv_sqrt, &half)?;
        let res = client.matmul(&q, &scaled)?;

        tracing::debug!(shape = ?self.shape(), dtype = %rhs_dtype, "kronecker-plus-diagonal solve");
        Ok(restore_vector(client.cast(&res, rhs_dtype)?, is_vector))
    }

    /// Eigenvectors `Q` of `K` and shifted eigenvalues `λ + d`, both in `dtype`
    ///
    /// The eigenpairs and the diagonal are cast before the shift is added.
    fn shifted_eigensystem(
        &self,
        client: &R::Client,
        dtype: DType,
    ) -> Result<(Tensor<R>, Tensor<R>)> {
        let eig = self.structured_operator().symeig(client)?;
        let q = client.cast(&eig.eigenvectors, dtype)?;
        let lambda = client.cast(&eig.eigenvalues, dtype)?;
        let d = client.cast(self.diag_operator().diag(), dtype)?;
        Ok((q, client.add(&lambda, &d)?))
    }
}

impl<R: Runtime> LinearOperator<R> for KroneckerProductAddedDiagOperator<R> {
    fn shape(&self) -> &[usize] {
        self.base.shape()
    }

    fn dtype(&self) -> DType {
        self.base.dtype()
    }

    fn device(&self) -> &R::Device {
        self.base.device()
    }

    fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        self.base.matmul(client, rhs)
    }

    fn to_dense(&self, client: &R::Client) -> Result<Tensor<R>> {
        self.base.to_dense(client)
    }

    fn diagonal(&self, client: &R::Client) -> Result<Tensor<R>> {
        self.base.diagonal(client)
    }

    fn symeig(&self, client: &R::Client) -> Result<EigenDecomposition<R>> {
        let (eigenvectors, eigenvalues) = self.shifted_eigensystem(client, self.dtype())?;
        Ok(EigenDecomposition {
            eigenvalues,
            eigenvectors,
        })
    }

    fn solve(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        self.solve_with(client, rhs, None, 0)
    }

    /// `Σ log(λ_i + d_i)` over the last dimension
    ///
    /// Non-positive `λ_i + d_i` produce NaN or `-inf`.
    fn logdet(&self, client: &R::Client) -> Result<Tensor<R>> {
        let (_, shifted) = self.shifted_eigensystem(client, self.dtype())?;
        let logs = client.log(&shifted)?;
        tracing::debug!(shape = ?self.shape(), dtype = %shifted.dtype(), "kronecker-plus-diagonal logdet");
        client.sum(&logs, &[logs.ndim() - 1], false)
    }

    /// The log-determinant is computed whenever `logdet` is `Some`, including
    /// `Some(false)`. The quadratic term goes through the generic
    /// computation with [`solve_with`](KroneckerProductAddedDiagOperator::solve_with)
    /// as the solver.
    fn inv_quad_logdet(
        &self,
        client: &R::Client,
        inv_quad_rhs: Option<&Tensor<R>>,
        logdet: Option<bool>,
        reduce_inv_quad: bool,
    ) -> Result<InvQuadLogdet<R>> {
        let inv_quad = match inv_quad_rhs {
            Some(rhs) => {
                let solve = |r: &Tensor<R>| self.solve_with(client, r, None, 0);
                self.base
                    .inv_quad_logdet_with(client, Some(rhs), Some(false), reduce_inv_quad, &solve)?
                    .inv_quad
            }
            None => None,
        };
        let logdet = match logdet {
            Some(_) => Some(self.logdet(client)?),
            None => None,
        };
        Ok(InvQuadLogdet { inv_quad, logdet })
    }

    /// `Q · diag(√(λ + d))`
    fn root_decomposition(&self, client: &R::Client) -> Result<RootOperator<R>> {
        let (q, shifted) = self.shifted_eigensystem(client, self.dtype())?;
        tracing::debug!(shape = ?self.shape(), "kronecker-plus-diagonal root");
        RootOperator::new(q, client.sqrt(&shifted)?)
    }

    /// `Q · diag((λ + d)^{-1/2})`; `initial_vectors` is not used
    fn root_inv_decomposition(
        &self,
        client: &R::Client,
        _initial_vectors: Option<&Tensor<R>>,
    ) -> Result<RootOperator<R>> {
        let (q, shifted) = self.shifted_eigensystem(client, self.dtype())?;
        tracing::debug!(shape = ?self.shape(), "kronecker-plus-diagonal inverse root");
        RootOperator::new(q, client.recip(&client.sqrt(&shifted)?)?)
    }
}
