//! Kronecker product of square operators

use std::sync::Arc;

use super::helpers::{restore_vector, rhs_as_matrix, with_dims};
use super::traits::LinearOperator;
use crate::algorithm::linalg::EigenDecomposition;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::LinalgOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// `A_1 ⊗ A_2 ⊗ ... ⊗ A_m` for square factors sharing a batch shape
///
/// The product is never formed for `matmul` or `symeig`: both work factor
/// by factor, so an `N = Π n_i` operator costs `O(N · Σ n_i)` per column to
/// apply and `O(Σ n_i³)` to diagonalize.
#[derive(Clone, Debug)]
pub struct KroneckerProductOperator<R: Runtime> {
    factors: Vec<Arc<dyn LinearOperator<R>>>,
    shape: Vec<usize>,
    dtype: DType,
}

impl<R: Runtime> KroneckerProductOperator<R> {
    /// Build from one or more factors
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty factor list or a zero-sized factor
    /// - `ShapeMismatch` if a factor is not square or batch shapes differ
    /// - `DTypeMismatch` if factor dtypes differ
    pub fn new(factors: Vec<Arc<dyn LinearOperator<R>>>) -> Result<Self> {
        let first = factors
            .first()
            .ok_or_else(|| Error::invalid_argument("factors", "at least one factor required"))?;
        let batch = first.batch_shape().to_vec();
        let dtype = first.dtype();

        let mut n = 1usize;
        for factor in &factors {
            let shape = factor.shape();
            if shape.len() < 2 || shape[shape.len() - 1] != shape[shape.len() - 2] {
                let side = shape.last().copied().unwrap_or(0);
                return Err(Error::shape_mismatch(&with_dims(&batch, &[side, side]), shape));
            }
            if factor.batch_shape() != batch.as_slice() {
                let side = factor.size();
                return Err(Error::shape_mismatch(&with_dims(&batch, &[side, side]), shape));
            }
            if factor.dtype() != dtype {
                return Err(Error::DTypeMismatch {
                    lhs: dtype,
                    rhs: factor.dtype(),
                });
            }
            if factor.size() == 0 {
                return Err(Error::invalid_argument("factors", "factors must be non-empty"));
            }
            n *= factor.size();
        }

        let shape = with_dims(&batch, &[n, n]);
        tracing::debug!(factors = factors.len(), shape = ?shape, %dtype, "kronecker product operator");
        Ok(Self {
            factors,
            shape,
            dtype,
        })
    }

    /// The factors, outermost first
    pub fn factors(&self) -> &[Arc<dyn LinearOperator<R>>] {
        &self.factors
    }
}

/// Fold `kron` over per-factor matrices
fn kron_all<R, F>(client: &R::Client, factors: &[Arc<dyn LinearOperator<R>>], mut get: F) -> Result<Tensor<R>>
where
    R: Runtime,
    F: FnMut(&dyn LinearOperator<R>) -> Result<Tensor<R>>,
{
    let mut iter = factors.iter();
    let first = iter
        .next()
        .ok_or_else(|| Error::Internal("kronecker product without factors".into()))?;
    let mut acc = get(first.as_ref())?;
    for factor in iter {
        acc = client.kron(&acc, &get(factor.as_ref())?)?;
    }
    Ok(acc)
}

/// Fold `kron` over per-factor vectors, treated as single columns
fn kron_all_vectors<R, F>(client: &R::Client, factors: &[Arc<dyn LinearOperator<R>>], mut get: F) -> Result<Tensor<R>>
where
    R: Runtime,
    F: FnMut(&dyn LinearOperator<R>) -> Result<Tensor<R>>,
{
    let column = kron_all(client, factors, |f| get(f)?.unsqueeze(-1))?;
    Ok(column.squeeze(Some(-1)))
}

impl<R: Runtime> LinearOperator<R> for KroneckerProductOperator<R> {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn device(&self) -> &R::Device {
        self.factors[0].device()
    }

    /// Applies one factor at a time
    ///
    /// With rows indexed `(i_1, ..., i_m)`, each step views the right-hand
    /// side as `[n_j, rest]`, applies factor `j` to the leading index, and
    /// rotates that index to the back. After `m` steps the row order is
    /// restored.
    fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let (rhs, is_vector) = rhs_as_matrix(&self.shape, rhs)?;
        let n = self.size();
        let k = rhs.shape()[rhs.ndim() - 1];
        let batch = rhs.shape()[..rhs.ndim() - 2].to_vec();
        if k == 0 {
            return Ok(restore_vector(rhs, is_vector));
        }

        let mut res = rhs;
        for factor in &self.factors {
            let n_j = factor.size();
            let rest = n * k / n_j;
            let view = res.reshape(&with_dims(&batch, &[n_j, rest]))?;
            let applied = factor.matmul(client, &view)?;
            res = applied
                .reshape(&with_dims(&batch, &[n_j, rest / k, k]))?
                .transpose(-3, -2)?
                .reshape(&with_dims(&batch, &[n, k]))?;
        }
        Ok(restore_vector(res, is_vector))
    }

    fn to_dense(&self, client: &R::Client) -> Result<Tensor<R>> {
        kron_all(client, &self.factors, |f| f.to_dense(client))
    }

    fn diagonal(&self, client: &R::Client) -> Result<Tensor<R>> {
        kron_all_vectors(client, &self.factors, |f| f.diagonal(client))
    }

    /// Eigenpairs of a Kronecker product are products of factor eigenpairs
    fn symeig(&self, client: &R::Client) -> Result<EigenDecomposition<R>> {
        let eigs = self
            .factors
            .iter()
            .map(|f| f.symeig(client))
            .collect::<Result<Vec<_>>>()?;

        let mut values = eigs.iter();
        let eigenvalues = kron_all_vectors(client, &self.factors, |_| {
            values
                .next()
                .map(|e| e.eigenvalues.clone())
                .ok_or_else(|| Error::Internal("missing factor eigenvalues".into()))
        })?;
        let mut vectors = eigs.iter();
        let eigenvectors = kron_all(client, &self.factors, |_| {
            vectors
                .next()
                .map(|e| e.eigenvectors.clone())
                .ok_or_else(|| Error::Internal("missing factor eigenvectors".into()))
        })?;

        Ok(EigenDecomposition {
            eigenvalues,
            eigenvectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linop::{DenseOperator, DiagOperator};
    use crate::ops::{BinaryOps, MatmulOps};
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn dense(data: &[f64], n: usize, device: &CpuDevice) -> Arc<dyn LinearOperator<CpuRuntime>> {
        Arc::new(DenseOperator::new(Tensor::<CpuRuntime>::from_slice(data, &[n, n], device)).unwrap())
    }

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < tol, "{x} vs {y}");
        }
    }

    #[test]
    fn test_kron_matmul_matches_dense() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let a = dense(&[2.0, 1.0, 1.0, 3.0], 2, &device);
        let b = dense(&[4.0, 1.0, 0.0, 1.0, 5.0, 2.0, 0.0, 2.0, 6.0], 3, &device);
        let op = KroneckerProductOperator::new(vec![a, b]).unwrap();
        assert_eq!(op.shape(), &[6, 6]);

        let x_data: Vec<f64> = (0..12).map(|i| i as f64 * 0.5 - 2.0).collect();
        let x = Tensor::<CpuRuntime>::from_slice(&x_data, &[6, 2], &device);

        let lazy = op.matmul(&client, &x).unwrap();
        let full = client.matmul(&op.to_dense(&client).unwrap(), &x).unwrap();
        assert_close(&lazy.to_vec::<f64>(), &full.to_vec::<f64>(), 1e-12);
    }

    #[test]
    fn test_kron_three_factors_vector() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let a = dense(&[1.0, 2.0, 2.0, 1.0], 2, &device);
        let b = dense(&[3.0, 0.5, 0.5, 1.0], 2, &device);
        let c: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(
            DiagOperator::new(Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device)).unwrap(),
        );
        let op = KroneckerProductOperator::new(vec![a, b, c]).unwrap();

        let x_data: Vec<f64> = (0..12).map(|i| (i as f64).sin()).collect();
        let x = Tensor::<CpuRuntime>::from_slice(&x_data, &[12], &device);
        let lazy = op.matmul(&client, &x).unwrap();
        assert_eq!(lazy.shape(), &[12]);
        let full = client
            .matmul(&op.to_dense(&client).unwrap(), &x.unsqueeze(-1).unwrap())
            .unwrap();
        assert_close(&lazy.to_vec::<f64>(), &full.to_vec::<f64>(), 1e-12);

        let diag = op.diagonal(&client).unwrap();
        let dense_diag = client.diag(&op.to_dense(&client).unwrap()).unwrap();
        assert_close(&diag.to_vec::<f64>(), &dense_diag.to_vec::<f64>(), 1e-12);
    }

    #[test]
    fn test_kron_symeig_reconstructs() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let a = dense(&[2.0, 1.0, 1.0, 3.0], 2, &device);
        let b = dense(&[4.0, 1.0, 1.0, 2.0], 2, &device);
        let op = KroneckerProductOperator::new(vec![a, b]).unwrap();

        let eig = op.symeig(&client).unwrap();
        assert_eq!(eig.eigenvalues.shape(), &[4]);
        assert_eq!(eig.eigenvectors.shape(), &[4, 4]);

        let q = &eig.eigenvectors;
        let scaled = client.mul(q, &eig.eigenvalues.unsqueeze(-2).unwrap()).unwrap();
        let rebuilt = client.matmul(&scaled, &q.transpose(-2, -1).unwrap()).unwrap();
        assert_close(
            &rebuilt.to_vec::<f64>(),
            &op.to_dense(&client).unwrap().to_vec::<f64>(),
            1e-10,
        );
    }

    #[test]
    fn test_kron_validation() {
        let device = CpuDevice::new();
        assert!(matches!(
            KroneckerProductOperator::<CpuRuntime>::new(vec![]),
            Err(Error::InvalidArgument { .. })
        ));

        let f64_op = dense(&[1.0, 0.0, 0.0, 1.0], 2, &device);
        let f32_op: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(
            DenseOperator::new(Tensor::<CpuRuntime>::from_slice(&[1.0f32, 0.0, 0.0, 1.0], &[2, 2], &device))
                .unwrap(),
        );
        assert!(matches!(
            KroneckerProductOperator::new(vec![f64_op.clone(), f32_op]),
            Err(Error::DTypeMismatch { .. })
        ));

        let batched: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(
            DenseOperator::new(Tensor::<CpuRuntime>::zeros(&[3, 2, 2], DType::F64, &device)).unwrap(),
        );
        assert!(matches!(
            KroneckerProductOperator::new(vec![f64_op, batched]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_batched_kron_matmul() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let a_data = [2.0f64, 1.0, 1.0, 3.0, 1.0, 0.0, 0.0, 2.0];
        let b_data = [1.0f64, 0.5, 0.5, 1.0, 3.0, 1.0, 1.0, 3.0];
        let a: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(
            DenseOperator::new(Tensor::<CpuRuntime>::from_slice(&a_data, &[2, 2, 2], &device)).unwrap(),
        );
        let b: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(
            DenseOperator::new(Tensor::<CpuRuntime>::from_slice(&b_data, &[2, 2, 2], &device)).unwrap(),
        );
        let op = KroneckerProductOperator::new(vec![a, b]).unwrap();
        assert_eq!(op.shape(), &[2, 4, 4]);

        let x_data: Vec<f64> = (0..8).map(|i| i as f64 - 3.0).collect();
        let x = Tensor::<CpuRuntime>::from_slice(&x_data, &[2, 4], &device);
        let lazy = op.matmul(&client, &x).unwrap();
        assert_eq!(lazy.shape(), &[2, 4]);
        let full = client
            .matmul(&op.to_dense(&client).unwrap(), &x.unsqueeze(-1).unwrap())
            .unwrap();
        assert_close(&lazy.to_vec::<f64>(), &full.to_vec::<f64>(), 1e-12);
    }
}
