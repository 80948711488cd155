//! Shared shape handling and dense fallbacks for operators

use super::root::RootOperator;
use super::traits::LinearOperator;
use super::types::InvQuadLogdet;
use crate::algorithm::linalg::LinearAlgebraAlgorithms;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, LinalgOps, ReduceOps, UnaryOps};
use crate::runtime::Runtime;
use crate::tensor::{Tensor, broadcast_shapes};

/// `batch ++ tail`
pub(crate) fn with_dims(batch: &[usize], tail: &[usize]) -> Vec<usize> {
    let mut shape = Vec::with_capacity(batch.len() + tail.len());
    shape.extend_from_slice(batch);
    shape.extend_from_slice(tail);
    shape
}

/// Bring a right-hand side into `[..batch, n, k]` form for an operator of `op_shape`
///
/// A right-hand side with one dimension, or one dimension fewer than the
/// operator, is a (batched) vector and gains a trailing unit column. Batch
/// dimensions are broadcast against the operator's. The flag reports whether
/// the column was added, for [`restore_vector`].
pub(crate) fn rhs_as_matrix<R: Runtime>(
    op_shape: &[usize],
    rhs: &Tensor<R>,
) -> Result<(Tensor<R>, bool)> {
    let op_ndim = op_shape.len();
    if op_ndim < 2 {
        return Err(Error::invalid_argument(
            "operator",
            "operators need at least two dimensions",
        ));
    }
    let n = op_shape[op_ndim - 1];

    let is_vector = rhs.ndim() == 1 || rhs.ndim() + 1 == op_ndim;
    let mat = if is_vector {
        rhs.unsqueeze(-1)?
    } else {
        rhs.clone()
    };
    if mat.ndim() < 2 || mat.shape()[mat.ndim() - 2] != n {
        return Err(Error::shape_mismatch(op_shape, rhs.shape()));
    }

    let k = mat.shape()[mat.ndim() - 1];
    let op_batch = &op_shape[..op_ndim - 2];
    let rhs_batch = &mat.shape()[..mat.ndim() - 2];
    let batch =
        broadcast_shapes(op_batch, rhs_batch).ok_or_else(|| Error::broadcast(op_shape, rhs.shape()))?;
    if batch.as_slice() == rhs_batch {
        return Ok((mat, is_vector));
    }
    let mat = mat.broadcast_to(&with_dims(&batch, &[n, k]))?;
    Ok((mat, is_vector))
}

/// Undo the unit column added by [`rhs_as_matrix`]
pub(crate) fn restore_vector<R: Runtime>(t: Tensor<R>, is_vector: bool) -> Tensor<R> {
    if is_vector { t.squeeze(Some(-1)) } else { t }
}

/// Broadcast a `[..., n, n]` matrix to the batch of `like: [..., n, k]`
fn match_batch<R: Runtime>(a: &Tensor<R>, like: &Tensor<R>) -> Result<Tensor<R>> {
    let batch = &like.shape()[..like.ndim() - 2];
    if &a.shape()[..a.ndim() - 2] == batch {
        return Ok(a.clone());
    }
    let tail = &a.shape()[a.ndim() - 2..];
    Ok(a.broadcast_to(&with_dims(batch, tail))?.contiguous())
}

/// Solve `A X = B` through a Cholesky factorization of the dense `a`
///
/// `b` must already be in [`rhs_as_matrix`] form.
pub(crate) fn cholesky_solve<R: Runtime>(
    client: &R::Client,
    a: &Tensor<R>,
    b: &Tensor<R>,
) -> Result<Tensor<R>> {
    let a = match_batch(a, b)?;
    let b = b.contiguous();
    let chol = client.cholesky_decompose(&a)?;
    let y = client.solve_triangular_lower(&chol.l, &b, false)?;
    let lt = chol.l.transpose(-2, -1)?;
    client.solve_triangular_upper(&lt, &y)
}

/// `log |A| = 2 Σ log diag(L)` for the dense `a = L Lᵀ`
pub(crate) fn cholesky_logdet<R: Runtime>(client: &R::Client, a: &Tensor<R>) -> Result<Tensor<R>> {
    let chol = client.cholesky_decompose(a)?;
    let log_diag = client.log(&client.diag(&chol.l)?)?;
    let half = client.sum(&log_diag, &[log_diag.ndim() - 1], false)?;
    client.add(&half, &half)
}

/// Inverse quadratic form and log-determinant with a caller-supplied solve
///
/// The log-determinant is computed only for `logdet == Some(true)`.
pub(crate) fn inv_quad_logdet_impl<R, O>(
    op: &O,
    client: &R::Client,
    inv_quad_rhs: Option<&Tensor<R>>,
    logdet: Option<bool>,
    reduce_inv_quad: bool,
    solve: &dyn Fn(&Tensor<R>) -> Result<Tensor<R>>,
) -> Result<InvQuadLogdet<R>>
where
    R: Runtime,
    O: LinearOperator<R> + ?Sized,
{
    let inv_quad = match inv_quad_rhs {
        Some(rhs) => {
            let (rhs, _) = rhs_as_matrix(op.shape(), rhs)?;
            let solves = solve(&rhs)?;
            let prod = client.mul(&rhs, &solves)?;
            let term = client.sum(&prod, &[prod.ndim() - 2], false)?;
            let term = if reduce_inv_quad {
                client.sum(&term, &[term.ndim() - 1], false)?
            } else {
                term
            };
            Some(term)
        }
        None => None,
    };

    let logdet = match logdet {
        Some(true) => Some(op.logdet(client)?),
        _ => None,
    };

    Ok(InvQuadLogdet { inv_quad, logdet })
}

/// Root (or inverse root) from the operator's eigendecomposition
///
/// `Q · diag(√λ)` or `Q · diag(λ^{-1/2})`.
pub(crate) fn eig_root<R, O>(op: &O, client: &R::Client, inverse: bool) -> Result<RootOperator<R>>
where
    R: Runtime,
    O: LinearOperator<R> + ?Sized,
{
    let eig = op.symeig(client)?;
    let sqrt = client.sqrt(&eig.eigenvalues)?;
    let scale = if inverse { client.recip(&sqrt)? } else { sqrt };
    RootOperator::new(eig.eigenvectors, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_rhs_as_matrix_vector_and_batch() {
        let device = CpuDevice::new();
        let v = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);

        let (m, is_vector) = rhs_as_matrix(&[3, 3], &v).unwrap();
        assert!(is_vector);
        assert_eq!(m.shape(), &[3, 1]);

        let (m, is_vector) = rhs_as_matrix(&[2, 3, 3], &v).unwrap();
        assert!(is_vector);
        assert_eq!(m.shape(), &[2, 3, 1]);
        assert_eq!(restore_vector(m, is_vector).shape(), &[2, 3]);

        let mat = Tensor::<CpuRuntime>::zeros(&[3, 4], crate::dtype::DType::F64, &device);
        let (m, is_vector) = rhs_as_matrix(&[3, 3], &mat).unwrap();
        assert!(!is_vector);
        assert_eq!(m.shape(), &[3, 4]);
    }

    #[test]
    fn test_rhs_as_matrix_rejects_wrong_rows() {
        let device = CpuDevice::new();
        let v = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0], &[2], &device);
        assert!(matches!(
            rhs_as_matrix(&[3, 3], &v),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_cholesky_logdet_batched() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        // det [[4, 2], [2, 3]] = 8, det [[2, 0], [0, 5]] = 10
        let a = Tensor::<CpuRuntime>::from_slice(
            &[4.0f64, 2.0, 2.0, 3.0, 2.0, 0.0, 0.0, 5.0],
            &[2, 2, 2],
            &device,
        );
        let logdet = cholesky_logdet::<CpuRuntime>(&client, &a).unwrap();
        assert_eq!(logdet.shape(), &[2]);
        let got = logdet.to_vec::<f64>();
        assert!((got[0] - 8.0f64.ln()).abs() < 1e-12);
        assert!((got[1] - 10.0f64.ln()).abs() < 1e-12);
    }
}
