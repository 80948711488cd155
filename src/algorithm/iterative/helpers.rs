//! Column-wise reductions shared by the iterative solvers

use crate::error::Result;
use crate::ops::TensorOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Denominators below this magnitude are treated as a breakdown
pub const BREAKDOWN_TOL: f64 = 1e-300;

/// Per-column inner products `Σ_i a[..., i, j] · b[..., i, j]`, flattened to host
///
/// Inputs are `[..., n, k]`; the result has `batch · k` entries in row-major
/// order of `[..., k]`.
pub(super) fn column_dots<R, C>(client: &C, a: &Tensor<R>, b: &Tensor<R>) -> Result<Vec<f64>>
where
    R: Runtime,
    C: TensorOps<R>,
{
    let prod = client.mul(a, b)?;
    let row_dim = prod.ndim() - 2;
    client.sum(&prod, &[row_dim], false)?.to_f64_vec()
}

/// Multiply each column of `x: [..., n, k]` by its own coefficient
pub(super) fn scale_columns<R, C>(client: &C, x: &Tensor<R>, coeffs: &[f64]) -> Result<Tensor<R>>
where
    R: Runtime,
    C: TensorOps<R>,
{
    let mut shape = x.shape().to_vec();
    let rows = shape.len() - 2;
    shape[rows] = 1;
    let scale = Tensor::<R>::try_from_f64(coeffs, &shape, x.dtype(), x.device())?;
    client.mul(x, &scale)
}
