//! Triangular solves (forward and backward substitution)

use super::super::{CpuClient, CpuTensor};
use super::LinalgElement;
use crate::algorithm::linalg::{
    from_working_dtype, to_working_dtype, validate_linalg_dtype, validate_matrix_batch,
    validate_square_matrix,
};
use crate::dtype::DType;
use crate::error::{Error, Result};

/// Which triangle holds the coefficients
#[derive(Clone, Copy, Debug)]
pub enum Triangle {
    /// Lower triangular, optionally with an implicit unit diagonal
    Lower {
        /// Treat the diagonal as ones
        unit_diagonal: bool,
    },
    /// Upper triangular
    Upper,
}

/// Solve `T X = B` for triangular `t: [..., n, n]` and `b: [..., n, k]`
pub fn solve_triangular_impl(
    client: &CpuClient,
    t: &CpuTensor,
    b: &CpuTensor,
    triangle: Triangle,
) -> Result<CpuTensor> {
    validate_linalg_dtype(t.dtype())?;
    if t.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: t.dtype(),
            rhs: b.dtype(),
        });
    }
    let (batch, n) = validate_square_matrix(t.shape())?;
    let (b_batch, b_rows, k) = validate_matrix_batch(b.shape())?;
    if b_rows != n || b_batch != batch || t.shape()[..t.ndim() - 2] != b.shape()[..b.ndim() - 2] {
        return Err(Error::shape_mismatch(t.shape(), b.shape()));
    }

    let (t, original_dtype) = to_working_dtype(client, t)?;
    let (b, _) = to_working_dtype(client, b)?;

    let x = match t.dtype() {
        DType::F32 => solve_batched::<f32>(client, &t, &b, batch, n, k, triangle),
        DType::F64 => solve_batched::<f64>(client, &t, &b, batch, n, k, triangle),
        other => Err(Error::unsupported_dtype(other, "solve_triangular")),
    }?;

    from_working_dtype(client, x, original_dtype)
}

fn solve_batched<T: LinalgElement>(
    client: &CpuClient,
    t: &CpuTensor,
    b: &CpuTensor,
    batch: usize,
    n: usize,
    k: usize,
    triangle: Triangle,
) -> Result<CpuTensor> {
    let t_data: Vec<T> = t.to_vec();
    let mut x: Vec<T> = b.to_vec();

    for i in 0..batch {
        let t_mat = &t_data[i * n * n..(i + 1) * n * n];
        let x_mat = &mut x[i * n * k..(i + 1) * n * k];
        match triangle {
            Triangle::Lower { unit_diagonal } => forward_substitute(t_mat, x_mat, n, k, unit_diagonal),
            Triangle::Upper => backward_substitute(t_mat, x_mat, n, k),
        }
    }

    CpuTensor::try_from_slice(&x, b.shape(), &client.device)
}

/// In-place `x ← L⁻¹ x` for every column of `x: n × k`
fn forward_substitute<T: LinalgElement>(l: &[T], x: &mut [T], n: usize, k: usize, unit: bool) {
    for i in 0..n {
        for c in 0..k {
            let mut acc = x[i * k + c];
            for j in 0..i {
                acc = acc - l[i * n + j] * x[j * k + c];
            }
            x[i * k + c] = if unit { acc } else { acc / l[i * n + i] };
        }
    }
}

/// In-place `x ← U⁻¹ x`
fn backward_substitute<T: LinalgElement>(u: &[T], x: &mut [T], n: usize, k: usize) {
    for i in (0..n).rev() {
        for c in 0..k {
            let mut acc = x[i * k + c];
            for j in (i + 1)..n {
                acc = acc - u[i * n + j] * x[j * k + c];
            }
            x[i * k + c] = acc / u[i * n + i];
        }
    }
}
