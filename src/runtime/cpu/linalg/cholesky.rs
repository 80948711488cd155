//! Cholesky decomposition (Cholesky–Banachiewicz, row by row)

use super::super::{CpuClient, CpuRuntime, CpuTensor};
use super::LinalgElement;
use crate::algorithm::linalg::{
    CholeskyDecomposition, from_working_dtype, to_working_dtype, validate_linalg_dtype,
    validate_square_matrix,
};
use crate::dtype::DType;
use crate::error::{Error, Result};

/// Cholesky decomposition of every matrix in the batch
pub fn cholesky_decompose_impl(
    client: &CpuClient,
    a: &CpuTensor,
) -> Result<CholeskyDecomposition<CpuRuntime>> {
    validate_linalg_dtype(a.dtype())?;
    let (batch, n) = validate_square_matrix(a.shape())?;
    let (a, original_dtype) = to_working_dtype(client, a)?;

    let l = match a.dtype() {
        DType::F32 => cholesky_batched::<f32>(client, &a, batch, n),
        DType::F64 => cholesky_batched::<f64>(client, &a, batch, n),
        other => Err(Error::unsupported_dtype(other, "cholesky_decompose")),
    }?;

    Ok(CholeskyDecomposition {
        l: from_working_dtype(client, l, original_dtype)?,
    })
}

fn cholesky_batched<T: LinalgElement>(
    client: &CpuClient,
    a: &CpuTensor,
    batch: usize,
    n: usize,
) -> Result<CpuTensor> {
    let a_data: Vec<T> = a.to_vec();
    let mut l = vec![T::zero(); batch * n * n];

    if n > 0 {
        for (src, dst) in a_data.chunks_exact(n * n).zip(l.chunks_exact_mut(n * n)) {
            cholesky_factor(src, dst, n)?;
        }
    }

    CpuTensor::try_from_slice(&l, a.shape(), &client.device)
}

/// Factor one `n × n` matrix into `l` (zeroed on entry)
///
/// Only the lower triangle of `a` is read.
fn cholesky_factor<T: LinalgElement>(a: &[T], l: &mut [T], n: usize) -> Result<()> {
    for i in 0..n {
        let mut sum_sq = T::zero();
        for k in 0..i {
            sum_sq = sum_sq + l[i * n + k] * l[i * n + k];
        }

        let pivot = a[i * n + i] - sum_sq;
        let pivot_f64 = pivot.to_f64();
        if pivot_f64.is_nan() || pivot_f64 <= 0.0 {
            return Err(Error::NotPositiveDefinite {
                op: "cholesky_decompose",
            });
        }
        let l_ii = pivot.sqrt_val();
        l[i * n + i] = l_ii;

        for j in (i + 1)..n {
            let mut sum_prod = T::zero();
            for k in 0..i {
                sum_prod = sum_prod + l[j * n + k] * l[i * n + k];
            }
            l[j * n + i] = (a[j * n + i] - sum_prod) / l_ii;
        }
    }
    Ok(())
}
