//! Diagonal extraction/embedding and the Kronecker product
//!
//! These only rearrange or multiply entries, so every dtype is supported.

use super::super::{CpuClient, CpuTensor};
use crate::algorithm::linalg::{validate_matrix_batch, validate_square_matrix};
use crate::dispatch_dtype;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::validate_binary_dtypes;

/// `[..., n, n] -> [..., n]`
pub fn diag_impl(client: &CpuClient, a: &CpuTensor) -> Result<CpuTensor> {
    let (batch, n) = validate_square_matrix(a.shape())?;
    let out_shape = &a.shape()[..a.ndim() - 1];

    dispatch_dtype!(a.dtype(), T => {
        let data: Vec<T> = a.to_vec();
        let mut out = Vec::with_capacity(batch * n);
        for b in 0..batch {
            out.extend((0..n).map(|i| data[b * n * n + i * n + i]));
        }
        CpuTensor::try_from_slice(&out, out_shape, &client.device)
    }, "diag")
}

/// `[..., n] -> [..., n, n]` with zeros off the diagonal
pub fn diag_embed_impl(client: &CpuClient, a: &CpuTensor) -> Result<CpuTensor> {
    let n = *a.shape().last().ok_or_else(|| {
        Error::invalid_argument("a", "diag_embed needs at least one dimension")
    })?;
    let batch: usize = a.shape()[..a.ndim() - 1].iter().product();
    let mut out_shape = a.shape().to_vec();
    out_shape.push(n);

    dispatch_dtype!(a.dtype(), T => {
        let data: Vec<T> = a.to_vec();
        let mut out = vec![T::zero(); batch * n * n];
        for b in 0..batch {
            for i in 0..n {
                out[b * n * n + i * n + i] = data[b * n + i];
            }
        }
        CpuTensor::try_from_slice(&out, &out_shape, &client.device)
    }, "diag_embed")
}

/// Batched Kronecker product with matching batch dimensions
///
/// `out[(i_a·m_b + i_b)·n_out + j_a·n_b + j_b] = a[i_a, j_a] · b[i_b, j_b]`
pub fn kron_impl(
    client: &CpuClient,
    a: &CpuTensor,
    b: &CpuTensor,
) -> Result<CpuTensor> {
    let dtype = validate_binary_dtypes(a, b)?;
    let (batch, m_a, n_a) = validate_matrix_batch(a.shape())?;
    let (_, m_b, n_b) = validate_matrix_batch(b.shape())?;
    let a_batch = &a.shape()[..a.ndim() - 2];
    if a_batch != &b.shape()[..b.ndim() - 2] {
        return Err(Error::shape_mismatch(a.shape(), b.shape()));
    }

    let (m_out, n_out) = (m_a * m_b, n_a * n_b);
    let mut out_shape = a_batch.to_vec();
    out_shape.extend_from_slice(&[m_out, n_out]);

    dispatch_dtype!(dtype, T => {
        let lhs: Vec<T> = a.to_vec();
        let rhs: Vec<T> = b.to_vec();
        let mut out = vec![T::zero(); batch * m_out * n_out];
        if !out.is_empty() {
            let blocks = lhs
                .chunks(m_a * n_a)
                .zip(rhs.chunks(m_b * n_b))
                .zip(out.chunks_mut(m_out * n_out));
            for ((a_mat, b_mat), o_mat) in blocks {
                kron_block(a_mat, b_mat, o_mat, (m_a, n_a), (m_b, n_b));
            }
        }
        CpuTensor::try_from_slice(&out, &out_shape, &client.device)
    }, "kron")
}

fn kron_block<T: Element>(
    a: &[T],
    b: &[T],
    out: &mut [T],
    (m_a, n_a): (usize, usize),
    (m_b, n_b): (usize, usize),
) {
    debug_assert_eq!(a.len(), m_a * n_a);
    debug_assert_eq!(out.len(), m_a * m_b * n_a * n_b);
    let width = n_a * n_b;
    for (idx, &scale) in a.iter().enumerate() {
        let (p, q) = (idx / n_a, idx % n_a);
        for (r, b_row) in b.chunks(n_b).enumerate() {
            let start = (p * m_b + r) * width + q * n_b;
            for (dst, &v) in out[start..start + n_b].iter_mut().zip(b_row) {
                *dst = scale * v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::CpuDevice;

    #[test]
    fn test_kron_block_layout() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let b = CpuTensor::from_slice(&[0.0f64, 5.0, 6.0, 7.0], &[2, 2], &device);
        let k = kron_impl(&client, &a, &b).unwrap();
        assert_eq!(k.shape(), &[4, 4]);
        let rows: Vec<Vec<f64>> = k.to_vec::<f64>().chunks(4).map(<[f64]>::to_vec).collect();
        assert_eq!(rows[0], [0.0, 5.0, 0.0, 10.0]);
        assert_eq!(rows[1], [6.0, 7.0, 12.0, 14.0]);
        assert_eq!(rows[2], [0.0, 15.0, 0.0, 20.0]);
        assert_eq!(rows[3], [18.0, 21.0, 24.0, 28.0]);
    }

    #[test]
    fn test_kron_rectangular_column() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f64, 2.0], &[2, 1], &device);
        let b = CpuTensor::from_slice(&[3.0f64, 4.0], &[2, 1], &device);
        let k = kron_impl(&client, &a, &b).unwrap();
        assert_eq!(k.shape(), &[4, 1]);
        assert_eq!(k.to_vec::<f64>(), vec![3.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_kron_row_by_column() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f64, 2.0], &[1, 2], &device);
        let b = CpuTensor::from_slice(&[3.0f64, 4.0], &[2, 1], &device);
        let k = kron_impl(&client, &a, &b).unwrap();
        assert_eq!(k.shape(), &[2, 2]);
        assert_eq!(k.to_vec::<f64>(), vec![3.0, 6.0, 4.0, 8.0]);
    }

    #[test]
    fn test_diag_round_trip_batched() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let d = CpuTensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        let m = diag_embed_impl(&client, &d).unwrap();
        assert_eq!(m.shape(), &[2, 2, 2]);
        assert_eq!(m.to_vec::<f32>(), vec![1.0, 0.0, 0.0, 2.0, 3.0, 0.0, 0.0, 4.0]);
        let back = diag_impl(&client, &m).unwrap();
        assert_eq!(back.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);
    }
}
