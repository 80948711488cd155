//! Batched matrix multiplication helper for CPU tensors

use super::super::kernels;
use super::super::{CpuClient, CpuTensor};
use crate::dispatch_dtype;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::{matmul_output_shape, validate_binary_dtypes};

/// `[..., m, k] @ [..., k, n]` with broadcast batch dimensions
pub fn matmul_impl(
    client: &CpuClient,
    a: &CpuTensor,
    b: &CpuTensor,
) -> Result<CpuTensor> {
    let dtype = validate_binary_dtypes(a, b)?;
    let out_shape = matmul_output_shape(a.shape(), b.shape())
        .ok_or_else(|| Error::shape_mismatch(a.shape(), b.shape()))?;

    let rank = out_shape.len();
    let (m, n) = (out_shape[rank - 2], out_shape[rank - 1]);
    let k = a.shape()[a.ndim() - 1];
    let batch: usize = out_shape[..rank - 2].iter().product();

    let mut a_target = out_shape[..rank - 2].to_vec();
    a_target.extend_from_slice(&[m, k]);
    let mut b_target = out_shape[..rank - 2].to_vec();
    b_target.extend_from_slice(&[k, n]);

    let a = a.broadcast_to(&a_target)?;
    let b = b.broadcast_to(&b_target)?;

    dispatch_dtype!(dtype, T => {
        let a_data: Vec<T> = a.to_vec();
        let b_data: Vec<T> = b.to_vec();
        let mut out = vec![T::zero(); batch * m * n];
        for i in 0..batch {
            kernels::matmul_kernel(
                &a_data[i * m * k..(i + 1) * m * k],
                &b_data[i * k * n..(i + 1) * k * n],
                &mut out[i * m * n..(i + 1) * m * n],
                m,
                n,
                k,
            );
        }
        CpuTensor::try_from_slice(&out, &out_shape, &client.device)
    }, "matmul")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::CpuDevice;

    #[test]
    fn test_batched_matmul_broadcasts_rhs() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        // two 2x2 matrices times one shared 2x1 vector
        let a = CpuTensor::from_slice(
            &[1.0f64, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 3.0],
            &[2, 2, 2],
            &device,
        );
        let x = CpuTensor::from_slice(&[1.0f64, 1.0], &[2, 1], &device);
        let out = matmul_impl(&client, &a, &x).unwrap();
        assert_eq!(out.shape(), &[2, 2, 1]);
        assert_eq!(out.to_vec::<f64>(), vec![1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_matmul_transposed_view() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let out = matmul_impl(&client, &a.transpose(-2, -1).unwrap(), &a).unwrap();
        assert_eq!(out.to_vec::<f64>(), vec![10.0, 14.0, 14.0, 20.0]);
    }

    #[test]
    fn test_matmul_inner_mismatch() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::zeros(&[2, 3], crate::dtype::DType::F64, &device);
        let b = CpuTensor::zeros(&[2, 3], crate::dtype::DType::F64, &device);
        assert!(matches!(
            matmul_impl(&client, &a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
