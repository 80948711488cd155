//! Element-wise operation helpers for CPU tensors

use super::super::kernels;
use super::super::{CpuClient, CpuTensor};
use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::Result;
use crate::ops::{BinaryOp, UnaryOp, compute_broadcast_shape, validate_binary_dtypes};

/// Helper for binary operations (add, sub, mul, div) with broadcasting
pub fn binary_op_impl(
    client: &CpuClient,
    op: BinaryOp,
    a: &CpuTensor,
    b: &CpuTensor,
) -> Result<CpuTensor> {
    let dtype = validate_binary_dtypes(a, b)?;
    let out_shape = compute_broadcast_shape(a, b)?;

    // Broadcast views gather directly into row-major order of the output
    let a = a.broadcast_to(&out_shape)?;
    let b = b.broadcast_to(&out_shape)?;

    dispatch_dtype!(dtype, T => {
        let a_data: Vec<T> = a.to_vec();
        let b_data: Vec<T> = b.to_vec();
        let mut out = vec![T::zero(); a_data.len()];
        kernels::binary_kernel(op, &a_data, &b_data, &mut out);
        CpuTensor::try_from_slice(&out, &out_shape, &client.device)
    }, op.name())
}

/// Helper for unary operations
pub fn unary_op_impl(
    client: &CpuClient,
    op: UnaryOp,
    a: &CpuTensor,
) -> Result<CpuTensor> {
    dispatch_dtype!(a.dtype(), T => {
        let a_data: Vec<T> = a.to_vec();
        let mut out = vec![T::zero(); a_data.len()];
        kernels::unary_kernel(op, &a_data, &mut out);
        CpuTensor::try_from_slice(&out, a.shape(), &client.device)
    }, op.name())
}

/// Helper for multiplication by a scalar
pub fn mul_scalar_impl(client: &CpuClient, a: &CpuTensor, scalar: f64) -> Result<CpuTensor> {
    dispatch_dtype!(a.dtype(), T => {
        let a_data: Vec<T> = a.to_vec();
        let mut out = vec![T::zero(); a_data.len()];
        kernels::scale_kernel(&a_data, scalar, &mut out);
        CpuTensor::try_from_slice(&out, a.shape(), &client.device)
    }, "mul_scalar")
}

/// Helper for dtype conversion
pub fn cast_impl(
    client: &CpuClient,
    a: &CpuTensor,
    dtype: DType,
) -> Result<CpuTensor> {
    if a.dtype() == dtype {
        return Ok(a.clone());
    }

    dispatch_dtype!(a.dtype(), S => {
        let src: Vec<S> = a.to_vec();
        dispatch_dtype!(dtype, D => {
            let dst: Vec<D> = kernels::cast_kernel::<S, D>(&src);
            CpuTensor::try_from_slice(&dst, a.shape(), &client.device)
        }, "cast")
    }, "cast")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::CpuDevice;

    #[test]
    fn test_binary_broadcast_column() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let col = CpuTensor::from_slice(&[10.0f64, 100.0], &[2, 1], &device);
        let out = binary_op_impl(&client, BinaryOp::Mul, &a, &col).unwrap();
        assert_eq!(out.to_vec::<f64>(), vec![10.0, 20.0, 300.0, 400.0]);
    }

    #[test]
    fn test_binary_dtype_mismatch() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f64], &[1], &device);
        let b = CpuTensor::from_slice(&[1.0f32], &[1], &device);
        assert!(binary_op_impl(&client, BinaryOp::Add, &a, &b).is_err());
    }

    #[test]
    fn test_mul_scalar_keeps_shape() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        let out = mul_scalar_impl(&client, &a.transpose(0, 1).unwrap(), 0.5).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.to_vec::<f32>(), vec![0.5, 1.5, 1.0, 2.0]);
    }

    #[test]
    fn test_cast_round_trip_dtype() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device);
        let a = CpuTensor::from_slice(&[0.5f64, -2.0], &[2], &device);
        let b = cast_impl(&client, &a, DType::F32).unwrap();
        assert_eq!(b.dtype(), DType::F32);
        assert_eq!(b.to_vec::<f32>(), vec![0.5, -2.0]);
    }
}
