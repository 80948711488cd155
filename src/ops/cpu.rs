//! `CpuClient` implementations of the operation traits
//!
//! Each method forwards to a helper in `runtime::cpu`.

use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::Result;
use crate::ops::{
    BinaryOp, BinaryOps, LinalgOps, MatmulOps, ReduceOps, ScalarOps, TypeConversionOps, UnaryOp,
    UnaryOps, UtilityOps,
};
use crate::runtime::cpu::helpers::{
    binary_op_impl, cast_impl, matmul_impl, mul_scalar_impl, sum_impl, unary_op_impl,
};
use crate::runtime::cpu::linalg::{diag_embed_impl, diag_impl, kron_impl};
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::tensor::Tensor;

type T = Tensor<CpuRuntime>;

impl BinaryOps<CpuRuntime> for CpuClient {
    fn add(&self, a: &T, b: &T) -> Result<T> {
        binary_op_impl(self, BinaryOp::Add, a, b)
    }

    fn sub(&self, a: &T, b: &T) -> Result<T> {
        binary_op_impl(self, BinaryOp::Sub, a, b)
    }

    fn mul(&self, a: &T, b: &T) -> Result<T> {
        binary_op_impl(self, BinaryOp::Mul, a, b)
    }

    fn div(&self, a: &T, b: &T) -> Result<T> {
        binary_op_impl(self, BinaryOp::Div, a, b)
    }
}

impl UnaryOps<CpuRuntime> for CpuClient {
    fn sqrt(&self, a: &T) -> Result<T> {
        unary_op_impl(self, UnaryOp::Sqrt, a)
    }

    fn log(&self, a: &T) -> Result<T> {
        unary_op_impl(self, UnaryOp::Log, a)
    }

    fn recip(&self, a: &T) -> Result<T> {
        unary_op_impl(self, UnaryOp::Recip, a)
    }
}

impl ScalarOps<CpuRuntime> for CpuClient {
    fn mul_scalar(&self, a: &T, scalar: f64) -> Result<T> {
        mul_scalar_impl(self, a, scalar)
    }
}

impl MatmulOps<CpuRuntime> for CpuClient {
    fn matmul(&self, a: &T, b: &T) -> Result<T> {
        matmul_impl(self, a, b)
    }
}

impl ReduceOps<CpuRuntime> for CpuClient {
    fn sum(&self, a: &T, dims: &[usize], keepdim: bool) -> Result<T> {
        sum_impl(self, a, dims, keepdim)
    }
}

impl LinalgOps<CpuRuntime> for CpuClient {
    fn diag(&self, a: &T) -> Result<T> {
        diag_impl(self, a)
    }

    fn diag_embed(&self, a: &T) -> Result<T> {
        diag_embed_impl(self, a)
    }

    fn kron(&self, a: &T, b: &T) -> Result<T> {
        kron_impl(self, a, b)
    }
}

impl TypeConversionOps<CpuRuntime> for CpuClient {
    fn cast(&self, a: &T, dtype: DType) -> Result<T> {
        cast_impl(self, a, dtype)
    }
}

impl UtilityOps<CpuRuntime> for CpuClient {
    fn eye(&self, n: usize, dtype: DType) -> Result<T> {
        dispatch_dtype!(dtype, E => {
            let mut data = vec![E::zero(); n * n];
            data.iter_mut().step_by(n + 1).for_each(|x| *x = E::one());
            T::try_from_slice(&data, &[n, n], &self.device)
        }, "eye")
    }
}
