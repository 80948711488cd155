//! Elementwise arithmetic

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Tensor-tensor arithmetic with broadcasting
///
/// Shapes are right-aligned and any axis of length 1 stretches to match the
/// other operand. Operands must already share a dtype.
///
/// ```
/// use linopr::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
///
/// let m = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let row = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0], &[2], &device);
/// assert_eq!(client.add(&m, &row)?.to_vec::<f32>(), vec![11.0, 22.0, 13.0, 24.0]);
/// # Ok::<(), linopr::error::Error>(())
/// ```
pub trait BinaryOps<R: Runtime> {
    #[allow(missing_docs)]
    fn add(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
    #[allow(missing_docs)]
    fn sub(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
    #[allow(missing_docs)]
    fn mul(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
    /// Division by zero follows IEEE 754
    fn div(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
}

/// One-argument maps
///
/// Out-of-domain inputs produce NaN or infinity rather than an error.
pub trait UnaryOps<R: Runtime> {
    #[allow(missing_docs)]
    fn sqrt(&self, a: &Tensor<R>) -> Result<Tensor<R>>;
    /// Natural log
    fn log(&self, a: &Tensor<R>) -> Result<Tensor<R>>;
    /// `1 / a`
    fn recip(&self, a: &Tensor<R>) -> Result<Tensor<R>>;
}

/// Tensor-scalar arithmetic; the scalar is rounded to the tensor's dtype
pub trait ScalarOps<R: Runtime> {
    /// `a * scalar`
    fn mul_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;
}
