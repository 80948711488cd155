//! Constructors and dtype conversion

use crate::dtype::DType;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Dtype conversion
pub trait TypeConversionOps<R: Runtime> {
    /// Convert every element to `dtype`, rounding to nearest when narrowing
    ///
    /// A cast to the current dtype shares the buffer.
    fn cast(&self, a: &Tensor<R>, dtype: DType) -> Result<Tensor<R>>;
}

/// Tensors built on the client's device
pub trait UtilityOps<R: Runtime> {
    /// `[n, n]` identity
    fn eye(&self, n: usize, dtype: DType) -> Result<Tensor<R>>;
}
