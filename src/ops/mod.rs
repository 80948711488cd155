//! Tensor operations
//!
//! Operations are defined as traits implemented by the runtime client, which
//! gives them access to the device when creating output tensors.
//!
//! ```text
//! RuntimeClient<R>
//!   └── implements TensorOps<R>
//!         ├── add, sub, mul, div      (binary, broadcasting)
//!         ├── sqrt, log, recip        (unary)
//!         ├── mul_scalar              (tensor-scalar)
//!         ├── sum                     (reductions)
//!         ├── matmul                  (batched matrix multiplication)
//!         ├── cast                    (dtype conversion)
//!         ├── eye                     (constructors)
//!         └── diag, diag_embed, kron  (structural linear algebra)
//! ```
//!
//! Decompositions (Cholesky, symmetric eigendecomposition, triangular solves)
//! live behind [`crate::algorithm::linalg::LinearAlgebraAlgorithms`].

mod arithmetic;
pub(crate) mod cpu;
mod dispatch;
mod shapes;
pub mod traits;

pub use arithmetic::*;
pub use shapes::*;
pub use traits::*;

use crate::runtime::Runtime;

/// Core tensor operations trait
///
/// Aggregates every operation trait; implemented by runtime clients.
///
/// # Example
///
/// ```
/// use linopr::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
///
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let b = Tensor::<CpuRuntime>::from_slice(&[5.0f64, 6.0, 7.0, 8.0], &[2, 2], &device);
///
/// let c = client.add(&a, &b)?;
/// assert_eq!(c.to_vec::<f64>(), vec![6.0, 8.0, 10.0, 12.0]);
/// # Ok::<(), linopr::error::Error>(())
/// ```
pub trait TensorOps<R: Runtime>:
    BinaryOps<R>
    + UnaryOps<R>
    + ScalarOps<R>
    + ReduceOps<R>
    + MatmulOps<R>
    + TypeConversionOps<R>
    + UtilityOps<R>
    + LinalgOps<R>
{
}

impl<R, C> TensorOps<R> for C
where
    R: Runtime,
    C: BinaryOps<R>
        + UnaryOps<R>
        + ScalarOps<R>
        + ReduceOps<R>
        + MatmulOps<R>
        + TypeConversionOps<R>
        + UtilityOps<R>
        + LinalgOps<R>,
{
}
