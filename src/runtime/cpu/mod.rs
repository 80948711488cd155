//! Host CPU backend
//!
//! Reference implementation of every tensor operation and
//! decomposition. Kernels work on contiguous typed slices; inputs that are
//! views (transposed, broadcast) are gathered first.
//!
//! # Broadcasting
//!
//! Binary arithmetic broadcasts NumPy-style: dimensions are right-aligned and
//! expanded where one operand has size 1.
//!
//! # Parallelism
//!
//! With the `rayon` feature, matrix multiplication splits output rows across
//! the rayon thread pool.

pub(crate) mod helpers;
pub(crate) mod kernels;
pub(crate) mod linalg;
mod runtime;

pub use crate::tensor::Tensor;
pub use runtime::{CpuClient, CpuDevice, CpuRuntime};

pub(crate) type CpuTensor = Tensor<CpuRuntime>;
