//! Typed CPU kernels
//!
//! Kernels operate on contiguous row-major slices of a concrete element type.
//! Layout handling (broadcasting, transposed views) is done by the callers in
//! `helpers`, which gather inputs into contiguous buffers first.

mod elementwise;
mod matmul;
mod reduce;

pub use elementwise::{binary_kernel, cast_kernel, scale_kernel, unary_kernel};
pub use matmul::matmul_kernel;
pub use reduce::sum_kernel;
