//! Dtype dispatch and layout handling between the op traits and the kernels

mod elementwise;
mod matmul;
mod reduce;

pub use elementwise::{binary_op_impl, cast_impl, mul_scalar_impl, unary_op_impl};
pub use matmul::matmul_impl;
pub use reduce::sum_impl;
