//! Tensor types
//!
//! This module provides the core `Tensor` type, an n-dimensional array whose
//! element type is chosen at runtime. Operators in [`crate::linop`] hold their
//! data as tensors and drive all arithmetic through a runtime client.

mod core;
mod layout;
mod storage;

pub use core::Tensor;
pub use layout::{Layout, Shape, Strides, broadcast_shapes};
pub use storage::Storage;
