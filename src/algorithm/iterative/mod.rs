//! Iterative solvers for symmetric positive definite systems
//!
//! Solvers are composite operations written once against the operation
//! traits: column-wise dot products (`ReduceOps`), vector updates
//! (`BinaryOps`), and an operator applied through a caller-supplied closure.
//! Any backend whose client implements [`TensorOps`](crate::ops::TensorOps)
//! runs the same algorithm.

mod cg;
mod helpers;
mod types;

pub use cg::cg_impl;
pub use helpers::BREAKDOWN_TOL;
pub use types::{CgOptions, CgResult};
