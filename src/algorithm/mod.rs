//! Algorithm contracts and backend-neutral implementations
//!
//! - [`linalg`]: decomposition result types, validation helpers, and the
//!   [`LinearAlgebraAlgorithms`](linalg::LinearAlgebraAlgorithms) contract
//!   every runtime client implements
//! - [`iterative`]: batched preconditioned conjugate gradients, written once
//!   against the operation traits

pub mod iterative;
pub mod linalg;
