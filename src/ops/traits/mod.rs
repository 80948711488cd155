//! Operation trait definitions; `ops::cpu` implements them for [`CpuClient`](crate::runtime::cpu::CpuClient)

mod creation;
mod elementwise;
mod matrix;

pub use creation::{TypeConversionOps, UtilityOps};
pub use elementwise::{BinaryOps, ScalarOps, UnaryOps};
pub use matrix::{LinalgOps, MatmulOps, ReduceOps};
