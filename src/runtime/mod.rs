//! Runtime backends for tensor computation
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a compute unit)
//! └── Client (dispatches operations)
//! ```
//!
//! Only the CPU backend ships with the crate. Operator code in
//! [`crate::linop`] is written against the traits so it stays backend-neutral.

pub mod cpu;
mod traits;

pub use traits::{Device, Runtime, RuntimeClient};
