//! # linopr
//!
//! **Structured lazy linear operators for Gaussian process inference.**
//!
//! linopr represents large covariance matrices by their structure instead of
//! their entries. A Kronecker product of small factors plus a diagonal noise
//! term is solved, log-determined and square-rooted through the
//! eigendecomposition of the factors, without ever forming or factorizing the
//! full matrix.
//!
//! ## Layers
//!
//! - **Tensors**: runtime-generic n-dimensional arrays with strided views
//! - **Operations**: broadcasting arithmetic, reductions, batched matmul,
//!   `diag`/`diag_embed`/`kron`, dispatched through the runtime client
//! - **Linear algebra**: Cholesky, triangular solves, symmetric eigendecomposition,
//!   batched preconditioned conjugate gradients
//! - **Operators**: [`LinearOperator`](linop::LinearOperator) and the dense,
//!   diagonal, Kronecker, added-diagonal and Kronecker-plus-diagonal family
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use linopr::prelude::*;
//!
//! let device = CpuDevice::new();
//! let client = CpuRuntime::default_client(&device);
//!
//! let a = Tensor::<CpuRuntime>::from_slice(&[2.0f64, 1.0, 1.0, 2.0], &[2, 2], &device);
//! let b = Tensor::<CpuRuntime>::from_slice(&[3.0f64, 0.0, 0.0, 1.0], &[2, 2], &device);
//! let kron = KroneckerProductOperator::new(vec![
//!     Arc::new(DenseOperator::new(a)?) as Arc<dyn LinearOperator<CpuRuntime>>,
//!     Arc::new(DenseOperator::new(b)?),
//! ])?;
//! let noise = DiagOperator::<CpuRuntime>::constant(0.5, 4, DType::F64, &device)?;
//!
//! let op = KroneckerProductAddedDiagOperator::new(
//!     vec![Arc::new(kron) as Arc<dyn LinearOperator<CpuRuntime>>, Arc::new(noise)],
//!     None,
//! )?;
//! let logdet = op.logdet(&client)?;
//! assert_eq!(logdet.shape(), &[] as &[usize]);
//! # Ok::<(), linopr::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded matrix multiplication
//! - `f16`: Half-precision floats (F16, BF16), computed in F32 for linear algebra

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod linop;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::iterative::{CgOptions, CgResult};
    pub use crate::algorithm::linalg::{
        CholeskyDecomposition, EigenDecomposition, LinearAlgebraAlgorithms,
    };
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::linop::{
        AddedDiagOperator, AddedDiagOptions, DenseOperator, DiagOperator, InvQuadLogdet,
        KroneckerProductAddedDiagOperator, KroneckerProductOperator, LinearOperator,
        Preconditioner, PreconditionerFn, RootOperator,
    };
    pub use crate::ops::{
        BinaryOps, LinalgOps, MatmulOps, ReduceOps, ScalarOps, TensorOps, TypeConversionOps,
        UnaryOps, UtilityOps,
    };
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
}

/// Default runtime
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
