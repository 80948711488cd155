//! Crate error type

use crate::dtype::DType;
use thiserror::Error;

/// `Result` specialized to [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in tensor kernels, factorizations and
/// operator construction
#[derive(Error, Debug)]
pub enum Error {
    /// Operand shape is not the one required
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        #[allow(missing_docs)]
        expected: Vec<usize>,
        #[allow(missing_docs)]
        got: Vec<usize>,
    },

    /// Two shapes have no common broadcast shape
    #[error("Shapes {lhs:?} and {rhs:?} are not broadcast compatible")]
    Broadcast {
        #[allow(missing_docs)]
        lhs: Vec<usize>,
        #[allow(missing_docs)]
        rhs: Vec<usize>,
    },

    /// Axis index out of range
    #[error("Dimension {dim} out of range for a {ndim}-d tensor")]
    InvalidDimension {
        /// Requested axis, possibly negative
        dim: isize,
        /// Rank of the tensor
        ndim: usize,
    },

    /// A kernel has no implementation for this dtype
    #[error("'{op}' does not support {dtype}")]
    UnsupportedDType {
        #[allow(missing_docs)]
        dtype: DType,
        /// Kernel name
        op: &'static str,
    },

    /// Operands disagree on dtype
    #[error("DType mismatch: {lhs} vs {rhs}")]
    DTypeMismatch {
        #[allow(missing_docs)]
        lhs: DType,
        #[allow(missing_docs)]
        rhs: DType,
    },

    /// The dtype exists but its cargo feature is off
    #[error("{dtype} needs the '{feature}' feature")]
    FeatureRequired {
        #[allow(missing_docs)]
        dtype: DType,
        #[allow(missing_docs)]
        feature: &'static str,
    },

    /// An argument failed validation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// Parameter name
        arg: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A layout could not be reinterpreted without copying
    #[error("Tensor view is not contiguous")]
    NotContiguous,

    /// Cholesky met a non-positive pivot
    #[error("Matrix is not positive definite (in '{op}')")]
    NotPositiveDefinite {
        #[allow(missing_docs)]
        op: &'static str,
    },

    /// An added-diagonal operator was given the wrong number of components
    #[error("Exactly two components required, got {got}")]
    ComponentCount {
        #[allow(missing_docs)]
        got: usize,
    },

    /// An added-diagonal operator needs exactly one diagonal component
    #[error("One component must be diagonal (found {found} diagonal components)")]
    DiagonalComponent {
        /// How many components reported themselves diagonal
        found: usize,
    },

    /// Broken internal invariant
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    #[allow(missing_docs)]
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    #[allow(missing_docs)]
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::Broadcast {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    #[allow(missing_docs)]
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    #[allow(missing_docs)]
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
