//! Element-wise operation kinds and operand validation

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{Shape, Tensor, broadcast_shapes};

/// Binary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition: a + b
    Add,
    /// Subtraction: a - b
    Sub,
    /// Multiplication: a * b
    Mul,
    /// Division: a / b
    Div,
}

impl BinaryOp {
    /// Operation name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
        }
    }
}

/// Unary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Square root
    Sqrt,
    /// Natural logarithm
    Log,
    /// Reciprocal: 1/a
    Recip,
}

impl UnaryOp {
    /// Operation name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Log => "log",
            Self::Recip => "recip",
        }
    }

    /// Apply to a single value
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Log => x.ln(),
            Self::Recip => 1.0 / x,
        }
    }
}

/// Check that both operands share a dtype and return it
pub fn validate_binary_dtypes<R: Runtime>(a: &Tensor<R>, b: &Tensor<R>) -> Result<DType> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    Ok(a.dtype())
}

/// Broadcast shape of two operands or a broadcast error
pub fn compute_broadcast_shape<R: Runtime>(a: &Tensor<R>, b: &Tensor<R>) -> Result<Shape> {
    broadcast_shapes(a.shape(), b.shape()).ok_or_else(|| Error::broadcast(a.shape(), b.shape()))
}
