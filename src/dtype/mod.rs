//! Runtime element types
//!
//! Operators are real symmetric matrices, so only floating point dtypes
//! exist. The dtype travels with the tensor at runtime; typed access goes
//! through [`Element`].

mod element;

pub use element::Element;

use std::fmt;

/// Element type of a tensor
///
/// Kept as a runtime tag rather than a type parameter so that a solve can
/// run in F64 on F32 inputs and hand back F32. F16 and BF16 need the `f16`
/// feature for any computation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DType {
    /// IEEE 754 binary64
    F64,
    /// IEEE 754 binary32
    F32,
    /// IEEE 754 binary16
    F16,
    /// bfloat16
    BF16,
}

impl DType {
    /// Bytes per element
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 => 4,
            Self::F16 | Self::BF16 => 2,
        }
    }

    /// Whether this is a floating point type
    ///
    /// Always true today; linear algebra entry points check it so a future
    /// integer dtype is rejected there.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Lowercase name, as used by `Display`
    pub const fn name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
        }
    }

    /// Distance from 1.0 to the next representable value
    pub const fn epsilon(self) -> f64 {
        match self {
            Self::F64 => f64::EPSILON,
            Self::F32 => f32::EPSILON as f64,
            // 2^-10
            Self::F16 => 9.765625e-4,
            // 2^-7
            Self::BF16 => 7.8125e-3,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
