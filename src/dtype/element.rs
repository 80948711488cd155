//! Host scalar types backing each `DType`

use super::DType;
use bytemuck::Pod;
use std::ops::{Add, Div, Mul, Sub};

/// A Rust scalar that can be stored in a tensor
///
/// Storage is a byte buffer reinterpreted through `bytemuck`, so elements
/// must be `Pod`. Kernels that need a common numeric path go through
/// `to_f64`/`from_f64`.
pub trait Element:
    Pod
    + Send
    + Sync
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Runtime tag for this type
    const DTYPE: DType;

    /// Widen to f64
    fn to_f64(self) -> f64;

    /// Narrow from f64, rounding to nearest
    fn from_f64(v: f64) -> Self;

    /// Additive identity
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    /// Multiplicative identity
    fn one() -> Self {
        Self::from_f64(1.0)
    }
}

macro_rules! primitive_float_element {
    ($ty:ty, $dtype:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }
        }
    };
}

primitive_float_element!(f64, DType::F64);
primitive_float_element!(f32, DType::F32);

#[cfg(feature = "f16")]
macro_rules! half_float_element {
    ($ty:ty, $dtype:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                <$ty>::to_f64(self)
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                <$ty>::from_f64(v)
            }

            #[inline]
            fn zero() -> Self {
                <$ty>::ZERO
            }

            #[inline]
            fn one() -> Self {
                <$ty>::ONE
            }
        }
    };
}

#[cfg(feature = "f16")]
half_float_element!(half::f16, DType::F16);
#[cfg(feature = "f16")]
half_float_element!(half::bf16, DType::BF16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(<f64 as Element>::DTYPE, DType::F64);
        assert_eq!(<f32 as Element>::DTYPE, DType::F32);
        assert_eq!(<f32 as Element>::one(), 1.0);
        assert_eq!(<f64 as Element>::zero(), 0.0);
    }

    #[test]
    fn test_f32_narrowing() {
        let v = <f32 as Element>::from_f64(0.1);
        assert!((v.to_f64() - 0.1).abs() < 1e-7);
    }

    #[cfg(feature = "f16")]
    #[test]
    fn test_half_conversion() {
        let v = <half::f16 as Element>::from_f64(1.5);
        assert_eq!(Element::to_f64(v), 1.5);
        assert_eq!(Element::to_f64(<half::bf16 as Element>::one()), 1.0);
    }
}
