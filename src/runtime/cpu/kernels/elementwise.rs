//! Element-wise kernels

use crate::dtype::Element;
use crate::ops::{BinaryOp, UnaryOp};

/// `out[i] = a[i] op b[i]`
#[inline]
pub fn binary_kernel<T: Element>(op: BinaryOp, a: &[T], b: &[T], out: &mut [T]) {
    debug_assert!(a.len() == out.len() && b.len() == out.len());
    let iter = out.iter_mut().zip(a.iter().zip(b.iter()));
    match op {
        BinaryOp::Add => iter.for_each(|(o, (&x, &y))| *o = x + y),
        BinaryOp::Sub => iter.for_each(|(o, (&x, &y))| *o = x - y),
        BinaryOp::Mul => iter.for_each(|(o, (&x, &y))| *o = x * y),
        BinaryOp::Div => iter.for_each(|(o, (&x, &y))| *o = x / y),
    }
}

/// `out[i] = op(a[i])`, evaluated in f64 and rounded back to `T`
#[inline]
pub fn unary_kernel<T: Element>(op: UnaryOp, a: &[T], out: &mut [T]) {
    debug_assert_eq!(a.len(), out.len());
    for (o, &x) in out.iter_mut().zip(a) {
        *o = T::from_f64(op.apply(x.to_f64()));
    }
}

/// `out[i] = a[i] * scalar`, with the scalar rounded to `T` first
#[inline]
pub fn scale_kernel<T: Element>(a: &[T], scalar: f64, out: &mut [T]) {
    debug_assert_eq!(a.len(), out.len());
    let s = T::from_f64(scalar);
    out.iter_mut().zip(a).for_each(|(o, &x)| *o = x * s);
}

/// Convert every element from `S` to `D` through f64
#[inline]
pub fn cast_kernel<S: Element, D: Element>(a: &[S]) -> Vec<D> {
    a.iter().map(|&x| D::from_f64(x.to_f64())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_kernel() {
        let a = [1.0f64, 2.0, 3.0];
        let b = [4.0f64, 5.0, 6.0];
        let mut out = [0.0f64; 3];
        binary_kernel(BinaryOp::Sub, &a, &b, &mut out);
        assert_eq!(out, [-3.0, -3.0, -3.0]);
        binary_kernel(BinaryOp::Div, &b, &a, &mut out);
        assert_eq!(out, [4.0, 2.5, 2.0]);
    }

    #[test]
    fn test_unary_recip_sqrt() {
        let a = [4.0f32, 0.25];
        let mut out = [0.0f32; 2];
        unary_kernel(UnaryOp::Recip, &a, &mut out);
        assert_eq!(out, [0.25, 4.0]);
        unary_kernel(UnaryOp::Sqrt, &a, &mut out);
        assert_eq!(out, [2.0, 0.5]);
    }

    #[test]
    fn test_scale_kernel() {
        let a = [1.5f64, -2.0];
        let mut out = [0.0f64; 2];
        scale_kernel(&a, 4.0, &mut out);
        assert_eq!(out, [6.0, -8.0]);
    }

    #[test]
    fn test_cast_kernel_rounds() {
        let a = [1.0f64 / 3.0];
        let b: Vec<f32> = cast_kernel(&a);
        assert_eq!(b[0], 1.0f32 / 3.0);
    }
}
