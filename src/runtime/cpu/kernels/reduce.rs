//! Reduction kernels

use crate::dtype::Element;

/// Sum over the middle axis of a contiguous `[outer, reduce, inner]` block
///
/// Accumulates in f64 and returns `outer * inner` values.
pub fn sum_kernel<T: Element>(a: &[T], outer: usize, reduce: usize, inner: usize) -> Vec<T> {
    debug_assert_eq!(a.len(), outer * reduce * inner);
    let mut out = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        let block = &a[o * reduce * inner..(o + 1) * reduce * inner];
        for i in 0..inner {
            let acc: f64 = (0..reduce).map(|r| block[r * inner + i].to_f64()).sum();
            out.push(T::from_f64(acc));
        }
    }
    out
}
