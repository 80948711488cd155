//! Matrix multiplication kernels

use crate::dtype::Element;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Below this many output elements a single thread is faster
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 4096;

/// Matrix multiplication: C = A @ B for one contiguous row-major matrix pair
///
/// `a` is `m × k`, `b` is `k × n`, `out` is `m × n`. Products accumulate in
/// f64 before rounding to `T`.
pub fn matmul_kernel<T: Element>(a: &[T], b: &[T], out: &mut [T], m: usize, n: usize, k: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(out.len(), m * n);
    if n == 0 {
        return;
    }

    let row = |i: usize, out_row: &mut [T]| {
        let a_row = &a[i * k..(i + 1) * k];
        let mut acc = vec![0.0f64; n];
        for (p, &a_ip) in a_row.iter().enumerate() {
            let a_ip = a_ip.to_f64();
            if a_ip == 0.0 {
                continue;
            }
            let b_row = &b[p * n..(p + 1) * n];
            for (acc_j, &b_pj) in acc.iter_mut().zip(b_row) {
                *acc_j += a_ip * b_pj.to_f64();
            }
        }
        for (o, v) in out_row.iter_mut().zip(acc) {
            *o = T::from_f64(v);
        }
    };

    #[cfg(feature = "rayon")]
    if m * n >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(n)
            .enumerate()
            .for_each(|(i, out_row)| row(i, out_row));
        return;
    }

    out.chunks_mut(n)
        .enumerate()
        .for_each(|(i, out_row)| row(i, out_row));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_2x3_3x2() {
        let a = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0f64, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut out = [0.0f64; 4];
        matmul_kernel(&a, &b, &mut out, 2, 2, 3);
        assert_eq!(out, [58.0, 64.0, 139.0, 154.0]);
    }
}
