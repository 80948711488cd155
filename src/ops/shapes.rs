//! Output-shape rules shared by the kernels

use crate::tensor::broadcast_shapes;

/// Shape of `[..., m, k] @ [..., k, n]`
///
/// Batch dimensions broadcast. `None` if either operand has rank below two,
/// the inner dimensions differ, or the batches do not broadcast.
pub fn matmul_output_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let (a_batch, a_mat) = a.split_at(a.len().checked_sub(2)?);
    let (b_batch, b_mat) = b.split_at(b.len().checked_sub(2)?);
    if a_mat[1] != b_mat[0] {
        return None;
    }
    let mut out = broadcast_shapes(a_batch, b_batch)?.to_vec();
    out.extend([a_mat[0], b_mat[1]]);
    Some(out)
}

/// Shape left after summing over `dims`
///
/// With `keepdim` the reduced axes stay as size 1.
pub fn reduce_output_shape(shape: &[usize], dims: &[usize], keepdim: bool) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .filter_map(|(axis, &len)| match (dims.contains(&axis), keepdim) {
            (false, _) => Some(len),
            (true, true) => Some(1),
            (true, false) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_shapes() {
        assert_eq!(matmul_output_shape(&[2, 3], &[3, 4]), Some(vec![2, 4]));
        assert_eq!(matmul_output_shape(&[5, 2, 3], &[3, 4]), Some(vec![5, 2, 4]));
        assert_eq!(matmul_output_shape(&[5, 1, 2, 3], &[7, 3, 4]), Some(vec![5, 7, 2, 4]));
        assert_eq!(matmul_output_shape(&[2, 3], &[2, 4]), None);
        assert_eq!(matmul_output_shape(&[3], &[3, 4]), None);
    }

    #[test]
    fn test_reduce_shapes() {
        assert_eq!(reduce_output_shape(&[2, 3, 4], &[1], false), vec![2, 4]);
        assert_eq!(reduce_output_shape(&[2, 3, 4], &[1], true), vec![2, 1, 4]);
        assert!(reduce_output_shape(&[2, 3], &[0, 1], false).is_empty());
    }
}
