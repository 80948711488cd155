//! Shape and dtype checks shared by the factorization backends

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::TypeConversionOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use std::borrow::Cow;

/// `(batch, rows, cols)` of a tensor of rank at least two
///
/// `batch` multiplies out the leading dimensions, so it is 1 for a plain
/// matrix.
pub fn validate_matrix_batch(shape: &[usize]) -> Result<(usize, usize, usize)> {
    let Some(split) = shape.len().checked_sub(2) else {
        return Err(Error::invalid_argument(
            "shape",
            format!("need a matrix, got shape {shape:?}"),
        ));
    };
    let (batch, mat) = shape.split_at(split);
    Ok((batch.iter().product(), mat[0], mat[1]))
}

/// `(batch, n)` of a stack of square matrices
pub fn validate_square_matrix(shape: &[usize]) -> Result<(usize, usize)> {
    match validate_matrix_batch(shape)? {
        (batch, rows, cols) if rows == cols => Ok((batch, rows)),
        (_, rows, cols) => Err(Error::ShapeMismatch {
            expected: vec![rows, rows],
            got: vec![rows, cols],
        }),
    }
}

/// Rejects dtypes the factorizations cannot handle
pub fn validate_linalg_dtype(dtype: DType) -> Result<()> {
    if !dtype.is_float() {
        return Err(Error::unsupported_dtype(dtype, "linear algebra"));
    }
    Ok(())
}

/// The dtype a factorization actually runs in
///
/// F16 and BF16 lack the range for pivots and rotations, so they run in F32.
pub fn linalg_working_dtype(dtype: DType) -> DType {
    match dtype {
        DType::F16 | DType::BF16 => DType::F32,
        other => other,
    }
}

/// Cast to the working dtype, borrowing when no cast is needed
///
/// Returns the original dtype alongside for [`from_working_dtype`].
pub fn to_working_dtype<'a, R, C>(client: &C, t: &'a Tensor<R>) -> Result<(Cow<'a, Tensor<R>>, DType)>
where
    R: Runtime,
    C: TypeConversionOps<R>,
{
    let original = t.dtype();
    let working = linalg_working_dtype(original);
    let t = if working == original {
        Cow::Borrowed(t)
    } else {
        Cow::Owned(client.cast(t, working)?)
    };
    Ok((t, original))
}

/// Undo [`to_working_dtype`] on a result
pub fn from_working_dtype<R, C>(client: &C, t: Tensor<R>, original: DType) -> Result<Tensor<R>>
where
    R: Runtime,
    C: TypeConversionOps<R>,
{
    if t.dtype() == original {
        return Ok(t);
    }
    client.cast(&t, original)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_validation() {
        assert_eq!(validate_square_matrix(&[3, 3]).unwrap(), (1, 3));
        assert_eq!(validate_square_matrix(&[2, 4, 3, 3]).unwrap(), (8, 3));
        assert!(matches!(
            validate_square_matrix(&[2, 3]),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            validate_square_matrix(&[3]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_half_precision_runs_in_f32() {
        assert_eq!(linalg_working_dtype(DType::F64), DType::F64);
        assert_eq!(linalg_working_dtype(DType::F32), DType::F32);
        assert_eq!(linalg_working_dtype(DType::F16), DType::F32);
        assert_eq!(linalg_working_dtype(DType::BF16), DType::F32);
    }
}
