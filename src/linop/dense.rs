//! Operator backed by an explicit matrix

use super::helpers::{restore_vector, rhs_as_matrix};
use super::traits::LinearOperator;
use crate::algorithm::linalg::{validate_linalg_dtype, validate_square_matrix};
use crate::dtype::DType;
use crate::error::Result;
use crate::ops::MatmulOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Symmetric matrix `[..batch, n, n]` held densely
#[derive(Clone, Debug)]
pub struct DenseOperator<R: Runtime> {
    matrix: Tensor<R>,
}

impl<R: Runtime> DenseOperator<R> {
    /// Wrap a square floating-point matrix
    pub fn new(matrix: Tensor<R>) -> Result<Self> {
        validate_square_matrix(matrix.shape())?;
        validate_linalg_dtype(matrix.dtype())?;
        Ok(Self { matrix })
    }

    /// The wrapped matrix
    pub fn matrix(&self) -> &Tensor<R> {
        &self.matrix
    }
}

impl<R: Runtime> LinearOperator<R> for DenseOperator<R> {
    fn shape(&self) -> &[usize] {
        self.matrix.shape()
    }

    fn dtype(&self) -> DType {
        self.matrix.dtype()
    }

    fn device(&self) -> &R::Device {
        self.matrix.device()
    }

    fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let (rhs, is_vector) = rhs_as_matrix(self.shape(), rhs)?;
        Ok(restore_vector(client.matmul(&self.matrix, &rhs)?, is_vector))
    }

    fn to_dense(&self, _client: &R::Client) -> Result<Tensor<R>> {
        Ok(self.matrix.clone())
    }
}
