//! Lazy matrix roots

use super::helpers::{restore_vector, rhs_as_matrix, with_dims};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, MatmulOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Root `R = Q · diag(s)` kept in factored form
///
/// `Q` is `[..., n, m]` and `s` is `[..., m]`. For eigen-based roots `Q`
/// holds eigenvectors and `s` a function of the eigenvalues.
#[derive(Clone, Debug)]
pub struct RootOperator<R: Runtime> {
    left: Tensor<R>,
    scale: Tensor<R>,
}

impl<R: Runtime> RootOperator<R> {
    /// Build from `Q: [..., n, m]` and `s: [..., m]`
    pub fn new(left: Tensor<R>, scale: Tensor<R>) -> Result<Self> {
        if left.ndim() < 2 {
            return Err(Error::invalid_argument(
                "left",
                "root factor must be at least 2-D",
            ));
        }
        let m = left.shape()[left.ndim() - 1];
        let expected = with_dims(&left.shape()[..left.ndim() - 2], &[m]);
        if scale.shape() != expected.as_slice() {
            return Err(Error::shape_mismatch(&expected, scale.shape()));
        }
        if left.dtype() != scale.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: left.dtype(),
                rhs: scale.dtype(),
            });
        }
        Ok(Self { left, scale })
    }

    /// `Q`
    pub fn left(&self) -> &Tensor<R> {
        &self.left
    }

    /// `s`
    pub fn scale(&self) -> &Tensor<R> {
        &self.scale
    }

    /// Shape of `R`
    pub fn shape(&self) -> &[usize] {
        self.left.shape()
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.left.dtype()
    }

    /// Dense `R`
    pub fn root(&self, client: &R::Client) -> Result<Tensor<R>> {
        client.mul(&self.left, &self.scale.unsqueeze(-2)?)
    }

    /// `R @ rhs`
    pub fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let (rhs, is_vector) = rhs_as_matrix(self.shape(), rhs)?;
        let scaled = client.mul(&self.scale.unsqueeze(-1)?, &rhs)?;
        Ok(restore_vector(client.matmul(&self.left, &scaled)?, is_vector))
    }

    /// `Rᵀ @ rhs`
    pub fn t_matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let left_t = self.left.transpose(-2, -1)?;
        let (rhs, is_vector) = rhs_as_matrix(left_t.shape(), rhs)?;
        let projected = client.matmul(&left_t, &rhs)?;
        let scaled = client.mul(&self.scale.unsqueeze(-1)?, &projected)?;
        Ok(restore_vector(scaled, is_vector))
    }

    /// `R Rᵀ`
    pub fn to_dense(&self, client: &R::Client) -> Result<Tensor<R>> {
        let root = self.root(client)?;
        client.matmul(&root, &root.transpose(-2, -1)?)
    }
}
