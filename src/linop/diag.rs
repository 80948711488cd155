//! Diagonal operator

use super::helpers::{restore_vector, rhs_as_matrix, with_dims};
use super::root::RootOperator;
use super::traits::LinearOperator;
use crate::algorithm::linalg::{EigenDecomposition, validate_linalg_dtype};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, LinalgOps, ReduceOps, UnaryOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Diagonal matrix stored as its diagonal `[..batch, n]`
#[derive(Clone, Debug)]
pub struct DiagOperator<R: Runtime> {
    diag: Tensor<R>,
    shape: Vec<usize>,
}

impl<R: Runtime> DiagOperator<R> {
    /// Wrap a `[..batch, n]` diagonal
    pub fn new(diag: Tensor<R>) -> Result<Self> {
        let n = *diag.shape().last().ok_or_else(|| {
            Error::invalid_argument("diag", "diagonal needs at least one dimension")
        })?;
        validate_linalg_dtype(diag.dtype())?;
        let shape = with_dims(diag.shape(), &[n]);
        Ok(Self { diag, shape })
    }

    /// `value · I` of size `n`
    pub fn constant(value: f64, n: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        Self::new(Tensor::try_full(&[n], value, dtype, device)?)
    }

    /// The diagonal entries
    pub fn diag(&self) -> &Tensor<R> {
        &self.diag
    }

    fn identity(&self, client: &R::Client) -> Result<Tensor<R>> {
        let ones = Tensor::try_full(self.diag.shape(), 1.0, self.diag.dtype(), self.diag.device())?;
        client.diag_embed(&ones)
    }
}

impl<R: Runtime> LinearOperator<R> for DiagOperator<R> {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn dtype(&self) -> DType {
        self.diag.dtype()
    }

    fn device(&self) -> &R::Device {
        self.diag.device()
    }

    fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let (rhs, is_vector) = rhs_as_matrix(&self.shape, rhs)?;
        let out = client.mul(&self.diag.unsqueeze(-1)?, &rhs)?;
        Ok(restore_vector(out, is_vector))
    }

    fn to_dense(&self, client: &R::Client) -> Result<Tensor<R>> {
        client.diag_embed(&self.diag)
    }

    fn diagonal(&self, _client: &R::Client) -> Result<Tensor<R>> {
        Ok(self.diag.clone())
    }

    fn symeig(&self, client: &R::Client) -> Result<EigenDecomposition<R>> {
        Ok(EigenDecomposition {
            eigenvalues: self.diag.clone(),
            eigenvectors: self.identity(client)?,
        })
    }

    fn as_diag(&self) -> Option<&DiagOperator<R>> {
        Some(self)
    }

    fn solve(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let (rhs, is_vector) = rhs_as_matrix(&self.shape, rhs)?;
        let out = client.div(&rhs, &self.diag.unsqueeze(-1)?)?;
        Ok(restore_vector(out, is_vector))
    }

    fn logdet(&self, client: &R::Client) -> Result<Tensor<R>> {
        let log_diag = client.log(&self.diag)?;
        client.sum(&log_diag, &[log_diag.ndim() - 1], false)
    }

    fn root_decomposition(&self, client: &R::Client) -> Result<RootOperator<R>> {
        RootOperator::new(self.identity(client)?, client.sqrt(&self.diag)?)
    }

    fn root_inv_decomposition(
        &self,
        client: &R::Client,
        _initial_vectors: Option<&Tensor<R>>,
    ) -> Result<RootOperator<R>> {
        let inv_sqrt = client.recip(&client.sqrt(&self.diag)?)?;
        RootOperator::new(self.identity(client)?, inv_sqrt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_constant_diag() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let d = DiagOperator::<CpuRuntime>::constant(0.5, 3, DType::F64, &device).unwrap();
        assert_eq!(d.shape(), &[3, 3]);
        assert!(d.as_diag().is_some());
        assert_eq!(
            d.to_dense(&client).unwrap().to_vec::<f64>(),
            vec![0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.5]
        );
    }

    #[test]
    fn test_diag_matmul_solve_logdet() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let d = DiagOperator::new(Tensor::<CpuRuntime>::from_slice(&[2.0f64, 4.0], &[2], &device)).unwrap();
        let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);

        assert_eq!(d.matmul(&client, &x).unwrap().to_vec::<f64>(), vec![2.0, 4.0, 12.0, 16.0]);
        assert_eq!(d.solve(&client, &x).unwrap().to_vec::<f64>(), vec![0.5, 1.0, 0.75, 1.0]);
        assert!((d.logdet(&client).unwrap().item::<f64>() - 8.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_diag_symeig_and_roots() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let d = DiagOperator::new(Tensor::<CpuRuntime>::from_slice(&[4.0f64, 9.0], &[2], &device)).unwrap();

        let eig = d.symeig(&client).unwrap();
        assert_eq!(eig.eigenvalues.to_vec::<f64>(), vec![4.0, 9.0]);
        assert_eq!(eig.eigenvectors.to_vec::<f64>(), vec![1.0, 0.0, 0.0, 1.0]);

        let root = d.root_decomposition(&client).unwrap().root(&client).unwrap();
        assert_eq!(root.to_vec::<f64>(), vec![2.0, 0.0, 0.0, 3.0]);

        let inv_root = d.root_inv_decomposition(&client, None).unwrap().root(&client).unwrap();
        let got = inv_root.to_vec::<f64>();
        assert!((got[0] - 0.5).abs() < 1e-12);
        assert!((got[3] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_batched_diag_shape() {
        let device = CpuDevice::new();
        let d = DiagOperator::new(Tensor::<CpuRuntime>::ones(&[3, 2], DType::F32, &device)).unwrap();
        assert_eq!(d.shape(), &[3, 2, 2]);
        assert_eq!(d.batch_shape(), &[3]);
        assert_eq!(d.size(), 2);
    }
}
