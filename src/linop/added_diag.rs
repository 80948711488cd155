//! Sum of an operator and a diagonal

use std::sync::Arc;

use super::diag::DiagOperator;
use super::helpers::{inv_quad_logdet_impl, restore_vector, rhs_as_matrix};
use super::traits::LinearOperator;
use super::types::{AddedDiagOptions, InvQuadLogdet, Preconditioner, PreconditionerFn};
use crate::algorithm::iterative::cg_impl;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, LinalgOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// `A + D` for an arbitrary operator `A` and a diagonal `D`
///
/// Solves run preconditioned conjugate gradients with a Jacobi
/// preconditioner unless one is supplied; the log-determinant falls back to
/// a dense Cholesky factorization.
#[derive(Clone, Debug)]
pub struct AddedDiagOperator<R: Runtime> {
    operator: Arc<dyn LinearOperator<R>>,
    diag: DiagOperator<R>,
    preconditioner_override: Option<Preconditioner<R>>,
    options: AddedDiagOptions,
}

impl<R: Runtime> AddedDiagOperator<R> {
    /// Build from two components in either order
    ///
    /// The component that reports itself diagonal through
    /// [`LinearOperator::as_diag`] becomes `D`; the other becomes `A`.
    ///
    /// # Errors
    ///
    /// - `ComponentCount` unless exactly two components are given
    /// - `ShapeMismatch` / `DTypeMismatch` if the components disagree
    /// - `DiagonalComponent` unless exactly one component is diagonal
    pub fn new(
        components: Vec<Arc<dyn LinearOperator<R>>>,
        preconditioner_override: Option<Preconditioner<R>>,
        options: AddedDiagOptions,
    ) -> Result<Self> {
        let [first, second]: [Arc<dyn LinearOperator<R>>; 2] = components
            .try_into()
            .map_err(|c: Vec<_>| Error::ComponentCount { got: c.len() })?;

        if first.shape() != second.shape() {
            return Err(Error::shape_mismatch(first.shape(), second.shape()));
        }
        if first.dtype() != second.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: first.dtype(),
                rhs: second.dtype(),
            });
        }

        let (operator, diag) = match (first.as_diag(), second.as_diag()) {
            (Some(d), None) => (second.clone(), d.clone()),
            (None, Some(d)) => (first.clone(), d.clone()),
            (Some(_), Some(_)) => return Err(Error::DiagonalComponent { found: 2 }),
            (None, None) => return Err(Error::DiagonalComponent { found: 0 }),
        };

        tracing::debug!(
            shape = ?operator.shape(),
            dtype = %operator.dtype(),
            preconditioner_override = preconditioner_override.is_some(),
            "added-diagonal operator"
        );
        Ok(Self {
            operator,
            diag,
            preconditioner_override,
            options,
        })
    }

    /// The non-diagonal component `A`
    pub fn operator(&self) -> &Arc<dyn LinearOperator<R>> {
        &self.operator
    }

    /// The diagonal component `D`
    pub fn diag_operator(&self) -> &DiagOperator<R> {
        &self.diag
    }

    /// Preconditioner used by [`solve_with`](Self::solve_with)
    ///
    /// The override when one was supplied, otherwise Jacobi:
    /// `r ↦ r / diag(A + D)`.
    pub fn preconditioner(&self, client: &R::Client) -> Result<Preconditioner<R>> {
        if let Some(p) = &self.preconditioner_override {
            return Ok(p.clone());
        }
        let diagonal = self.diagonal(client)?;
        let column = diagonal.unsqueeze(-1)?;
        let jacobi_client = client.clone();
        let apply: PreconditionerFn<R> = Arc::new(move |r: &Tensor<R>| jacobi_client.div(r, &column));
        Ok(Preconditioner {
            apply: Some(apply),
            operator: Some(DiagOperator::new(diagonal)?),
            logdet_correction: None,
        })
    }

    /// `(A + D)⁻¹ rhs` by preconditioned conjugate gradients
    ///
    /// Uses [`preconditioner`](Self::preconditioner) when `preconditioner`
    /// is `None`. `num_tridiag` requests Lanczos tridiagonalizations, which
    /// this solver does not produce.
    pub fn solve_with(
        &self,
        client: &R::Client,
        rhs: &Tensor<R>,
        preconditioner: Option<&Preconditioner<R>>,
        num_tridiag: usize,
    ) -> Result<Tensor<R>> {
        let _ = num_tridiag;
        let (rhs, is_vector) = rhs_as_matrix(self.shape(), rhs)?;

        let default_preconditioner;
        let preconditioner = match preconditioner {
            Some(p) => p,
            None => {
                default_preconditioner = self.preconditioner(client)?;
                &default_preconditioner
            }
        };
        let apply = preconditioner
            .apply
            .as_deref()
            .map(|f| f as &dyn Fn(&Tensor<R>) -> Result<Tensor<R>>);

        let matvec = |x: &Tensor<R>| self.matmul(client, x);
        let result = cg_impl(client, &matvec, &rhs, apply, &self.options.cg)?;
        tracing::debug!(
            iterations = result.iterations,
            residual_norm = result.residual_norm,
            converged = result.converged,
            "added-diagonal solve"
        );
        Ok(restore_vector(result.solution, is_vector))
    }

    /// Inverse quadratic form and log-determinant with an explicit solve
    ///
    /// `solve` maps `[..., n, k]` right-hand sides to `(A + D)⁻¹ rhs`. The
    /// log-determinant is computed only for `logdet == Some(true)`.
    pub fn inv_quad_logdet_with(
        &self,
        client: &R::Client,
        inv_quad_rhs: Option<&Tensor<R>>,
        logdet: Option<bool>,
        reduce_inv_quad: bool,
        solve: &dyn Fn(&Tensor<R>) -> Result<Tensor<R>>,
    ) -> Result<InvQuadLogdet<R>> {
        inv_quad_logdet_impl(self, client, inv_quad_rhs, logdet, reduce_inv_quad, solve)
    }
}

impl<R: Runtime> LinearOperator<R> for AddedDiagOperator<R> {
    fn shape(&self) -> &[usize] {
        self.operator.shape()
    }

    fn dtype(&self) -> DType {
        self.operator.dtype()
    }

    fn device(&self) -> &R::Device {
        self.operator.device()
    }

    fn matmul(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        let ax = self.operator.matmul(client, rhs)?;
        let dx = self.diag.matmul(client, rhs)?;
        client.add(&ax, &dx)
    }

    fn to_dense(&self, client: &R::Client) -> Result<Tensor<R>> {
        let dense = self.operator.to_dense(client)?;
        client.add(&dense, &client.diag_embed(self.diag.diag())?)
    }

    fn diagonal(&self, client: &R::Client) -> Result<Tensor<R>> {
        client.add(&self.operator.diagonal(client)?, self.diag.diag())
    }

    fn solve(&self, client: &R::Client, rhs: &Tensor<R>) -> Result<Tensor<R>> {
        self.solve_with(client, rhs, None, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::iterative::CgOptions;
    use crate::linop::DenseOperator;
    use crate::ops::MatmulOps;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn components(device: &CpuDevice) -> (Arc<dyn LinearOperator<CpuRuntime>>, Arc<dyn LinearOperator<CpuRuntime>>) {
        let a = Tensor::<CpuRuntime>::from_slice(
            &[3.0f64, 1.0, 0.0, 1.0, 2.0, 0.5, 0.0, 0.5, 1.0],
            &[3, 3],
            device,
        );
        let dense: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(DenseOperator::new(a).unwrap());
        let diag: Arc<dyn LinearOperator<CpuRuntime>> = Arc::new(
            DiagOperator::new(Tensor::<CpuRuntime>::from_slice(&[0.1f64, 0.2, 0.3], &[3], device)).unwrap(),
        );
        (dense, diag)
    }

    fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-12, "{g} vs {w}");
        }
    }

    #[test]
    fn test_role_assignment_is_order_independent() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let (dense, diag) = components(&device);

        let ab = AddedDiagOperator::new(vec![dense.clone(), diag.clone()], None, AddedDiagOptions::default()).unwrap();
        let ba = AddedDiagOperator::new(vec![diag, dense], None, AddedDiagOptions::default()).unwrap();
        assert_eq!(ab.diag_operator().diag().to_vec::<f64>(), vec![0.1, 0.2, 0.3]);
        assert_eq!(
            ab.to_dense(&client).unwrap().to_vec::<f64>(),
            ba.to_dense(&client).unwrap().to_vec::<f64>()
        );
        assert_close(&ab.diagonal(&client).unwrap().to_vec::<f64>(), &[3.1, 2.2, 1.3]);
    }

    #[test]
    fn test_construction_errors() {
        let device = CpuDevice::new();
        let (dense, diag) = components(&device);
        let opts = AddedDiagOptions::default();

        assert!(matches!(
            AddedDiagOperator::new(vec![dense.clone()], None, opts),
            Err(Error::ComponentCount { got: 1 })
        ));
        assert!(matches!(
            AddedDiagOperator::new(vec![dense.clone(), diag.clone(), diag.clone()], None, opts),
            Err(Error::ComponentCount { got: 3 })
        ));
        assert!(matches!(
            AddedDiagOperator::new(vec![dense.clone(), dense], None, opts),
            Err(Error::DiagonalComponent { found: 0 })
        ));
        assert!(matches!(
            AddedDiagOperator::new(vec![diag.clone(), diag], None, opts),
            Err(Error::DiagonalComponent { found: 2 })
        ));
    }

    #[test]
    fn test_cg_solve_matches_dense() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let (dense, diag) = components(&device);
        let options = AddedDiagOptions::default().with_cg(CgOptions::default().with_rtol(1e-12));
        let op = AddedDiagOperator::new(vec![dense, diag], None, options).unwrap();

        let b = Tensor::<CpuRuntime>::from_slice(&[1.0f64, -2.0, 0.5, 0.0, 1.0, 3.0], &[3, 2], &device);
        let x = op.solve(&client, &b).unwrap();
        let ax = client.matmul(&op.to_dense(&client).unwrap(), &x).unwrap();
        for (got, want) in ax.to_vec::<f64>().iter().zip(b.to_vec::<f64>()) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn test_preconditioner_override_is_used() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let (dense, diag) = components(&device);

        let jacobi = AddedDiagOperator::new(vec![dense.clone(), diag.clone()], None, AddedDiagOptions::default())
            .unwrap()
            .preconditioner(&client)
            .unwrap();
        assert!(jacobi.apply.is_some());
        assert_close(
            &jacobi.operator.as_ref().unwrap().diag().to_vec::<f64>(),
            &[3.1, 2.2, 1.3],
        );

        let op = AddedDiagOperator::new(vec![dense, diag], Some(Preconditioner::none()), AddedDiagOptions::default())
            .unwrap();
        assert!(op.preconditioner(&client).unwrap().is_none());

        let b = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);
        let x = op.solve(&client, &b).unwrap();
        assert_eq!(x.shape(), &[3]);
        let ax = op.matmul(&client, &x).unwrap().to_vec::<f64>();
        for (got, want) in ax.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-8, "{got} vs {want}");
        }
    }

    #[test]
    fn test_inv_quad_logdet_generic() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let (dense, diag) = components(&device);
        let op = AddedDiagOperator::new(vec![dense, diag], None, AddedDiagOptions::default()).unwrap();

        let b = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 0.0, 2.0, 1.0, 0.0, -1.0], &[3, 2], &device);
        let out = op.inv_quad_logdet(&client, Some(&b), Some(false), false).unwrap();
        assert!(out.logdet.is_none());
        let per_column = out.inv_quad.unwrap();
        assert_eq!(per_column.shape(), &[2]);

        let out = op.inv_quad_logdet(&client, Some(&b), Some(true), true).unwrap();
        let total = out.inv_quad.unwrap().item::<f64>();
        let cols = per_column.to_vec::<f64>();
        assert!((total - cols[0] - cols[1]).abs() < 1e-8);

        let dense_logdet = DenseOperator::new(op.to_dense(&client).unwrap())
            .unwrap()
            .logdet(&client)
            .unwrap()
            .item::<f64>();
        assert!((out.logdet.unwrap().item::<f64>() - dense_logdet).abs() < 1e-10);
    }
}
