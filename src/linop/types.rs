//! Result and configuration types shared by the operator family

use std::fmt;
use std::sync::Arc;

use super::diag::DiagOperator;
use crate::algorithm::iterative::CgOptions;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Preconditioner application `r ↦ M⁻¹ r` on `[..., n, k]` tensors
pub type PreconditionerFn<R> = Arc<dyn Fn(&Tensor<R>) -> Result<Tensor<R>> + Send + Sync>;

/// Inverse quadratic form and log-determinant, each present only when requested
#[derive(Clone, Debug)]
pub struct InvQuadLogdet<R: Runtime> {
    /// `Σ_rows rhs ∘ A⁻¹ rhs`: `[..., k]`, or `[...]` when reduced
    pub inv_quad: Option<Tensor<R>>,
    /// `log |A|`: `[...]`
    pub logdet: Option<Tensor<R>>,
}

/// Preconditioner for iterative solves
///
/// Every part is optional; [`Preconditioner::none`] disables preconditioning.
#[derive(Clone)]
pub struct Preconditioner<R: Runtime> {
    /// Applies the inverse of the preconditioner
    pub apply: Option<PreconditionerFn<R>>,
    /// The preconditioner itself, as an operator
    pub operator: Option<DiagOperator<R>>,
    /// Correction to a log-determinant estimated through the preconditioner
    pub logdet_correction: Option<Tensor<R>>,
}

impl<R: Runtime> Preconditioner<R> {
    /// No preconditioning
    pub fn none() -> Self {
        Self {
            apply: None,
            operator: None,
            logdet_correction: None,
        }
    }

    /// Preconditioner that only carries an application function
    pub fn from_fn(apply: PreconditionerFn<R>) -> Self {
        Self {
            apply: Some(apply),
            operator: None,
            logdet_correction: None,
        }
    }

    /// Whether this preconditioner does anything
    pub fn is_none(&self) -> bool {
        self.apply.is_none() && self.operator.is_none() && self.logdet_correction.is_none()
    }
}

impl<R: Runtime> fmt::Debug for Preconditioner<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preconditioner")
            .field("apply", &self.apply.as_ref().map(|_| "<fn>"))
            .field("operator", &self.operator)
            .field("logdet_correction", &self.logdet_correction)
            .finish()
    }
}

/// Configuration for [`AddedDiagOperator`](super::AddedDiagOperator)
#[derive(Debug, Clone, Copy, Default)]
pub struct AddedDiagOptions {
    /// Options for the conjugate gradient solve
    pub cg: CgOptions,
}

impl AddedDiagOptions {
    /// Set the conjugate gradient options
    pub fn with_cg(mut self, cg: CgOptions) -> Self {
        self.cg = cg;
        self
    }
}
