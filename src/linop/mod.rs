//! Structured linear operators
//!
//! A [`LinearOperator`] is a square matrix known through its action. The
//! family here composes into the covariance structure of multi-output
//! Gaussian processes:
//!
//! ```text
//! LinearOperator<R>
//!   ├── DenseOperator                      explicit matrix
//!   ├── DiagOperator                       diagonal, stored as [..., n]
//!   ├── KroneckerProductOperator           A_1 ⊗ ... ⊗ A_m, factor-wise
//!   ├── AddedDiagOperator                  A + D, conjugate gradients
//!   └── KroneckerProductAddedDiagOperator  K + D, eigendecomposition shortcut
//! ```
//!
//! Operators share their data through reference-counted tensors and
//! compose as `Arc<dyn LinearOperator<R>>`. Every operation takes the
//! runtime client explicitly.

mod added_diag;
mod dense;
mod diag;
mod helpers;
mod kronecker;
mod kronecker_added_diag;
mod root;
mod traits;
mod types;

pub use added_diag::AddedDiagOperator;
pub use dense::DenseOperator;
pub use diag::DiagOperator;
pub use kronecker::KroneckerProductOperator;
pub use kronecker_added_diag::KroneckerProductAddedDiagOperator;
pub use root::RootOperator;
pub use traits::LinearOperator;
pub use types::{AddedDiagOptions, InvQuadLogdet, Preconditioner, PreconditionerFn};
