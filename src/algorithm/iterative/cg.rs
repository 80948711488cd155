//! Batched preconditioned Conjugate Gradient
//!
//! Preconditioned CG (Hestenes-Stiefel) run on every column of the
//! right-hand side at once. Each column keeps its own step sizes and stops
//! updating once it meets the tolerance.

use crate::error::{Error, Result};
use crate::ops::TensorOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::helpers::{BREAKDOWN_TOL, column_dots, scale_columns};
use super::types::{CgOptions, CgResult};

/// Generic batched preconditioned CG
///
/// Algorithm (per column, Hestenes-Stiefel):
/// ```text
/// x = 0, r = b, z = M^-1*r, p = z, rz = <r,z>
/// for iter = 1, 2, ...:
///     Ap = A*p
///     alpha = rz / <p, Ap>
///     x = x + alpha*p
///     r = r - alpha*Ap
///     if ||r|| < atol or ||r||/||b|| < rtol: freeze column
///     z = M^-1*r
///     rz_new = <r, z>
///     beta = rz_new / rz
///     p = z + beta*p
///     rz = rz_new
/// ```
///
/// `b` is `[..., n]` or `[..., n, k]`; `matvec` and `preconditioner` receive
/// and return `[..., n, k]` tensors. Without a preconditioner `M = I`.
pub fn cg_impl<R, C>(
    client: &C,
    matvec: &dyn Fn(&Tensor<R>) -> Result<Tensor<R>>,
    b: &Tensor<R>,
    preconditioner: Option<&dyn Fn(&Tensor<R>) -> Result<Tensor<R>>>,
    options: &CgOptions,
) -> Result<CgResult<R>>
where
    R: Runtime,
    C: TensorOps<R>,
{
    if b.ndim() == 0 {
        return Err(Error::invalid_argument(
            "b",
            "right-hand side must have at least one dimension",
        ));
    }
    let vector_rhs = b.ndim() == 1;
    let b = if vector_rhs {
        b.unsqueeze(-1)?
    } else {
        b.clone()
    };

    let apply_precond = |r: &Tensor<R>| -> Result<Tensor<R>> {
        match preconditioner {
            Some(m_inv) => m_inv(r),
            None => Ok(r.clone()),
        }
    };

    let rtol = options.rtol.max(10.0 * b.dtype().epsilon());
    let b_norms: Vec<f64> = column_dots(client, &b, &b)?
        .into_iter()
        .map(f64::sqrt)
        .collect();
    let is_done = |res: f64, b_norm: f64| res < options.atol || res <= rtol * b_norm;

    let mut x = Tensor::<R>::try_zeros(b.shape(), b.dtype(), b.device())?;
    let mut r = b.clone();
    let mut res_norms = b_norms.clone();
    let mut active: Vec<bool> = b_norms.iter().map(|&bn| !is_done(bn, bn)).collect();

    let finish = |x: Tensor<R>,
                  iterations: usize,
                  res_norms: &[f64],
                  converged: bool|
     -> Result<CgResult<R>> {
        let residual_norm = res_norms.iter().copied().fold(0.0, f64::max);
        if converged {
            tracing::debug!(iterations, residual_norm, "cg converged");
        } else {
            tracing::warn!(iterations, residual_norm, "cg stopped without converging");
        }
        let solution = if vector_rhs { x.squeeze(Some(-1)) } else { x };
        Ok(CgResult {
            solution,
            iterations,
            residual_norm,
            converged,
        })
    };

    if !active.iter().any(|&a| a) {
        return finish(x, 0, &res_norms, true);
    }

    let mut z = apply_precond(&r)?;
    let mut p = z.clone();
    let mut rz = column_dots(client, &r, &z)?;

    for iter in 0..options.max_iter {
        let ap = matvec(&p)?;
        let p_ap = column_dots(client, &p, &ap)?;

        let mut breakdown = false;
        let alpha: Vec<f64> = (0..active.len())
            .map(|j| {
                if !active[j] {
                    0.0
                } else if p_ap[j].abs() < BREAKDOWN_TOL {
                    breakdown = true;
                    0.0
                } else {
                    rz[j] / p_ap[j]
                }
            })
            .collect();

        x = client.add(&x, &scale_columns(client, &p, &alpha)?)?;
        r = client.sub(&r, &scale_columns(client, &ap, &alpha)?)?;

        res_norms = column_dots(client, &r, &r)?
            .into_iter()
            .map(f64::sqrt)
            .collect();
        for j in 0..active.len() {
            if active[j] && is_done(res_norms[j], b_norms[j]) {
                active[j] = false;
            }
        }

        if !active.iter().any(|&a| a) {
            return finish(x, iter + 1, &res_norms, true);
        }
        if breakdown {
            return finish(x, iter + 1, &res_norms, false);
        }

        z = apply_precond(&r)?;
        let rz_new = column_dots(client, &r, &z)?;

        let mut beta = vec![0.0; active.len()];
        for j in 0..active.len() {
            if !active[j] {
                continue;
            }
            if rz[j].abs() < BREAKDOWN_TOL {
                return finish(x, iter + 1, &res_norms, false);
            }
            beta[j] = rz_new[j] / rz[j];
        }

        p = client.add(&z, &scale_columns(client, &p, &beta)?)?;
        rz = rz_new;
    }

    // Report the true residual rather than the recurrence
    let r_final = client.sub(&b, &matvec(&x)?)?;
    let final_norms: Vec<f64> = column_dots(client, &r_final, &r_final)?
        .into_iter()
        .map(f64::sqrt)
        .collect();
    finish(x, options.max_iter, &final_norms, false)
}
