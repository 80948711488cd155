//! Eigendecomposition for symmetric matrices using the two-sided Jacobi method

use super::super::{CpuClient, CpuRuntime, CpuTensor};
use super::LinalgElement;
use crate::algorithm::linalg::{
    EigenDecomposition, from_working_dtype, to_working_dtype, validate_linalg_dtype,
    validate_square_matrix,
};
use crate::dtype::DType;
use crate::error::{Error, Result};

const MAX_SWEEPS: usize = 30;

/// Eigendecomposition of every symmetric matrix in the batch
pub fn eig_decompose_symmetric_impl(
    client: &CpuClient,
    a: &CpuTensor,
) -> Result<EigenDecomposition<CpuRuntime>> {
    validate_linalg_dtype(a.dtype())?;
    let (batch, n) = validate_square_matrix(a.shape())?;
    let (a, original_dtype) = to_working_dtype(client, a)?;

    let result = match a.dtype() {
        DType::F32 => eig_batched::<f32>(client, &a, batch, n),
        DType::F64 => eig_batched::<f64>(client, &a, batch, n),
        other => Err(Error::unsupported_dtype(other, "eig_decompose_symmetric")),
    }?;

    Ok(EigenDecomposition {
        eigenvalues: from_working_dtype(client, result.eigenvalues, original_dtype)?,
        eigenvectors: from_working_dtype(client, result.eigenvectors, original_dtype)?,
    })
}

fn eig_batched<T: LinalgElement>(
    client: &CpuClient,
    a: &CpuTensor,
    batch: usize,
    n: usize,
) -> Result<EigenDecomposition<CpuRuntime>> {
    let a_data: Vec<T> = a.to_vec();
    let mut values: Vec<T> = Vec::with_capacity(batch * n);
    let mut vectors: Vec<T> = Vec::with_capacity(batch * n * n);

    for i in 0..batch {
        let mut solver = SymmetricJacobi::new(&a_data[i * n * n..(i + 1) * n * n], n);
        solver.run();
        let (lambda, v) = solver.into_sorted();
        values.extend(lambda);
        vectors.extend(v);
    }

    let batch_shape = &a.shape()[..a.ndim() - 2];
    let mut value_shape = batch_shape.to_vec();
    value_shape.push(n);

    Ok(EigenDecomposition {
        eigenvalues: CpuTensor::try_from_slice(&values, &value_shape, &client.device)?,
        eigenvectors: CpuTensor::try_from_slice(&vectors, a.shape(), &client.device)?,
    })
}

/// Working state of one Jacobi eigensolve
///
/// `work` converges to `diag(λ)` while `v` accumulates the rotations, so that
/// `A = V diag(λ) Vᵀ` holds throughout.
struct SymmetricJacobi<T> {
    work: Vec<T>,
    v: Vec<T>,
    n: usize,
    tol: f64,
}

impl<T: LinalgElement> SymmetricJacobi<T> {
    /// Start from the symmetrized lower triangle of `a` and `V = I`
    fn new(a: &[T], n: usize) -> Self {
        let mut work = vec![T::zero(); n * n];
        let mut frob_sq = 0.0f64;
        for i in 0..n {
            for j in 0..=i {
                let val = a[i * n + j];
                work[i * n + j] = val;
                work[j * n + i] = val;
                let sq = val.to_f64() * val.to_f64();
                frob_sq += if i == j { sq } else { 2.0 * sq };
            }
        }

        let mut v = vec![T::zero(); n * n];
        for i in 0..n {
            v[i * n + i] = T::one();
        }

        // Relative to the matrix scale; the zero matrix is already diagonal
        let tol = (n as f64) * T::epsilon_val() * frob_sq.sqrt().max(f64::MIN_POSITIVE);
        Self { work, v, n, tol }
    }

    fn max_off_diagonal(&self) -> f64 {
        let n = self.n;
        let mut max = 0.0f64;
        for i in 0..n {
            for j in (i + 1)..n {
                max = max.max(self.work[i * n + j].abs_val().to_f64());
            }
        }
        max
    }

    fn run(&mut self) {
        for _ in 0..MAX_SWEEPS {
            if self.max_off_diagonal() < self.tol {
                return;
            }
            for p in 0..self.n {
                for q in (p + 1)..self.n {
                    self.rotate(p, q);
                }
            }
        }
    }

    /// Zero `work[p, q]` with `A' = Jᵀ A J` and fold `J` into `V`
    fn rotate(&mut self, p: usize, q: usize) {
        let n = self.n;
        let a_pq = self.work[p * n + q].to_f64();
        if a_pq.abs() < self.tol {
            return;
        }
        let a_pp = self.work[p * n + p].to_f64();
        let a_qq = self.work[q * n + q].to_f64();

        // LAPACK-style stable rotation: t = sign(τ) / (|τ| + sqrt(1 + τ²))
        let tau = (a_qq - a_pp) / (2.0 * a_pq);
        let t = tau.signum() / (tau.abs() + (1.0 + tau * tau).sqrt());
        let c = 1.0 / (1.0 + t * t).sqrt();
        let s = t * c;
        let (ct, st) = (T::from_f64(c), T::from_f64(s));

        for k in 0..n {
            if k == p || k == q {
                continue;
            }
            let a_kp = self.work[k * n + p];
            let a_kq = self.work[k * n + q];
            let new_kp = ct * a_kp - st * a_kq;
            let new_kq = st * a_kp + ct * a_kq;
            self.work[k * n + p] = new_kp;
            self.work[p * n + k] = new_kp;
            self.work[k * n + q] = new_kq;
            self.work[q * n + k] = new_kq;
        }

        self.work[p * n + p] = T::from_f64(a_pp - t * a_pq);
        self.work[q * n + q] = T::from_f64(a_qq + t * a_pq);
        self.work[p * n + q] = T::zero();
        self.work[q * n + p] = T::zero();

        for k in 0..n {
            let v_kp = self.v[k * n + p];
            let v_kq = self.v[k * n + q];
            self.v[k * n + p] = ct * v_kp - st * v_kq;
            self.v[k * n + q] = st * v_kp + ct * v_kq;
        }
    }

    /// Eigenvalues sorted by magnitude (descending) with matching eigenvector columns
    fn into_sorted(self) -> (Vec<T>, Vec<T>) {
        let n = self.n;
        let lambda: Vec<T> = (0..n).map(|i| self.work[i * n + i]).collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| {
            lambda[j]
                .abs_val()
                .to_f64()
                .total_cmp(&lambda[i].abs_val().to_f64())
        });

        let sorted_lambda = order.iter().map(|&i| lambda[i]).collect();
        let mut sorted_v = vec![T::zero(); n * n];
        for (new_col, &old_col) in order.iter().enumerate() {
            for row in 0..n {
                sorted_v[row * n + new_col] = self.v[row * n + old_col];
            }
        }
        (sorted_lambda, sorted_v)
    }
}
