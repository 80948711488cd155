//! Integration tests for the decompositions and iterative solver
//!
//! Tests verify:
//! - Eigenvalue equation A @ V ≈ V @ diag(λ) and V^T @ V ≈ I, batched
//! - Eigenvalues sorted by magnitude descending
//! - Cholesky reconstruction and triangular solves
//! - Conjugate gradients against a direct solve

use linopr::algorithm::iterative::{CgOptions, cg_impl};
use linopr::algorithm::linalg::LinearAlgebraAlgorithms;
use linopr::dtype::DType;
use linopr::error::Error;
use linopr::ops::{BinaryOps, MatmulOps};
use linopr::runtime::cpu::CpuRuntime;
use linopr::tensor::Tensor;

mod common;

use common::{assert_allclose_f64, create_cpu_client, identity_data, random_data, random_spd_data};

// ============================================================================
// Symmetric eigendecomposition
// ============================================================================

#[test]
fn test_eig_symmetric_batched() {
    let (client, device) = create_cpu_client();
    let data = [random_spd_data(5, 0.1, 1), random_spd_data(5, 0.1, 2)].concat();
    let a = Tensor::<CpuRuntime>::from_slice(&data, &[2, 5, 5], &device);

    let eig = client.eig_decompose_symmetric(&a).unwrap();
    assert_eq!(eig.eigenvalues.shape(), &[2, 5]);
    assert_eq!(eig.eigenvectors.shape(), &[2, 5, 5]);

    let av = client.matmul(&a, &eig.eigenvectors).unwrap();
    let v_lambda = client
        .mul(&eig.eigenvectors, &eig.eigenvalues.unsqueeze(-2).unwrap())
        .unwrap();
    assert_allclose_f64(&av.to_vec::<f64>(), &v_lambda.to_vec::<f64>(), 1e-10, 1e-10, "A V = V Λ");

    let vt = eig.eigenvectors.transpose(-2, -1).unwrap();
    let vtv = client.matmul(&vt, &eig.eigenvectors).unwrap();
    let eye2 = [identity_data(5), identity_data(5)].concat();
    assert_allclose_f64(&vtv.to_vec::<f64>(), &eye2, 1e-10, 1e-10, "VᵀV");

    let values = eig.eigenvalues.to_vec::<f64>();
    for batch in values.chunks(5) {
        for pair in batch.windows(2) {
            assert!(pair[0].abs() >= pair[1].abs(), "not sorted: {:?}", batch);
        }
    }
}

#[test]
fn test_eig_symmetric_f32() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[2.0f32, 1.0, 1.0, 2.0], &[2, 2], &device);
    let eig = client.eig_decompose_symmetric(&a).unwrap();
    assert_eq!(eig.eigenvalues.dtype(), DType::F32);
    let values = eig.eigenvalues.to_vec::<f32>();
    assert!((values[0] - 3.0).abs() < 1e-5);
    assert!((values[1] - 1.0).abs() < 1e-5);
}

// ============================================================================
// Cholesky and triangular solves
// ============================================================================

#[test]
fn test_cholesky_reconstruct_and_solve() {
    let (client, device) = create_cpu_client();
    let n = 6;
    let a = Tensor::<CpuRuntime>::from_slice(&random_spd_data(n, 0.2, 3), &[n, n], &device);

    let l = client.cholesky_decompose(&a).unwrap().l;
    let llt = client.matmul(&l, &l.transpose(-2, -1).unwrap()).unwrap();
    assert_allclose_f64(&llt.to_vec::<f64>(), &a.to_vec::<f64>(), 1e-12, 1e-12, "L Lᵀ");

    let b = Tensor::<CpuRuntime>::from_slice(&random_data(n * 2, 4), &[n, 2], &device);
    let y = client.solve_triangular_lower(&l, &b, false).unwrap();
    let x = client
        .solve_triangular_upper(&l.transpose(-2, -1).unwrap(), &y)
        .unwrap();
    let ax = client.matmul(&a, &x).unwrap();
    assert_allclose_f64(&ax.to_vec::<f64>(), &b.to_vec::<f64>(), 1e-10, 1e-12, "A x = b");
}

#[test]
fn test_cholesky_rejects_indefinite() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 3.0, 3.0, 1.0], &[2, 2], &device);
    assert!(matches!(
        client.cholesky_decompose(&a),
        Err(Error::NotPositiveDefinite { .. })
    ));
}

// ============================================================================
// Conjugate gradients
// ============================================================================

#[test]
fn test_cg_batched_matches_cholesky() {
    let (client, device) = create_cpu_client();
    let n = 10;
    let data = [random_spd_data(n, 0.5, 5), random_spd_data(n, 0.5, 6)].concat();
    let a = Tensor::<CpuRuntime>::from_slice(&data, &[2, n, n], &device);
    let b = Tensor::<CpuRuntime>::from_slice(&random_data(2 * n * 3, 7), &[2, n, 3], &device);

    let matvec = |x: &Tensor<CpuRuntime>| client.matmul(&a, x);
    let options = CgOptions::default().with_rtol(1e-12);
    let result = cg_impl(&client, &matvec, &b, None, &options).unwrap();
    assert!(result.converged);
    assert!(result.iterations <= 3 * n);

    let l = client.cholesky_decompose(&a).unwrap().l;
    let y = client.solve_triangular_lower(&l, &b, false).unwrap();
    let direct = client
        .solve_triangular_upper(&l.transpose(-2, -1).unwrap(), &y)
        .unwrap();
    assert_allclose_f64(
        &result.solution.to_vec::<f64>(),
        &direct.to_vec::<f64>(),
        1e-8,
        1e-10,
        "cg vs cholesky",
    );
}

#[test]
fn test_cg_zero_rhs() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&random_spd_data(3, 0.5, 8), &[3, 3], &device);
    let b = Tensor::<CpuRuntime>::zeros(&[3], DType::F64, &device);
    let matvec = |x: &Tensor<CpuRuntime>| client.matmul(&a, x);
    let result = cg_impl(&client, &matvec, &b, None, &CgOptions::default()).unwrap();
    assert!(result.converged);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.solution.shape(), &[3]);
    assert_eq!(result.solution.to_vec::<f64>(), vec![0.0; 3]);
}
