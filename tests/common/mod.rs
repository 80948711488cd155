//! Common test utilities
#![allow(dead_code)]

use std::sync::Arc;

use linopr::dtype::DType;
use linopr::linop::{DenseOperator, LinearOperator};
use linopr::runtime::Runtime;
use linopr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use linopr::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Elementwise `|a - b| <= atol + rtol·|b|`, reporting the first offender
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{msg}: lengths {} vs {}", a.len(), b.len());
    if let Some((i, (x, y))) = a
        .iter()
        .zip(b)
        .enumerate()
        .find(|(_, (x, y))| (*x - *y).abs() > atol + rtol * y.abs())
    {
        panic!("{msg}: index {i}: {x} vs {y}");
    }
}

/// [`assert_allclose_f64`] for f32 data
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    let widen = |v: &[f32]| v.iter().map(|&x| x as f64).collect::<Vec<_>>();
    assert_allclose_f64(&widen(a), &widen(b), rtol as f64, atol as f64, msg);
}

/// Row-major `n x n` identity
pub fn identity_data(n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        out[i * n + i] = 1.0;
    }
    out
}

/// Deterministic symmetric positive definite matrix, row-major
///
/// `M Mᵀ / n + shift · I` for `M` with entries uniform in `[-1, 1)`.
pub fn random_spd_data(n: usize, shift: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let m: Vec<f64> = (0..n * n).map(|_| rng.random_range(-1.0..1.0)).collect();
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let dot: f64 = (0..n).map(|p| m[i * n + p] * m[j * n + p]).sum();
            out[i * n + j] = dot / n as f64 + if i == j { shift } else { 0.0 };
        }
    }
    out
}

/// Deterministic vector with entries uniform in `[-1, 1)`
pub fn random_data(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

/// Dense SPD factor as a shareable operator
pub fn spd_factor(
    n: usize,
    seed: u64,
    dtype: DType,
    device: &CpuDevice,
) -> Arc<dyn LinearOperator<CpuRuntime>> {
    let data = random_spd_data(n, 0.5, seed);
    let tensor = Tensor::<CpuRuntime>::try_from_f64(&data, &[n, n], dtype, device).unwrap();
    Arc::new(DenseOperator::new(tensor).unwrap())
}
