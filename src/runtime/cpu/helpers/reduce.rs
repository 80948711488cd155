//! Reduction helpers for CPU tensors

use super::super::kernels;
use super::super::{CpuClient, CpuTensor};
use crate::dispatch_dtype;
use crate::error::{Error, Result};
use crate::ops::reduce_output_shape;

/// Sum over `dims`
///
/// Kept dimensions are moved in front of the reduced ones so a single
/// `[outer, reduce, 1]` kernel call covers any combination of axes.
pub fn sum_impl(
    client: &CpuClient,
    a: &CpuTensor,
    dims: &[usize],
    keepdim: bool,
) -> Result<CpuTensor> {
    let ndim = a.ndim();
    if let Some(&bad) = dims.iter().find(|&&d| d >= ndim) {
        return Err(Error::InvalidDimension {
            dim: bad as isize,
            ndim,
        });
    }
    let out_shape = reduce_output_shape(a.shape(), dims, keepdim);

    let kept: Vec<usize> = (0..ndim).filter(|d| !dims.contains(d)).collect();
    let reduced: Vec<usize> = (0..ndim).filter(|d| dims.contains(d)).collect();
    let outer: usize = kept.iter().map(|&d| a.shape()[d]).product();
    let reduce: usize = reduced.iter().map(|&d| a.shape()[d]).product();

    let order: Vec<usize> = kept.iter().chain(reduced.iter()).copied().collect();
    let arranged = a.permute(&order)?;

    dispatch_dtype!(a.dtype(), T => {
        let data: Vec<T> = arranged.to_vec();
        let out = kernels::sum_kernel(&data, outer, reduce, 1);
        CpuTensor::try_from_slice(&out, &out_shape, &client.device)
    }, "sum")
}
