//! The `Tensor` handle

use super::{Layout, Storage};
use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;

/// A strided view over a shared element buffer
///
/// Cloning is cheap: the buffer is reference counted and only the [`Layout`]
/// is copied. `transpose`, `unsqueeze`, `permute` and `broadcast_to` produce
/// new views of the same buffer; `contiguous` and a `reshape` of a strided
/// view materialize a fresh one.
///
/// ```
/// use linopr::prelude::*;
///
/// let device = CpuDevice::new();
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let at = a.transpose(-2, -1).unwrap();
/// assert_eq!(at.to_vec::<f64>(), vec![1.0, 3.0, 2.0, 4.0]);
/// ```
pub struct Tensor<R: Runtime> {
    storage: Storage<R>,
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    fn contiguous_from(storage: Storage<R>, shape: &[usize]) -> Self {
        Self {
            storage,
            layout: Layout::contiguous(shape),
        }
    }

    fn view(&self, layout: Layout) -> Self {
        Self {
            storage: self.storage.clone(),
            layout,
        }
    }

    // ----------------------------------------------------------------------
    // Construction
    // ----------------------------------------------------------------------

    /// Copy `data` into a new row-major tensor
    ///
    /// # Panics
    ///
    /// If `data.len()` differs from the element count of `shape`. Use
    /// [`Self::try_from_slice`] to get an error instead.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        match Self::try_from_slice(data, shape, device) {
            Ok(t) => t,
            Err(e) => panic!("Tensor::from_slice: {e}"),
        }
    }

    /// Copy `data` into a new row-major tensor
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let count: usize = shape.iter().product();
        if count != data.len() {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Self::contiguous_from(Storage::from_slice(data, device), shape))
    }

    /// Build a tensor of `dtype` from f64 values, rounding each one
    pub fn try_from_f64(
        data: &[f64],
        shape: &[usize],
        dtype: DType,
        device: &R::Device,
    ) -> Result<Self> {
        dispatch_dtype!(dtype, T => {
            let narrowed: Vec<T> = data.iter().map(|&v| T::from_f64(v)).collect();
            Self::try_from_slice(&narrowed, shape, device)
        }, "from_f64")
    }

    /// Tensor of `shape` with every element equal to `value`
    pub fn try_full(shape: &[usize], value: f64, dtype: DType, device: &R::Device) -> Result<Self> {
        if value == 0.0 {
            return Self::try_zeros(shape, dtype, device);
        }
        let count: usize = shape.iter().product();
        dispatch_dtype!(dtype, T => {
            let filled = vec![T::from_f64(value); count];
            Ok(Self::contiguous_from(Storage::from_slice(&filled, device), shape))
        }, "full")
    }

    /// Zero-filled tensor
    pub fn try_zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let count: usize = shape.iter().product();
        // 0.0 is the all-zero bit pattern in every supported format
        Ok(Self::contiguous_from(Storage::zeroed(count, dtype, device), shape))
    }

    /// Zero-filled tensor, panicking on failure
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        match Self::try_zeros(shape, dtype, device) {
            Ok(t) => t,
            Err(e) => panic!("Tensor::zeros: {e}"),
        }
    }

    /// One-filled tensor, panicking on failure
    pub fn ones(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        match Self::try_full(shape, 1.0, dtype, device) {
            Ok(t) => t,
            Err(e) => panic!("Tensor::ones: {e}"),
        }
    }

    // ----------------------------------------------------------------------
    // Metadata
    // ----------------------------------------------------------------------

    /// Backing buffer
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// View description
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Number of axes
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Element count
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Whether the view is dense row-major from offset zero
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Whether the tensor has no axes
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.layout.is_scalar()
    }

    // ----------------------------------------------------------------------
    // Views
    // ----------------------------------------------------------------------

    /// Swap two axes; negative indices count from the end
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let bad = |d: isize| Error::InvalidDimension {
            dim: d,
            ndim: self.ndim(),
        };
        self.layout.normalize_dim(dim0).ok_or_else(|| bad(dim0))?;
        self.layout.normalize_dim(dim1).ok_or_else(|| bad(dim1))?;
        let layout = self.layout.transpose(dim0, dim1).ok_or_else(|| bad(dim0))?;
        Ok(self.view(layout))
    }

    /// Reinterpret the elements under a new shape of the same size
    ///
    /// Strided views are materialized first.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if shape.iter().product::<usize>() != self.numel() {
            return Err(Error::shape_mismatch(shape, self.shape()));
        }
        let dense = self.contiguous();
        let layout = dense.layout.reshape(shape).ok_or(Error::NotContiguous)?;
        Ok(dense.view(layout))
    }

    /// Drop one size-1 axis, or all of them with `None`
    pub fn squeeze(&self, dim: Option<isize>) -> Self {
        self.view(self.layout.squeeze(dim))
    }

    /// Insert a size-1 axis at `dim`
    pub fn unsqueeze(&self, dim: isize) -> Result<Self> {
        match self.layout.unsqueeze(dim) {
            Some(layout) => Ok(self.view(layout)),
            None => Err(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            }),
        }
    }

    /// Reorder the axes; `dims[i]` is the source axis of output axis `i`
    pub fn permute(&self, dims: &[usize]) -> Result<Self> {
        let layout = self.layout.permute(dims).ok_or_else(|| {
            Error::invalid_argument(
                "dims",
                format!("{:?} is not a permutation of 0..{}", dims, self.ndim()),
            )
        })?;
        Ok(self.view(layout))
    }

    /// Expand size-1 axes to `shape` with zero strides
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        self.layout
            .broadcast_to(shape)
            .map(|layout| self.view(layout))
            .ok_or_else(|| Error::broadcast(self.shape(), shape))
    }

    /// Dense row-major copy of this view, or a clone if it already is one
    pub fn contiguous(&self) -> Self {
        if self.is_contiguous() {
            return self.clone();
        }
        let offsets = self.layout.element_offsets();
        let bytes = self.storage.gather_bytes(&offsets);
        let storage = Storage::wrap(bytes, offsets.len(), self.dtype(), self.device());
        Self::contiguous_from(storage, self.shape())
    }

    // ----------------------------------------------------------------------
    // Host readback
    // ----------------------------------------------------------------------

    /// Elements in row-major order of this view
    ///
    /// # Panics
    ///
    /// If `T` is not the tensor's element type.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        assert_eq!(
            T::DTYPE,
            self.dtype(),
            "to_vec::<{}> called on a {} tensor",
            T::DTYPE,
            self.dtype()
        );
        if !self.is_contiguous() {
            return self.storage.gather(&self.layout.element_offsets());
        }
        let byte_len = self.numel() * self.dtype().size_in_bytes();
        bytemuck::pod_collect_to_vec(&self.storage.as_bytes()[..byte_len])
    }

    /// Elements widened to f64, for any dtype
    pub fn to_f64_vec(&self) -> Result<Vec<f64>> {
        dispatch_dtype!(self.dtype(), T => {
            Ok(self.to_vec::<T>().into_iter().map(Element::to_f64).collect())
        }, "to_f64_vec")
    }

    /// The single element of a one-element tensor
    ///
    /// # Panics
    ///
    /// If the tensor holds more than one element or `T` is the wrong type.
    pub fn item<T: Element>(&self) -> T {
        assert_eq!(self.numel(), 1, "item() on a tensor of {} elements", self.numel());
        self.to_vec::<T>()[0]
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    fn clone(&self) -> Self {
        self.view(self.layout.clone())
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("strides", &self.layout.strides())
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.dtype(), self.shape())
    }
}
