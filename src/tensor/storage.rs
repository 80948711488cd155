//! Storage: reference-counted host buffers shared between tensor views

use crate::dtype::{DType, Element};
use crate::runtime::Runtime;
use std::sync::Arc;

/// Storage for tensor data on a device
///
/// Storage wraps an immutable byte buffer with reference counting, so views
/// (transpose, broadcast, unsqueeze) share it without copying. Every operation
/// produces fresh storage; nothing mutates a buffer after construction.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    bytes: Vec<u8>,
    /// Number of elements (not bytes)
    len: usize,
    dtype: DType,
    device: R::Device,
}

impl<R: Runtime> Storage<R> {
    /// Create storage by copying `data`; the dtype is inferred from `T`
    pub fn from_slice<T: Element>(data: &[T], device: &R::Device) -> Self {
        Self::wrap(
            bytemuck::cast_slice(data).to_vec(),
            data.len(),
            T::DTYPE,
            device,
        )
    }

    /// Zero-filled storage of `len` elements
    pub fn zeroed(len: usize, dtype: DType, device: &R::Device) -> Self {
        Self::wrap(vec![0u8; len * dtype.size_in_bytes()], len, dtype, device)
    }

    pub(crate) fn wrap(bytes: Vec<u8>, len: usize, dtype: DType, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                bytes,
                len,
                dtype,
                device: device.clone(),
            }),
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// True when the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Device holding the buffer
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Raw bytes of the whole buffer
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    /// Number of views sharing this buffer
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Gather elements at the given element offsets into a new typed vector
    ///
    /// The buffer carries no alignment guarantee for `T`, so elements are
    /// copied out rather than reinterpreted in place.
    pub(crate) fn gather<T: Element>(&self, offsets: &[usize]) -> Vec<T> {
        let elem = std::mem::size_of::<T>();
        let bytes = &self.inner.bytes;
        offsets
            .iter()
            .map(|&off| bytemuck::pod_read_unaligned(&bytes[off * elem..(off + 1) * elem]))
            .collect()
    }

    /// Gather raw element bytes at the given offsets (dtype agnostic)
    pub(crate) fn gather_bytes(&self, offsets: &[usize]) -> Vec<u8> {
        let elem = self.inner.dtype.size_in_bytes();
        let bytes = &self.inner.bytes;
        let mut out = Vec::with_capacity(offsets.len() * elem);
        for &off in offsets {
            out.extend_from_slice(&bytes[off * elem..(off + 1) * elem]);
        }
        out
    }
}

impl<R: Runtime> Clone for Storage<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("device", &self.inner.device)
            .finish()
    }
}
