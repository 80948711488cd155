//! Backend abstraction
//!
//! A backend is three types: a zero-sized [`Runtime`] marker, the
//! [`Device`] that owns tensor memory, and a [`RuntimeClient`] that runs
//! kernels there. Every tensor op and decomposition hangs off the client.

use crate::algorithm::linalg::LinearAlgebraAlgorithms;
use crate::ops::TensorOps;
use std::fmt::Debug;

/// Where tensor memory lives
pub trait Device: Clone + Debug + Send + Sync + 'static {
    /// Short label used in logs and `Debug` output
    fn name(&self) -> String;
}

/// Kernel dispatcher bound to one device
///
/// Clients are cloned into closures (preconditioners, for instance), so they
/// must be cheap to clone and `'static`.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync + 'static {
    /// The device this client allocates on
    fn device(&self) -> &R::Device;
}

/// Marker tying a device type to its client
///
/// Code generic over `R: Runtime` can call any tensor op or decomposition on
/// `R::Client` without extra bounds.
///
/// ```
/// use linopr::prelude::*;
///
/// let device = CpuRuntime::default_device();
/// let client = CpuRuntime::default_client(&device);
/// let eye = client.eye(3, DType::F64).unwrap();
/// assert_eq!(eye.shape(), &[3, 3]);
/// ```
pub trait Runtime: Clone + Debug + Send + Sync + 'static {
    #[allow(missing_docs)]
    type Device: Device;

    #[allow(missing_docs)]
    type Client: RuntimeClient<Self> + TensorOps<Self> + LinearAlgebraAlgorithms<Self>;

    /// Device used when the caller does not pick one
    fn default_device() -> Self::Device;

    /// Client for `device`
    fn default_client(device: &Self::Device) -> Self::Client;
}
