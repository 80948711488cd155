//! Host backend types

use crate::runtime::{Device, Runtime, RuntimeClient};

/// The host CPU
///
/// There is a single host device, so this carries no state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuDevice;

impl CpuDevice {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self
    }
}

impl Device for CpuDevice {
    fn name(&self) -> String {
        "cpu".into()
    }
}

/// Runs every kernel synchronously on the calling thread
/// (matmul fans out to rayon when the feature is on)
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
}

impl CpuClient {
    #[allow(missing_docs)]
    pub fn new(device: CpuDevice) -> Self {
        Self { device }
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }
}

/// Host-memory runtime, the crate default
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;

    fn default_device() -> CpuDevice {
        CpuDevice
    }

    fn default_client(device: &CpuDevice) -> CpuClient {
        CpuClient::new(*device)
    }
}
