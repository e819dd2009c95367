// ── Controller capability ──
//
// The reconciler talks to the controller only through `ControllerClient`.
// `vnc_api::VncClient` is the production implementation; tests supply an
// in-memory double.

use std::future::Future;

use vnc_api::{FqName, NetworkIpam, ResourceRef, VirtualNetwork, VncClient};

use crate::error::CoreError;

/// The controller operations network reconciliation needs.
///
/// Each call is one round-trip to the controller. Implementations own
/// timeouts and cancellation.
pub trait ControllerClient: Sync {
    /// Every virtual network in the controller's namespace.
    fn list_networks(&self) -> impl Future<Output = Result<Vec<ResourceRef>, CoreError>> + Send;

    /// Read a network IPAM. Fails with [`CoreError::NotFound`] when absent.
    fn read_ipam(
        &self,
        fq_name: &FqName,
    ) -> impl Future<Output = Result<NetworkIpam, CoreError>> + Send;

    /// Read the full virtual network object.
    fn read_network(
        &self,
        fq_name: &FqName,
    ) -> impl Future<Output = Result<VirtualNetwork, CoreError>> + Send;

    /// Create a virtual network that does not exist yet.
    fn create_network(
        &self,
        network: &VirtualNetwork,
    ) -> impl Future<Output = Result<ResourceRef, CoreError>> + Send;

    /// Replace the attributes of an existing virtual network.
    fn update_network(
        &self,
        network: &VirtualNetwork,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl ControllerClient for VncClient {
    async fn list_networks(&self) -> Result<Vec<ResourceRef>, CoreError> {
        Ok(self.list_virtual_networks().await?)
    }

    async fn read_ipam(&self, fq_name: &FqName) -> Result<NetworkIpam, CoreError> {
        Ok(self.read_network_ipam(fq_name).await?)
    }

    async fn read_network(&self, fq_name: &FqName) -> Result<VirtualNetwork, CoreError> {
        Ok(self.read_virtual_network(fq_name).await?)
    }

    async fn create_network(&self, network: &VirtualNetwork) -> Result<ResourceRef, CoreError> {
        Ok(self.create_virtual_network(network).await?)
    }

    async fn update_network(&self, network: &VirtualNetwork) -> Result<(), CoreError> {
        Ok(self.update_virtual_network(network).await?)
    }
}
