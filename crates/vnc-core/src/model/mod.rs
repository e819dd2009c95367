// ── Domain model ──
//
// Input configuration and reconciliation outcome types. Controller-side
// resource types live in `vnc_api::resources` and are re-exported here.

pub mod network_config;
pub mod result;

pub use network_config::{NetworkConfig, RouteTargetPart};
pub use result::ReconcileResult;
pub use vnc_api::{
    FqName, ForwardingMode, IpamSubnetType, NetworkIpam, ResourceRef, RouteTargetList,
    VirtualNetwork, VirtualNetworkType,
};
