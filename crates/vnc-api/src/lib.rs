// vnc-api: Async Rust client for the SDN controller configuration API

pub mod auth;
pub mod client;
pub mod error;
mod ipam;
mod networks;
pub mod resources;
pub mod transport;

pub use auth::KeystoneCredentials;
pub use client::VncClient;
pub use error::Error;
pub use resources::{
    FqName, ForwardingMode, IpamSubnetType, NetworkIpam, NetworkIpamRef, ResourceRef,
    RouteTargetList, SubnetType, VirtualNetwork, VirtualNetworkType, VnSubnetsType,
};
pub use transport::{TlsMode, TransportConfig};
