//! Reconciliation layer between `vnc-api` and the `vncctl` CLI.
//!
//! This crate owns the business logic for bringing virtual networks on an
//! SDN controller to a declared state:
//!
//! - **[`NetworkReconciler`]**: Idempotent `create` / `update` operations.
//!   Each call searches the controller's listing for the target
//!   `(domain, project, name)`, then creates, merges into, or leaves alone
//!   the network and reports a [`ReconcileResult`]. Dry-run mode performs
//!   every read but no write.
//!
//! - **[`ControllerClient`]**: The controller capability the reconciler
//!   depends on. Implemented for [`vnc_api::VncClient`]; tests substitute an
//!   in-memory controller.
//!
//! - **[`connect()`]**: Session bootstrap from a [`ControllerConfig`],
//!   including the Keystone token exchange.
//!
//! - **Domain model** ([`model`]): [`NetworkConfig`] (the declarative input
//!   with its defaults) and the controller resource types.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::ControllerClient;
pub use config::{AuthCredentials, ControllerConfig, TlsVerification};
pub use error::CoreError;
pub use model::{NetworkConfig, ReconcileResult};
pub use reconcile::{NetworkReconciler, apply_config};
pub use session::{connect, transport_config};
