// ── Virtual network reconciliation ──
//
// create and update share one flow: resolve the target fq_name, search the
// controller's listing, obtain the object to mutate (fresh or fetched),
// apply the configuration, then submit or simulate.

use tracing::{debug, info};
use vnc_api::{FqName, NetworkIpam, ResourceRef, VirtualNetwork, VirtualNetworkType};

use crate::client::ControllerClient;
use crate::error::CoreError;
use crate::model::{NetworkConfig, ReconcileResult};

/// Which controller write finishes the reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submit {
    Create,
    Update,
}

impl Submit {
    fn future_tense(self) -> &'static str {
        match self {
            Self::Create => "will be created",
            Self::Update => "will be updated",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "was created",
            Self::Update => "was updated",
        }
    }
}

/// Reconciles virtual networks against the controller behind `C`.
///
/// Holds no state between calls. Concurrent callers reconciling the same
/// name can race between the existence search and the write.
pub struct NetworkReconciler<'a, C> {
    client: &'a C,
}

impl<'a, C: ControllerClient> NetworkReconciler<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Create network `name` unless `(domain, project, name)` already exists.
    ///
    /// Missing placement fields fall back to `default-domain` / `admin` and
    /// the `default-domain:default-project:default-network-ipam` IPAM. A
    /// missing IPAM is fatal. With `dry_run` nothing is written.
    pub async fn create(
        &self,
        name: &str,
        config: &NetworkConfig,
        dry_run: bool,
    ) -> Result<ReconcileResult, CoreError> {
        let fq_name = FqName::triple(config.domain(), config.project(), name);

        if self.find_network(&fq_name).await?.is_some() {
            debug!(%fq_name, "virtual network already exists");
            return Ok(ReconcileResult::applied(
                name,
                format!("Virtual network with name {name} already exists"),
            ));
        }

        let ipam = self.client.read_ipam(&config.ipam_fq_name()).await?;

        let mut network = VirtualNetwork::new(fq_name);
        apply_config(&mut network, config, Some(&ipam));

        self.submit(name, &network, Submit::Create, dry_run).await
    }

    /// Merge `config` into the existing network `(domain, project, name)`.
    ///
    /// `project` is mandatory here; only the domain is defaulted. A network
    /// that does not exist yields a `result = false` outcome and no writes.
    /// The IPAM is only read when a subnet is to be attached.
    pub async fn update(
        &self,
        name: &str,
        project: &str,
        config: &NetworkConfig,
        dry_run: bool,
    ) -> Result<ReconcileResult, CoreError> {
        let domain = config.domain();
        let fq_name = FqName::triple(domain, project, name);

        if self.find_network(&fq_name).await?.is_none() {
            debug!(%fq_name, "virtual network not found, nothing to update");
            return Ok(ReconcileResult::failed(
                name,
                format!(
                    "Network with name {name} in domain {domain} and project {project} does not exist"
                ),
            ));
        }

        let mut network = self.client.read_network(&fq_name).await?;

        let ipam = match config.subnet() {
            Some(_) => Some(self.client.read_ipam(&config.ipam_fq_name()).await?),
            None => None,
        };
        apply_config(&mut network, config, ipam.as_ref());

        self.submit(name, &network, Submit::Update, dry_run).await
    }

    /// First listing entry whose fq_name equals `fq_name`.
    async fn find_network(&self, fq_name: &FqName) -> Result<Option<ResourceRef>, CoreError> {
        let networks = self.client.list_networks().await?;
        debug!(total = networks.len(), %fq_name, "searching virtual networks");
        Ok(networks.into_iter().find(|n| &n.fq_name == fq_name))
    }

    async fn submit(
        &self,
        name: &str,
        network: &VirtualNetwork,
        kind: Submit,
        dry_run: bool,
    ) -> Result<ReconcileResult, CoreError> {
        if dry_run {
            debug!(fq_name = %network.fq_name, ?kind, "dry run, skipping controller write");
            return Ok(ReconcileResult::pending(
                name,
                format!("Virtual network with name {name} {}", kind.future_tense()),
            ));
        }

        match kind {
            Submit::Create => {
                let created = self.client.create_network(network).await?;
                info!(fq_name = %created.fq_name, uuid = %created.uuid, "virtual network created");
            }
            Submit::Update => {
                self.client.update_network(network).await?;
                info!(fq_name = %network.fq_name, "virtual network updated");
            }
        }

        Ok(ReconcileResult::applied(
            name,
            format!("Virtual network with name {name} {}", kind.past_tense()),
        ))
    }
}

/// Apply every field present in `config` to `network`.
///
/// The subnet is attached under `ipam`; callers pass `None` only when the
/// config carries no subnet. Route targets are replaced, not appended.
/// Properties are merged into whatever the network already carries.
pub fn apply_config(network: &mut VirtualNetwork, config: &NetworkConfig, ipam: Option<&NetworkIpam>) {
    if let (Some(subnet), Some(ipam)) = (config.subnet(), ipam) {
        network.add_ipam_subnet(ipam, subnet);
    }

    if let Some(route_targets) = config.route_target() {
        network.route_target_list = Some(route_targets);
    }

    if let Some(ref external) = config.external {
        network.router_external = Some(external.clone());
    }

    let props = network
        .virtual_network_properties
        .get_or_insert_with(VirtualNetworkType::default);

    if let Some(allow_transit) = config.allow_transit {
        props.allow_transit = Some(allow_transit);
    }
    if let Some(mode) = config.forwarding_mode() {
        props.forwarding_mode = Some(mode);
    }
    if let Some(ref rpf) = config.rpf {
        props.rpf = Some(rpf.clone());
    }
    if let Some(mirror) = config.mirror_destination {
        props.mirror_destination = Some(mirror);
    }
}
