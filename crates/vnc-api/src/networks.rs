// Virtual network endpoints
//
// Collection: `/virtual-networks`, item: `/virtual-network/{uuid}`.
// Bodies are wrapped in a `{"virtual-network": {...}}` envelope.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::VncClient;
use crate::error::Error;
use crate::resources::{FqName, ResourceRef, VirtualNetwork};

const RESOURCE_TYPE: &str = "virtual-network";
const COLLECTION: &str = "virtual-networks";

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "virtual-network")]
    network: &'a VirtualNetwork,
}

#[derive(Deserialize)]
struct ReadEnvelope {
    #[serde(rename = "virtual-network")]
    network: VirtualNetwork,
}

#[derive(Deserialize)]
struct CreateEnvelope {
    #[serde(rename = "virtual-network")]
    created: ResourceRef,
}

impl VncClient {
    /// List every virtual network visible to the caller.
    ///
    /// `GET /virtual-networks` (paginated when a page limit is set)
    pub async fn list_virtual_networks(&self) -> Result<Vec<ResourceRef>, Error> {
        debug!("listing virtual networks");
        self.list_all(COLLECTION).await
    }

    /// Read a virtual network by fully-qualified name.
    ///
    /// `POST /fqname-to-id`, then `GET /virtual-network/{uuid}`
    pub async fn read_virtual_network(&self, fq_name: &FqName) -> Result<VirtualNetwork, Error> {
        let uuid = self.fq_name_to_id(RESOURCE_TYPE, fq_name).await?;
        debug!(%fq_name, %uuid, "reading virtual network");
        let envelope: ReadEnvelope = self
            .get(&format!("{RESOURCE_TYPE}/{uuid}"), &[])
            .await
            .map_err(|e| rekey_not_found(e, fq_name))?;
        Ok(envelope.network)
    }

    /// Create a virtual network.
    ///
    /// `POST /virtual-networks` with `{"virtual-network": {...}}`
    pub async fn create_virtual_network(
        &self,
        network: &VirtualNetwork,
    ) -> Result<ResourceRef, Error> {
        debug!(fq_name = %network.fq_name, "creating virtual network");
        let envelope: CreateEnvelope = self.post(COLLECTION, &Envelope { network }).await?;
        Ok(envelope.created)
    }

    /// Replace a virtual network's attributes.
    ///
    /// `PUT /virtual-network/{uuid}`. The uuid is resolved from the fq_name
    /// when the object does not carry one.
    pub async fn update_virtual_network(&self, network: &VirtualNetwork) -> Result<(), Error> {
        let uuid = match network.uuid {
            Some(uuid) => uuid,
            None => self.fq_name_to_id(RESOURCE_TYPE, &network.fq_name).await?,
        };
        debug!(fq_name = %network.fq_name, %uuid, "updating virtual network");
        self.put(&format!("{RESOURCE_TYPE}/{uuid}"), &Envelope { network })
            .await
            .map_err(|e| rekey_not_found(e, &network.fq_name))
    }
}

fn rekey_not_found(err: Error, fq_name: &FqName) -> Error {
    match err {
        Error::NotFound { .. } => Error::NotFound {
            resource_type: RESOURCE_TYPE.into(),
            identifier: fq_name.to_string(),
        },
        other => other,
    }
}
