// Network IPAM endpoints

use serde::Deserialize;
use tracing::debug;

use crate::client::VncClient;
use crate::error::Error;
use crate::resources::{FqName, NetworkIpam};

const RESOURCE_TYPE: &str = "network-ipam";

#[derive(Deserialize)]
struct ReadEnvelope {
    #[serde(rename = "network-ipam")]
    ipam: NetworkIpam,
}

impl VncClient {
    /// Read a network IPAM by fully-qualified name.
    ///
    /// `POST /fqname-to-id`, then `GET /network-ipam/{uuid}`. Fails with
    /// [`Error::NotFound`] when no such IPAM exists.
    pub async fn read_network_ipam(&self, fq_name: &FqName) -> Result<NetworkIpam, Error> {
        let uuid = self.fq_name_to_id(RESOURCE_TYPE, fq_name).await?;
        debug!(%fq_name, %uuid, "reading network ipam");
        let envelope: ReadEnvelope = self
            .get(&format!("{RESOURCE_TYPE}/{uuid}"), &[])
            .await
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::NotFound {
                    resource_type: RESOURCE_TYPE.into(),
                    identifier: fq_name.to_string(),
                },
                other => other,
            })?;
        Ok(envelope.ipam)
    }
}
