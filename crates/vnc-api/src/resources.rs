// Wire types for the controller's configuration schema.
//
// Only the fields this workspace reads or writes are typed. Everything else
// the API server returns is captured in `extra` maps so a read → modify →
// update cycle round-trips unknown attributes untouched.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use uuid::Uuid;

// ── Identity ────────────────────────────────────────────────────────

/// Fully-qualified name: the ordered name path of a resource.
///
/// A virtual network's fq_name is `[domain, project, name]`. Equality is
/// exact, ordered, case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FqName(Vec<String>);

impl FqName {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The `(domain, project, name)` triple used by project-scoped resources.
    pub fn triple(domain: &str, project: &str, name: &str) -> Self {
        Self::new([domain, project, name])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment (the resource's own name).
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(":"))
    }
}

/// Lightweight reference returned by list and create calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub fq_name: FqName,
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

// ── Virtual network ─────────────────────────────────────────────────

/// Packet forwarding mode of a virtual network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum ForwardingMode {
    #[serde(rename = "l2_l3")]
    #[strum(serialize = "l2_l3")]
    L2L3,
    #[serde(rename = "l2")]
    #[strum(serialize = "l2")]
    L2,
    #[serde(rename = "l3")]
    #[strum(serialize = "l3")]
    L3,
}

/// `virtual_network_properties` sub-object.
///
/// `rpf` is passed through as the controller's string enum
/// (`enable` / `disable` style values are not normalised here).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualNetworkType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_transit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding_mode: Option<ForwardingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_destination: Option<bool>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// An IPv4/IPv6 prefix as the controller represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetType {
    pub ip_prefix: String,
    pub ip_prefix_len: u8,
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip_prefix, self.ip_prefix_len)
    }
}

/// One subnet allocated out of an IPAM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpamSubnetType {
    pub subnet: SubnetType,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl IpamSubnetType {
    pub fn new(ip_prefix: impl Into<String>, ip_prefix_len: u8) -> Self {
        Self {
            subnet: SubnetType {
                ip_prefix: ip_prefix.into(),
                ip_prefix_len,
            },
            extra: HashMap::new(),
        }
    }
}

/// Attribute payload of a network → IPAM reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VnSubnetsType {
    #[serde(default)]
    pub ipam_subnets: Vec<IpamSubnetType>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Reference from a virtual network to a network IPAM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkIpamRef {
    pub to: FqName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub attr: VnSubnetsType,
}

/// `route_target_list` wrapper (`{"route_target": ["target:64512:10000"]}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTargetList {
    #[serde(default)]
    pub route_target: Vec<String>,
}

impl RouteTargetList {
    /// A list holding exactly one `target:<asn>:<target>` entry.
    pub fn single(asn: impl fmt::Display, target: impl fmt::Display) -> Self {
        Self {
            route_target: vec![format!("target:{asn}:{target}")],
        }
    }
}

/// The `virtual-network` resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualNetwork {
    pub fq_name: FqName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_ipam_refs: Vec<NetworkIpamRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_target_list: Option<RouteTargetList>,
    /// Sent exactly as supplied by the caller; the API server validates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_external: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_properties: Option<VirtualNetworkType>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl VirtualNetwork {
    /// A fresh, project-parented network with no attributes set.
    pub fn new(fq_name: FqName) -> Self {
        Self {
            fq_name,
            parent_type: Some("project".into()),
            ..Self::default()
        }
    }

    /// Attach `subnet` under `ipam`.
    ///
    /// Reuses an existing reference to the same IPAM when there is one and
    /// skips the subnet if that reference already carries it.
    pub fn add_ipam_subnet(&mut self, ipam: &NetworkIpam, subnet: IpamSubnetType) {
        if let Some(existing) = self
            .network_ipam_refs
            .iter_mut()
            .find(|r| r.to == ipam.fq_name)
        {
            if !existing
                .attr
                .ipam_subnets
                .iter()
                .any(|s| s.subnet == subnet.subnet)
            {
                existing.attr.ipam_subnets.push(subnet);
            }
            return;
        }

        self.network_ipam_refs.push(NetworkIpamRef {
            to: ipam.fq_name.clone(),
            uuid: ipam.uuid,
            href: None,
            attr: VnSubnetsType {
                ipam_subnets: vec![subnet],
                extra: HashMap::new(),
            },
        });
    }

    /// All subnets across every IPAM reference.
    pub fn subnets(&self) -> impl Iterator<Item = &SubnetType> {
        self.network_ipam_refs
            .iter()
            .flat_map(|r| r.attr.ipam_subnets.iter().map(|s| &s.subnet))
    }
}

// ── Network IPAM ────────────────────────────────────────────────────

/// The `network-ipam` resource. Only its identity is needed to attach subnets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkIpam {
    pub fq_name: FqName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ipam(name: &str) -> NetworkIpam {
        NetworkIpam {
            fq_name: FqName::triple("default-domain", "default-project", name),
            uuid: Some(Uuid::new_v4()),
            extra: HashMap::new(),
        }
    }

    #[test]
    fn fq_name_equality_is_ordered_and_case_sensitive() {
        let a = FqName::triple("default-domain", "admin", "net");
        assert_eq!(a, FqName::new(["default-domain", "admin", "net"]));
        assert_ne!(a, FqName::triple("admin", "default-domain", "net"));
        assert_ne!(a, FqName::triple("default-domain", "admin", "NET"));
    }

    #[test]
    fn fq_name_display_and_name() {
        let fq = FqName::triple("d", "p", "n");
        assert_eq!(fq.to_string(), "d:p:n");
        assert_eq!(fq.name(), Some("n"));
    }

    #[test]
    fn forwarding_mode_parses_known_values_only() {
        assert_eq!("l2_l3".parse::<ForwardingMode>().unwrap(), ForwardingMode::L2L3);
        assert_eq!("l2".parse::<ForwardingMode>().unwrap(), ForwardingMode::L2);
        assert_eq!("l3".parse::<ForwardingMode>().unwrap(), ForwardingMode::L3);
        assert!("l4".parse::<ForwardingMode>().is_err());
        assert_eq!(
            serde_json::to_value(ForwardingMode::L2L3).unwrap(),
            json!("l2_l3")
        );
    }

    #[test]
    fn route_target_formatting() {
        let rt = RouteTargetList::single(64512, 10000);
        assert_eq!(rt.route_target, vec!["target:64512:10000".to_string()]);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "fq_name": ["default-domain", "admin", "net"],
            "uuid": "8d7e4cb5-9c8a-4a3e-9f7d-2b1f0c7a1e11",
            "virtual_network_properties": { "rpf": "enable", "vxlan_network_identifier": 7 },
            "id_perms": { "enable": true }
        });
        let vn: VirtualNetwork = serde_json::from_value(raw).unwrap();
        assert!(vn.extra.contains_key("id_perms"));

        let props = vn.virtual_network_properties.as_ref().unwrap();
        assert_eq!(props.rpf.as_deref(), Some("enable"));
        assert_eq!(props.extra.get("vxlan_network_identifier"), Some(&json!(7)));

        let back = serde_json::to_value(&vn).unwrap();
        assert_eq!(back["id_perms"], json!({ "enable": true }));
        assert_eq!(back["virtual_network_properties"]["vxlan_network_identifier"], json!(7));
    }

    #[test]
    fn add_ipam_subnet_merges_into_existing_ref() {
        let ipam = ipam("default-network-ipam");
        let mut vn = VirtualNetwork::new(FqName::triple("d", "p", "n"));

        vn.add_ipam_subnet(&ipam, IpamSubnetType::new("10.0.0.0", 24));
        vn.add_ipam_subnet(&ipam, IpamSubnetType::new("10.0.0.0", 24));
        vn.add_ipam_subnet(&ipam, IpamSubnetType::new("10.0.1.0", 24));

        assert_eq!(vn.network_ipam_refs.len(), 1);
        let subnets: Vec<String> = vn.subnets().map(ToString::to_string).collect();
        assert_eq!(subnets, vec!["10.0.0.0/24", "10.0.1.0/24"]);
    }

    #[test]
    fn add_ipam_subnet_adds_ref_per_ipam() {
        let mut vn = VirtualNetwork::new(FqName::triple("d", "p", "n"));
        vn.add_ipam_subnet(&ipam("a"), IpamSubnetType::new("10.0.0.0", 24));
        vn.add_ipam_subnet(&ipam("b"), IpamSubnetType::new("10.1.0.0", 16));
        assert_eq!(vn.network_ipam_refs.len(), 2);
    }

    #[test]
    fn new_network_serializes_without_unset_fields() {
        let vn = VirtualNetwork::new(FqName::triple("d", "p", "n"));
        let value = serde_json::to_value(&vn).unwrap();
        assert_eq!(
            value,
            json!({ "fq_name": ["d", "p", "n"], "parent_type": "project" })
        );
    }
}
