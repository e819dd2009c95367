// ── Desired network state ──

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use tracing::debug;

use vnc_api::{FqName, ForwardingMode, IpamSubnetType, RouteTargetList};

pub const DEFAULT_DOMAIN: &str = "default-domain";
pub const DEFAULT_PROJECT: &str = "admin";
pub const DEFAULT_IPAM_DOMAIN: &str = "default-domain";
pub const DEFAULT_IPAM_PROJECT: &str = "default-project";
pub const DEFAULT_IPAM_NAME: &str = "default-network-ipam";

/// Longest accepted subnet prefix length.
pub const MAX_PREFIX_LEN: u8 = 32;

/// One half of a `target:<asn>:<target>` route target.
///
/// Numbers and text are both accepted, so IP-form targets such as
/// `target:10.1.1.1:100` pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteTargetPart {
    Number(u64),
    Text(String),
}

impl fmt::Display for RouteTargetPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RouteTargetPart {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse().map_or_else(|_| Self::Text(s.to_owned()), Self::Number))
    }
}

impl From<u64> for RouteTargetPart {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RouteTargetPart {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

fn prefix_len<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    match Option::<u8>::deserialize(deserializer)? {
        Some(len) if len > MAX_PREFIX_LEN => Err(de::Error::custom(format!(
            "ip_prefix_len must be between 0 and {MAX_PREFIX_LEN}, got {len}"
        ))),
        other => Ok(other),
    }
}

/// Partial desired state for a virtual network.
///
/// Every field is optional; an absent field leaves the corresponding
/// attribute untouched (or falls back to a default for placement fields).
/// Unknown keys are ignored so callers can pass a broader mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, alias = "ipamDomain", skip_serializing_if = "Option::is_none")]
    pub ipam_domain: Option<String>,
    #[serde(default, alias = "ipamProject", skip_serializing_if = "Option::is_none")]
    pub ipam_project: Option<String>,
    #[serde(default, alias = "ipamName", skip_serializing_if = "Option::is_none")]
    pub ipam_name: Option<String>,
    #[serde(default, alias = "ipPrefix", skip_serializing_if = "Option::is_none")]
    pub ip_prefix: Option<String>,
    #[serde(
        default,
        alias = "ipPrefixLen",
        deserialize_with = "prefix_len",
        skip_serializing_if = "Option::is_none"
    )]
    pub ip_prefix_len: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<RouteTargetPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<RouteTargetPart>,
    /// Passed to the controller verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<Value>,
    #[serde(default, alias = "allowTransit", skip_serializing_if = "Option::is_none")]
    pub allow_transit: Option<bool>,
    /// Kept as text: unsupported values are dropped, not rejected.
    #[serde(default, alias = "forwardingMode", skip_serializing_if = "Option::is_none")]
    pub forwarding_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpf: Option<String>,
    #[serde(default, alias = "mirrorDestination", skip_serializing_if = "Option::is_none")]
    pub mirror_destination: Option<bool>,
}

impl NetworkConfig {
    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }

    /// Project for the create path.
    pub fn project(&self) -> &str {
        self.project.as_deref().unwrap_or(DEFAULT_PROJECT)
    }

    /// The IPAM subnets are allocated from.
    pub fn ipam_fq_name(&self) -> FqName {
        FqName::triple(
            self.ipam_domain.as_deref().unwrap_or(DEFAULT_IPAM_DOMAIN),
            self.ipam_project.as_deref().unwrap_or(DEFAULT_IPAM_PROJECT),
            self.ipam_name.as_deref().unwrap_or(DEFAULT_IPAM_NAME),
        )
    }

    /// Subnet to attach, when both prefix and length are present.
    pub fn subnet(&self) -> Option<IpamSubnetType> {
        match (&self.ip_prefix, self.ip_prefix_len) {
            (Some(prefix), Some(len)) => Some(IpamSubnetType::new(prefix.clone(), len)),
            _ => None,
        }
    }

    /// `target:<asn>:<target>`, when both parts are present.
    pub fn route_target(&self) -> Option<RouteTargetList> {
        match (&self.asn, &self.target) {
            (Some(asn), Some(target)) => Some(RouteTargetList::single(asn, target)),
            _ => None,
        }
    }

    /// The forwarding mode, if present and one of `l2_l3`, `l2`, `l3`.
    pub fn forwarding_mode(&self) -> Option<ForwardingMode> {
        let raw = self.forwarding_mode.as_deref()?;
        match raw.parse() {
            Ok(mode) => Some(mode),
            Err(_) => {
                debug!(forwarding_mode = raw, "ignoring unsupported forwarding mode");
                None
            }
        }
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.domain = other.domain.or(self.domain.take());
        self.project = other.project.or(self.project.take());
        self.ipam_domain = other.ipam_domain.or(self.ipam_domain.take());
        self.ipam_project = other.ipam_project.or(self.ipam_project.take());
        self.ipam_name = other.ipam_name.or(self.ipam_name.take());
        self.ip_prefix = other.ip_prefix.or(self.ip_prefix.take());
        self.ip_prefix_len = other.ip_prefix_len.or(self.ip_prefix_len.take());
        self.asn = other.asn.or(self.asn.take());
        self.target = other.target.or(self.target.take());
        self.external = other.external.or(self.external.take());
        self.allow_transit = other.allow_transit.or(self.allow_transit.take());
        self.forwarding_mode = other.forwarding_mode.or(self.forwarding_mode.take());
        self.rpf = other.rpf.or(self.rpf.take());
        self.mirror_destination = other.mirror_destination.or(self.mirror_destination.take());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_resolves_defaults() {
        let conf = NetworkConfig::default();
        assert_eq!(conf.domain(), "default-domain");
        assert_eq!(conf.project(), "admin");
        assert_eq!(
            conf.ipam_fq_name(),
            FqName::triple("default-domain", "default-project", "default-network-ipam")
        );
    }

    #[test]
    fn subnet_requires_prefix_and_length() {
        let mut conf = NetworkConfig {
            ip_prefix: Some("10.0.0.0".into()),
            ..NetworkConfig::default()
        };
        assert!(conf.subnet().is_none());

        conf.ip_prefix = None;
        conf.ip_prefix_len = Some(24);
        assert!(conf.subnet().is_none());

        conf.ip_prefix = Some("10.0.0.0".into());
        assert_eq!(conf.subnet().unwrap().subnet.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn route_target_requires_asn_and_target() {
        let conf = NetworkConfig {
            asn: Some(RouteTargetPart::Number(64512)),
            ..NetworkConfig::default()
        };
        assert!(conf.route_target().is_none());

        let conf = NetworkConfig {
            asn: Some(RouteTargetPart::Number(64512)),
            target: Some(RouteTargetPart::Number(10000)),
            ..NetworkConfig::default()
        };
        assert_eq!(
            conf.route_target().unwrap().route_target,
            vec!["target:64512:10000"]
        );
    }

    #[test]
    fn unsupported_forwarding_mode_is_dropped() {
        let conf = NetworkConfig {
            forwarding_mode: Some("l7".into()),
            ..NetworkConfig::default()
        };
        assert_eq!(conf.forwarding_mode(), None);

        let conf = NetworkConfig {
            forwarding_mode: Some("l2_l3".into()),
            ..NetworkConfig::default()
        };
        assert_eq!(conf.forwarding_mode(), Some(ForwardingMode::L2L3));
    }

    #[test]
    fn deserializes_snake_and_camel_case_and_ignores_unknown_keys() {
        let conf: NetworkConfig = serde_json::from_value(json!({
            "external": "True",
            "ip_prefix": "172.16.111.0",
            "ipPrefixLen": 24,
            "mirrorDestination": true,
            "flavour": "vanilla",
        }))
        .unwrap();

        assert_eq!(conf.external, Some(json!("True")));
        assert_eq!(conf.ip_prefix.as_deref(), Some("172.16.111.0"));
        assert_eq!(conf.ip_prefix_len, Some(24));
        assert_eq!(conf.mirror_destination, Some(true));
    }

    #[test]
    fn merge_prefers_overlay_fields() {
        let mut base = NetworkConfig {
            domain: Some("d1".into()),
            asn: Some(RouteTargetPart::Number(1)),
            ..NetworkConfig::default()
        };
        base.merge(NetworkConfig {
            asn: Some(RouteTargetPart::Number(2)),
            target: Some(RouteTargetPart::Number(3)),
            ..NetworkConfig::default()
        });

        assert_eq!(base.domain.as_deref(), Some("d1"));
        assert_eq!(base.asn, Some(RouteTargetPart::Number(2)));
        assert_eq!(base.target, Some(RouteTargetPart::Number(3)));
    }

    #[test]
    fn route_target_accepts_ip_form_and_string_values() {
        let conf: NetworkConfig = serde_json::from_value(json!({
            "asn": "10.1.1.1",
            "target": "100",
        }))
        .unwrap();
        assert_eq!(
            conf.route_target().unwrap().route_target,
            vec!["target:10.1.1.1:100"]
        );

        let conf: NetworkConfig = serde_json::from_value(json!({ "asn": 64512, "target": 7 })).unwrap();
        assert_eq!(conf.asn, Some(RouteTargetPart::Number(64512)));
        assert_eq!(
            conf.route_target().unwrap().route_target,
            vec!["target:64512:7"]
        );
    }

    #[test]
    fn route_target_part_parses_numbers_first() {
        assert_eq!("64512".parse::<RouteTargetPart>().unwrap(), RouteTargetPart::Number(64512));
        assert_eq!(
            "10.1.1.1".parse::<RouteTargetPart>().unwrap(),
            RouteTargetPart::from("10.1.1.1")
        );
    }

    #[test]
    fn prefix_length_above_32_is_rejected() {
        let err = serde_json::from_value::<NetworkConfig>(json!({
            "ip_prefix": "10.0.0.0",
            "ip_prefix_len": 33,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("between 0 and 32"), "got: {err}");

        let conf: NetworkConfig = serde_json::from_value(json!({ "ip_prefix_len": 32 })).unwrap();
        assert_eq!(conf.ip_prefix_len, Some(32));
    }
}
