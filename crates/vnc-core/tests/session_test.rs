#![allow(clippy::unwrap_used)]
// End-to-end tests: `connect` + `NetworkReconciler` against a wiremock API server.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vnc_core::{
    AuthCredentials, ControllerConfig, CoreError, NetworkConfig, NetworkReconciler,
    TlsVerification, connect,
};

const NET_UUID: &str = "5b3e8a2c-1f4d-4c6e-9a7b-0d2e3f4a5b6c";
const IPAM_UUID: &str = "9c1d2e3f-4a5b-4c6d-8e7f-0a1b2c3d4e5f";
const NEW_UUID: &str = "0f1e2d3c-4b5a-4968-8776-655443322110";

// ── Helpers ─────────────────────────────────────────────────────────

fn controller_config(server: &MockServer, auth: AuthCredentials) -> ControllerConfig {
    ControllerConfig {
        url: Url::parse(&server.uri()).unwrap(),
        auth,
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
        page_limit: None,
    }
}

async fn mount_listing(server: &MockServer, networks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/virtual-networks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "virtual-networks": networks })),
        )
        .mount(server)
        .await;
}

async fn mount_default_ipam(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/fqname-to-id"))
        .and(body_partial_json(json!({
            "type": "network-ipam",
            "fq_name": ["default-domain", "default-project", "default-network-ipam"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": IPAM_UUID })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/network-ipam/{IPAM_UUID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "network-ipam": {
                "fq_name": ["default-domain", "default-project", "default-network-ipam"],
                "uuid": IPAM_UUID,
                "parent_type": "project",
            }
        })))
        .mount(server)
        .await;
}

fn testicek() -> NetworkConfig {
    serde_json::from_value(json!({
        "external": true,
        "ip_prefix": "172.16.111.0",
        "ip_prefix_len": 24,
        "asn": 64512,
        "target": 10000,
    }))
    .unwrap()
}

// ── Session bootstrap ───────────────────────────────────────────────

#[tokio::test]
async fn test_connect_with_token_sends_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/virtual-networks"))
        .and(header("X-Auth-Token", "static-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "virtual-networks": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = controller_config(
        &server,
        AuthCredentials::Token(SecretString::from("static-token".to_owned())),
    );
    let client = connect(&config).await.unwrap();
    assert!(client.list_virtual_networks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connect_with_keystone_exchanges_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .and(body_partial_json(json!({
            "auth": { "scope": { "project": { "name": "admin" } } }
        })))
        .respond_with(ResponseTemplate::new(201).insert_header("X-Subject-Token", "issued-token"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/virtual-networks"))
        .and(header("X-Auth-Token", "issued-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "virtual-networks": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthCredentials::Keystone {
        auth_url: Url::parse(&format!("{}/v3", server.uri())).unwrap(),
        username: "admin".into(),
        password: SecretString::from("secret".to_owned()),
        tenant: "admin".into(),
        domain: "Default".into(),
    };
    let client = connect(&controller_config(&server, auth)).await.unwrap();
    client.list_virtual_networks().await.unwrap();
}

#[tokio::test]
async fn test_connect_keystone_rejection_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&server)
        .await;

    let auth = AuthCredentials::Keystone {
        auth_url: Url::parse(&format!("{}/v3", server.uri())).unwrap(),
        username: "admin".into(),
        password: SecretString::from("wrong".to_owned()),
        tenant: "admin".into(),
        domain: "Default".into(),
    };
    let err = connect(&controller_config(&server, auth)).await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
}

// ── Reconciliation over HTTP ────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_full_network() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([])).await;
    mount_default_ipam(&server).await;

    Mock::given(method("POST"))
        .and(path("/virtual-networks"))
        .and(body_partial_json(json!({
            "virtual-network": {
                "fq_name": ["default-domain", "admin", "testicek"],
                "parent_type": "project",
                "router_external": true,
                "route_target_list": { "route_target": ["target:64512:10000"] },
                "network_ipam_refs": [{
                    "to": ["default-domain", "default-project", "default-network-ipam"],
                    "attr": { "ipam_subnets": [{
                        "subnet": { "ip_prefix": "172.16.111.0", "ip_prefix_len": 24 }
                    }]}
                }],
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "virtual-network": {
                "fq_name": ["default-domain", "admin", "testicek"],
                "uuid": NEW_UUID,
                "href": format!("{}/virtual-network/{NEW_UUID}", server.uri()),
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&controller_config(&server, AuthCredentials::None))
        .await
        .unwrap();
    let res = NetworkReconciler::new(&client)
        .create("testicek", &testicek(), false)
        .await
        .unwrap();

    assert_eq!(res.result, Some(true));
    assert_eq!(res.comment, "Virtual network with name testicek was created");
}

#[tokio::test]
async fn test_create_dry_run_sends_no_write() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([])).await;
    mount_default_ipam(&server).await;

    Mock::given(method("POST"))
        .and(path("/virtual-networks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = connect(&controller_config(&server, AuthCredentials::None))
        .await
        .unwrap();
    let res = NetworkReconciler::new(&client)
        .create("testicek", &testicek(), true)
        .await
        .unwrap();

    assert_eq!(res.result, None);
    assert_eq!(res.comment, "Virtual network with name testicek will be created");
}

#[tokio::test]
async fn test_create_missing_ipam_is_not_found() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/fqname-to-id"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Name not found"))
        .mount(&server)
        .await;

    let client = connect(&controller_config(&server, AuthCredentials::None))
        .await
        .unwrap();
    let err = NetworkReconciler::new(&client)
        .create("net", &NetworkConfig::default(), false)
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::NotFound { ref entity_type, ref identifier }
            if entity_type == "network-ipam"
                && identifier == "default-domain:default-project:default-network-ipam")
    );
}

#[tokio::test]
async fn test_update_puts_merged_object() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        json!([{
            "fq_name": ["default-domain", "demo", "public"],
            "uuid": NET_UUID,
        }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/fqname-to-id"))
        .and(body_partial_json(json!({ "type": "virtual-network" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": NET_UUID })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/virtual-network/{NET_UUID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "virtual-network": {
                "fq_name": ["default-domain", "demo", "public"],
                "uuid": NET_UUID,
                "parent_type": "project",
                "display_name": "public",
                "id_perms": { "enable": true },
                "virtual_network_properties": { "rpf": "enable", "vxlan_network_identifier": 7 },
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/virtual-network/{NET_UUID}")))
        .and(body_partial_json(json!({
            "virtual-network": {
                "display_name": "public",
                "id_perms": { "enable": true },
                "virtual_network_properties": {
                    "rpf": "enable",
                    "vxlan_network_identifier": 7,
                    "forwarding_mode": "l3",
                },
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "virtual-network": { "uuid": NET_UUID }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&controller_config(&server, AuthCredentials::None))
        .await
        .unwrap();
    let conf = NetworkConfig {
        forwarding_mode: Some("l3".into()),
        ..NetworkConfig::default()
    };
    let res = NetworkReconciler::new(&client)
        .update("public", "demo", &conf, false)
        .await
        .unwrap();

    assert_eq!(res.result, Some(true));
    assert_eq!(res.comment, "Virtual network with name public was updated");
}

#[tokio::test]
async fn test_update_missing_network_reports_failure() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([])).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = connect(&controller_config(&server, AuthCredentials::None))
        .await
        .unwrap();
    let res = NetworkReconciler::new(&client)
        .update("ghost", "demo", &testicek(), false)
        .await
        .unwrap();

    assert_eq!(res.result, Some(false));
    assert_eq!(
        res.comment,
        "Network with name ghost in domain default-domain and project demo does not exist"
    );
}

#[tokio::test]
async fn test_unreachable_controller_is_connection_error() {
    let config = ControllerConfig {
        url: Url::parse("http://127.0.0.1:9").unwrap(),
        auth: AuthCredentials::None,
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(2),
        page_limit: None,
    };
    let client = connect(&config).await.unwrap();
    let err = NetworkReconciler::new(&client)
        .create("net", &NetworkConfig::default(), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::ConnectionFailed { .. } | CoreError::Timeout
    ));
}
