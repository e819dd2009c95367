//! Virtual network command handlers.

use serde_json::Value;
use tabled::Tabled;
use tracing::debug;

use vnc_core::model::ResourceRef;
use vnc_core::{ControllerClient, CoreError, NetworkConfig, NetworkReconciler, ReconcileResult};

use crate::cli::{DesiredStateArgs, GlobalOpts, NetworkArgs, NetworkCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
}

impl From<&ResourceRef> for NetworkRow {
    fn from(r: &ResourceRef) -> Self {
        let segment = |i: usize| r.fq_name.segments().get(i).cloned().unwrap_or_default();
        Self {
            domain: segment(0),
            project: segment(1),
            name: r.fq_name.name().unwrap_or_default().to_owned(),
            uuid: r.uuid.to_string(),
        }
    }
}

fn detail(r: &ReconcileResult) -> String {
    let result = match r.result {
        Some(true) => "true",
        Some(false) => "false",
        None => "pending (dry run)",
    };
    [
        format!("Name:    {}", r.name),
        format!("Result:  {result}"),
        format!("Comment: {}", r.comment),
    ]
    .join("\n")
}

// ── Desired configuration ───────────────────────────────────────────

/// Build the desired configuration: `--conf` / `--from-file` JSON first,
/// then every field flag given on the command line on top.
fn network_config(desired: &DesiredStateArgs) -> Result<NetworkConfig, CliError> {
    let mut config: NetworkConfig = if let Some(ref raw) = desired.conf {
        serde_json::from_str(raw)?
    } else if let Some(ref path) = desired.from_file {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)?
    } else {
        NetworkConfig::default()
    };

    config.merge(NetworkConfig {
        domain: desired.domain.clone(),
        project: None,
        ipam_domain: desired.ipam_domain.clone(),
        ipam_project: desired.ipam_project.clone(),
        ipam_name: desired.ipam_name.clone(),
        ip_prefix: desired.ip_prefix.clone(),
        ip_prefix_len: desired.ip_prefix_len,
        asn: desired.asn.clone(),
        target: desired.target.clone(),
        external: desired.external.as_deref().map(external_value),
        allow_transit: desired.allow_transit,
        forwarding_mode: desired.forwarding_mode.clone(),
        rpf: desired.rpf.clone(),
        mirror_destination: desired.mirror_destination,
    });

    Ok(config)
}

/// `--external` takes a JSON literal; anything unparsable is kept as a string.
fn external_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

// ── Outcome reporting ───────────────────────────────────────────────

/// Print the outcome. Fatal errors are still reported as a failed result
/// on stdout before they surface as a diagnostic.
fn report(
    name: &str,
    outcome: Result<ReconcileResult, CoreError>,
    format: OutputFormat,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (result, error) = match outcome {
        Ok(result) => (result, None),
        Err(err) => (ReconcileResult::failed(name, err.to_string()), Some(err)),
    };

    let out = output::render_single(format, &result, detail)?;
    output::print_output(&out, global.quiet);

    if let Some(err) = error {
        return Err(err.into());
    }
    if !result.is_success() {
        return Err(CliError::NotReconciled {
            name: result.name,
            comment: result.comment,
        });
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<C: ControllerClient>(
    client: &C,
    args: NetworkArgs,
    format: OutputFormat,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reconciler = NetworkReconciler::new(client);

    match args.command {
        NetworkCommand::Create {
            name,
            project,
            desired,
        } => {
            let mut config = network_config(&desired)?;
            if project.is_some() {
                config.project = project;
            }
            debug!(%name, dry_run = desired.test, "reconciling network create");
            let outcome = reconciler.create(&name, &config, desired.test).await;
            report(&name, outcome, format, global)
        }

        NetworkCommand::Update {
            name,
            project,
            desired,
        } => {
            let config = network_config(&desired)?;
            debug!(%name, %project, dry_run = desired.test, "reconciling network update");
            let outcome = reconciler.update(&name, &project, &config, desired.test).await;
            report(&name, outcome, format, global)
        }

        NetworkCommand::List { domain, project } => {
            let networks: Vec<ResourceRef> = client
                .list_networks()
                .await?
                .into_iter()
                .filter(|n| {
                    let segments = n.fq_name.segments();
                    domain
                        .as_deref()
                        .is_none_or(|d| segments.first().map(String::as_str) == Some(d))
                        && project
                            .as_deref()
                            .is_none_or(|p| segments.get(1).map(String::as_str) == Some(p))
                })
                .collect();

            let out = output::render_list(format, &networks, |r| NetworkRow::from(r))?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
