//! slb-vsgroup - Declarative SLB vserver group management
//!
//! This is the composition root: it wires the HTTP client into the
//! lifecycle and runs one apply or destroy pass against a desired-state
//! file, persisting the observed state locally between invocations.

use anyhow::{bail, Context};
use serde::Deserialize;
use slb_vsgroup::{
    load_config, BackendBinding, GroupSpec, GroupState, HttpSlbClient, RegionId, SlbClient,
    SlbClientConfig, VServerGroupLifecycle,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

/// On-disk desired-state file.
#[derive(Debug, Deserialize)]
struct SpecFile {
    name: String,
    slb_id: String,
    instances: Vec<InstanceEntry>,
}

#[derive(Debug, Deserialize)]
struct InstanceEntry {
    server_id: String,
    port: u16,
    weight: u32,
}

fn read_spec_file(path: &str) -> anyhow::Result<GroupSpec> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read spec file {}", path))?;
    let file: SpecFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse spec file {}", path))?;

    let bindings = file
        .instances
        .into_iter()
        .map(|i| BackendBinding::new(i.server_id, i.port, i.weight))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GroupSpec::new(file.name, file.slb_id, bindings)?)
}

fn load_state(path: &str) -> anyhow::Result<Option<GroupState>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path))?;
    let state = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse state file {}", path))?;
    Ok(Some(state))
}

fn save_state(path: &str, state: &GroupState) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(state)?;
    std::fs::write(path, raw).with_context(|| format!("failed to write state file {}", path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    // ===== COMPOSITION ROOT =====

    let client: Arc<dyn SlbClient> = Arc::new(HttpSlbClient::new(SlbClientConfig {
        endpoint: cfg.endpoint.clone(),
        access_key_id: cfg.access_key_id.clone(),
        access_key_secret: cfg.access_key_secret.clone(),
        request_timeout: Duration::from_secs(cfg.request_timeout_secs),
    })?);

    let lifecycle = VServerGroupLifecycle::new(
        client,
        RegionId::new(cfg.region.clone()),
        Duration::from_secs(cfg.delete_timeout_secs),
        Duration::from_secs(cfg.delete_poll_interval_secs),
    );

    match command.as_str() {
        "apply" => {
            let spec_path = match args.next() {
                Some(p) => p,
                None => bail!("usage: slb-vsgroup apply <spec.json>"),
            };
            let spec = read_spec_file(&spec_path)?;
            tracing::info!(
                "applying {} ({} bindings) in region {}",
                spec.name,
                spec.bindings.len(),
                cfg.region
            );

            let state = match load_state(&cfg.state_path)? {
                Some(mut state) => {
                    lifecycle.read(&mut state).await?;
                    if state.is_absent() {
                        lifecycle.create(&spec).await?
                    } else {
                        lifecycle.update(&mut state, &spec).await?;
                        state
                    }
                }
                None => lifecycle.create(&spec).await?,
            };

            save_state(&cfg.state_path, &state)?;
            match &state.id {
                Some(id) => tracing::info!("apply complete, group id {}", id),
                None => tracing::warn!("apply complete but group has no remote id"),
            }
        }
        "destroy" => {
            let Some(mut state) = load_state(&cfg.state_path)? else {
                tracing::info!("no state file at {}, nothing to destroy", cfg.state_path);
                return Ok(());
            };
            lifecycle.delete(&mut state).await?;
            std::fs::remove_file(&cfg.state_path)
                .with_context(|| format!("failed to remove state file {}", cfg.state_path))?;
            tracing::info!("destroy complete");
        }
        _ => bail!("usage: slb-vsgroup <apply|destroy> [spec.json]"),
    }

    Ok(())
}
