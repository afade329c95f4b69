//! VServer Group Lifecycle - Main application use case
//!
//! Implements the four lifecycle operations (create, read, update, delete)
//! for a vserver group, delegating every remote call to the SlbClient port.
//! Membership reconciliation is incremental: updates issue add/remove calls
//! from a set difference, never a full replacement.

use crate::domain::entities::{backend_servers_json, GroupSpec, GroupState};
use crate::domain::ports::{CreateVServerGroupRequest, SlbClient, SlbError};
use crate::domain::services::Reconciler;
use crate::domain::value_objects::RegionId;
use crate::infrastructure::retry::{retry_until, RetryDecision, RetryTimeout};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Slb(#[from] SlbError),

    #[error("vserver group has no remote id, nothing to update")]
    NotCreated,

    #[error("vserver group deletion did not complete: {0}")]
    DeleteTimeout(#[from] RetryTimeout),
}

/// Lifecycle driver for a vserver group resource.
///
/// Holds the client port, the region every call is scoped to, and the
/// delete polling knobs. One instance serves any number of resources;
/// per-resource state travels in [`GroupState`].
pub struct VServerGroupLifecycle {
    client: Arc<dyn SlbClient>,
    region: RegionId,
    delete_timeout: Duration,
    delete_poll_interval: Duration,
}

impl VServerGroupLifecycle {
    pub fn new(
        client: Arc<dyn SlbClient>,
        region: RegionId,
        delete_timeout: Duration,
        delete_poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            region,
            delete_timeout,
            delete_poll_interval,
        }
    }

    /// Create the vserver group remotely and read back its state.
    ///
    /// The create call is only issued when the declared binding set is
    /// non-empty; with no bindings the group is left unmaterialized and
    /// the returned state carries no id. That quirk is inherited behavior
    /// and deliberately preserved, hence the warning.
    pub async fn create(&self, spec: &GroupSpec) -> Result<GroupState, LifecycleError> {
        let mut state = GroupState::new(spec);

        let diff = Reconciler::plan(&state.bindings, &spec.bindings);
        if diff.add.is_empty() {
            tracing::warn!(
                "no backend bindings declared for {}, skipping create call; group has no remote id",
                spec.name
            );
        } else {
            let backend_servers = backend_servers_json(&diff.add).map_err(SlbError::from)?;
            let request = CreateVServerGroupRequest {
                load_balancer_id: spec.load_balancer_id.clone(),
                name: spec.name.clone(),
                backend_servers,
            };
            let created = self.client.create_vserver_group(&self.region, request).await?;
            tracing::info!(
                "created vserver group {} ({}) with {} bindings",
                created.group_id,
                spec.name,
                diff.add.len()
            );
            state.id = Some(created.group_id);
        }

        self.read(&mut state).await?;
        Ok(state)
    }

    /// Refresh observed state from the provider.
    ///
    /// A not-found response clears the id and returns Ok, so the caller
    /// treats the resource as deleted. Any other error propagates.
    pub async fn read(&self, state: &mut GroupState) -> Result<(), LifecycleError> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        match self.client.describe_vserver_group(&self.region, &id).await {
            Ok(attr) => {
                state.name = attr.name;
                state.bindings = attr.backend_servers.into_iter().collect();
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("vserver group {} gone, clearing id", id);
                state.clear_id();
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reconcile remote membership with the declared binding set.
    ///
    /// Issues an add call for bindings missing remotely and a remove call
    /// for bindings no longer declared, each only when non-empty. A failed
    /// call aborts immediately with no compensation; the next pass
    /// re-converges. Concludes with a read-back.
    pub async fn update(&self, state: &mut GroupState, desired: &GroupSpec) -> Result<(), LifecycleError> {
        let id = state.id.clone().ok_or(LifecycleError::NotCreated)?;

        let diff = Reconciler::plan(&state.bindings, &desired.bindings);
        tracing::debug!(
            "planned binding changes for {}: add={} remove={}",
            id,
            diff.add.len(),
            diff.remove.len()
        );

        if !diff.add.is_empty() {
            let payload = backend_servers_json(&diff.add).map_err(SlbError::from)?;
            self.client
                .add_backend_servers(&self.region, &id, &payload)
                .await?;
            tracing::info!("added {} backend servers to {}", diff.add.len(), id);
        }

        if !diff.remove.is_empty() {
            let payload = backend_servers_json(&diff.remove).map_err(SlbError::from)?;
            self.client
                .remove_backend_servers(&self.region, &id, &payload)
                .await?;
            tracing::info!("removed {} backend servers from {}", diff.remove.len(), id);
        }

        self.read(state).await
    }

    /// Delete the vserver group, riding out the provider's eventual
    /// consistency.
    ///
    /// Each attempt issues a delete call; a delete failure counts as
    /// "still in use" and retries. After a successful delete the group is
    /// re-described: still present means retry, no longer describable
    /// means done. Bounded by the configured timeout, fixed interval.
    pub async fn delete(&self, state: &mut GroupState) -> Result<(), LifecycleError> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        let client = self.client.as_ref();
        let region = &self.region;
        let group_id = &id;

        retry_until(self.delete_timeout, self.delete_poll_interval, move || async move {
            if let Err(e) = client.delete_vserver_group(region, group_id).await {
                return RetryDecision::Retry(format!("vserver group still in use: {}", e));
            }
            match client.describe_vserver_group(region, group_id).await {
                Ok(_) => RetryDecision::Retry("vserver group still describable".to_string()),
                // No longer describable counts as gone, whatever the error.
                Err(_) => RetryDecision::Done,
            }
        })
        .await?;

        tracing::info!("deleted vserver group {}", id);
        state.clear_id();
        Ok(())
    }
}
