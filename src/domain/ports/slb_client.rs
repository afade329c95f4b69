//! SLB Client Port
//!
//! Defines the narrow slice of the provider's load-balancing API that the
//! vserver group lifecycle needs. Implementations may talk HTTP or be
//! in-memory fakes for tests.

use crate::domain::entities::BackendBinding;
use crate::domain::value_objects::{GroupId, RegionId};
use async_trait::async_trait;
use thiserror::Error;

/// Provider error codes that classify as "resource absent".
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidParameter.VServerGroupId",
    "VServerGroupNotFoundException",
    "InvalidVServerGroupId.NotFound",
];

/// Errors returned by SLB API calls.
#[derive(Debug, Error)]
pub enum SlbError {
    /// Well-formed provider error response.
    #[error("SLB API error {code}: {message} (request id: {request_id})")]
    Api {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SlbError {
    /// True when the error means the vserver group does not exist,
    /// as opposed to a genuine failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            SlbError::Api { code, .. } => {
                NOT_FOUND_CODES.contains(&code.as_str()) || code == "Http.404"
            }
            SlbError::Http(e) => e.status().is_some_and(|s| s.as_u16() == 404),
            SlbError::Serialization(_) => false,
        }
    }
}

/// Arguments for CreateVServerGroup.
#[derive(Debug, Clone)]
pub struct CreateVServerGroupRequest {
    pub load_balancer_id: String,
    pub name: String,
    /// Serialized backend list (JSON array of {ServerId, Port, Weight}),
    /// passed to the provider as an opaque string.
    pub backend_servers: String,
}

/// Result of CreateVServerGroup.
#[derive(Debug, Clone)]
pub struct CreatedVServerGroup {
    pub group_id: GroupId,
}

/// Attributes returned by DescribeVServerGroupAttribute.
#[derive(Debug, Clone)]
pub struct VServerGroupAttribute {
    pub group_id: GroupId,
    pub name: String,
    pub backend_servers: Vec<BackendBinding>,
}

/// Client for the provider's vserver group API.
///
/// This is an outbound port: the lifecycle calls it without knowing the
/// transport. All operations are scoped to a region.
#[async_trait]
pub trait SlbClient: Send + Sync {
    /// Create a vserver group with an initial backend list.
    async fn create_vserver_group(
        &self,
        region: &RegionId,
        request: CreateVServerGroupRequest,
    ) -> Result<CreatedVServerGroup, SlbError>;

    /// Fetch current attributes of a vserver group.
    async fn describe_vserver_group(
        &self,
        region: &RegionId,
        group_id: &GroupId,
    ) -> Result<VServerGroupAttribute, SlbError>;

    /// Add backend servers to an existing group.
    async fn add_backend_servers(
        &self,
        region: &RegionId,
        group_id: &GroupId,
        backend_servers: &str,
    ) -> Result<(), SlbError>;

    /// Remove backend servers from an existing group.
    async fn remove_backend_servers(
        &self,
        region: &RegionId,
        group_id: &GroupId,
        backend_servers: &str,
    ) -> Result<(), SlbError>;

    /// Delete a vserver group. Eventually consistent: the group may remain
    /// describable for a while after this returns.
    async fn delete_vserver_group(
        &self,
        region: &RegionId,
        group_id: &GroupId,
    ) -> Result<(), SlbError>;
}
