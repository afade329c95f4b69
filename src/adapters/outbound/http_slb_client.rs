//! HTTP SLB Client
//!
//! Implements SlbClient against the provider's RPC-style HTTP endpoint:
//! every call is a POST of a JSON parameter object carrying an `Action`
//! field, answered with a JSON body. Error responses carry a
//! {Code, Message, RequestId} body that maps onto SlbError::Api.
//!
//! Request signing is not implemented; credentials travel as headers and
//! a signing gateway (or a mock in tests) sits in front of the real API.

use crate::domain::entities::BackendBinding;
use crate::domain::ports::{
    CreateVServerGroupRequest, CreatedVServerGroup, SlbClient, SlbError, VServerGroupAttribute,
};
use crate::domain::value_objects::{GroupId, RegionId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct SlbClientConfig {
    /// Base URL of the SLB API endpoint
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for SlbClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://slb.aliyuncs.com".to_string(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Provider error body for non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateVServerGroupResponse {
    v_server_group_id: String,
}

/// Describe responses nest the backend list one level down.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeVServerGroupResponse {
    v_server_group_id: String,
    v_server_group_name: String,
    #[serde(default)]
    backend_servers: BackendServerList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BackendServerList {
    #[serde(default)]
    backend_server: Vec<BackendBinding>,
}

/// Calls acknowledged with nothing we need beyond the request id.
#[derive(Debug, Deserialize)]
struct AckResponse {
    #[allow(dead_code)]
    #[serde(default, rename = "RequestId")]
    request_id: String,
}

/// HTTP implementation of the SlbClient port.
pub struct HttpSlbClient {
    config: SlbClientConfig,
    client: reqwest::Client,
}

impl HttpSlbClient {
    pub fn new(config: SlbClientConfig) -> Result<Self, SlbError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Issue one RPC call and decode the response.
    async fn call<T: DeserializeOwned>(&self, params: Value) -> Result<T, SlbError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-slb-access-key-id", &self.config.access_key_id)
            .header("x-slb-access-key-secret", &self.config.access_key_secret)
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => Err(SlbError::Api {
                code: err.code,
                message: err.message,
                request_id: err.request_id,
            }),
            // Not a provider error body; fall back to the HTTP status.
            Err(_) => Err(SlbError::Api {
                code: format!("Http.{}", status.as_u16()),
                message: body,
                request_id: String::new(),
            }),
        }
    }
}

#[async_trait]
impl SlbClient for HttpSlbClient {
    async fn create_vserver_group(
        &self,
        region: &RegionId,
        request: CreateVServerGroupRequest,
    ) -> Result<CreatedVServerGroup, SlbError> {
        let response: CreateVServerGroupResponse = self
            .call(json!({
                "Action": "CreateVServerGroup",
                "RegionId": region.as_str(),
                "LoadBalancerId": request.load_balancer_id,
                "VServerGroupName": request.name,
                "BackendServers": request.backend_servers,
            }))
            .await?;
        Ok(CreatedVServerGroup {
            group_id: GroupId::new(response.v_server_group_id),
        })
    }

    async fn describe_vserver_group(
        &self,
        region: &RegionId,
        group_id: &GroupId,
    ) -> Result<VServerGroupAttribute, SlbError> {
        let response: DescribeVServerGroupResponse = self
            .call(json!({
                "Action": "DescribeVServerGroupAttribute",
                "RegionId": region.as_str(),
                "VServerGroupId": group_id.as_str(),
            }))
            .await?;
        Ok(VServerGroupAttribute {
            group_id: GroupId::new(response.v_server_group_id),
            name: response.v_server_group_name,
            backend_servers: response.backend_servers.backend_server,
        })
    }

    async fn add_backend_servers(
        &self,
        region: &RegionId,
        group_id: &GroupId,
        backend_servers: &str,
    ) -> Result<(), SlbError> {
        let _: AckResponse = self
            .call(json!({
                "Action": "AddVServerGroupBackendServers",
                "RegionId": region.as_str(),
                "VServerGroupId": group_id.as_str(),
                "BackendServers": backend_servers,
            }))
            .await?;
        Ok(())
    }

    async fn remove_backend_servers(
        &self,
        region: &RegionId,
        group_id: &GroupId,
        backend_servers: &str,
    ) -> Result<(), SlbError> {
        let _: AckResponse = self
            .call(json!({
                "Action": "RemoveVServerGroupBackendServers",
                "RegionId": region.as_str(),
                "VServerGroupId": group_id.as_str(),
                "BackendServers": backend_servers,
            }))
            .await?;
        Ok(())
    }

    async fn delete_vserver_group(
        &self,
        region: &RegionId,
        group_id: &GroupId,
    ) -> Result<(), SlbError> {
        let _: AckResponse = self
            .call(json!({
                "Action": "DeleteVServerGroup",
                "RegionId": region.as_str(),
                "VServerGroupId": group_id.as_str(),
            }))
            .await?;
        Ok(())
    }
}
