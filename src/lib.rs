//! slb-vsgroup Library
//!
//! Declarative lifecycle management for an SLB virtual server group: a
//! named set of (server, port, weight) backend bindings attached to a
//! load balancer. This module exposes the components for use in
//! integration tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::outbound::{HttpSlbClient, SlbClientConfig};
pub use application::{LifecycleError, VServerGroupLifecycle};
pub use config::load_config;
pub use domain::entities::{backend_servers_json, BackendBinding, GroupSpec, GroupState, SpecError};
pub use domain::ports::{
    CreateVServerGroupRequest, CreatedVServerGroup, SlbClient, SlbError, VServerGroupAttribute,
};
pub use domain::services::{BindingDiff, Reconciler};
pub use domain::value_objects::{GroupId, RegionId};
pub use infrastructure::retry::{retry_until, RetryDecision, RetryTimeout};
