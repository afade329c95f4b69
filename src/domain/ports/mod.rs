mod slb_client;

pub use slb_client::{
    CreateVServerGroupRequest, CreatedVServerGroup, SlbClient, SlbError, VServerGroupAttribute,
};
