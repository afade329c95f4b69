mod http_slb_client;

pub use http_slb_client::{HttpSlbClient, SlbClientConfig};
