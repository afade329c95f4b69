use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // SLB API settings
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub request_timeout_secs: u64,

    // Delete polling settings
    pub delete_timeout_secs: u64,
    pub delete_poll_interval_secs: u64,

    // Local state file for the one-shot CLI
    pub state_path: String,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://slb.aliyuncs.com".to_string(),
            region: "cn-hangzhou".to_string(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            request_timeout_secs: 30,
            delete_timeout_secs: 300,
            delete_poll_interval_secs: 5,
            state_path: "vsgroup.state.json".to_string(),
            debug: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let endpoint = std::env::var("SLB_ENDPOINT")
        .unwrap_or_else(|_| "https://slb.aliyuncs.com".to_string());

    let region = std::env::var("SLB_REGION").unwrap_or_else(|_| "cn-hangzhou".to_string());

    let access_key_id = std::env::var("SLB_ACCESS_KEY_ID").unwrap_or_default();

    let access_key_secret = std::env::var("SLB_ACCESS_KEY_SECRET").unwrap_or_default();

    let request_timeout_secs = std::env::var("SLB_REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(30);

    let delete_timeout_secs = std::env::var("SLB_DELETE_TIMEOUT_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    let delete_poll_interval_secs = std::env::var("SLB_DELETE_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .unwrap_or(5);

    let state_path = std::env::var("SLB_STATE_PATH")
        .unwrap_or_else(|_| "vsgroup.state.json".to_string());

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        endpoint,
        region,
        access_key_id,
        access_key_secret,
        request_timeout_secs,
        delete_timeout_secs,
        delete_poll_interval_secs,
        state_path,
        debug,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.endpoint, "https://slb.aliyuncs.com");
        assert_eq!(cfg.region, "cn-hangzhou");
        assert_eq!(cfg.delete_timeout_secs, 300);
        assert_eq!(cfg.delete_poll_interval_secs, 5);
        assert!(!cfg.debug);
    }

    #[test]
    fn test_load_config_defaults() {
        std::env::remove_var("SLB_ENDPOINT");
        std::env::remove_var("SLB_REGION");

        let cfg = load_config().unwrap();
        assert_eq!(cfg.endpoint, "https://slb.aliyuncs.com");
        assert_eq!(cfg.region, "cn-hangzhou");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.state_path, "vsgroup.state.json");
    }

    #[test]
    fn test_load_config_with_custom_region() {
        std::env::set_var("SLB_REGION", "eu-central-1");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.region, "eu-central-1");
        std::env::remove_var("SLB_REGION");
    }

    #[test]
    fn test_load_config_with_credentials() {
        std::env::set_var("SLB_ACCESS_KEY_ID", "ak-test");
        std::env::set_var("SLB_ACCESS_KEY_SECRET", "sk-test");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.access_key_id, "ak-test");
        assert_eq!(cfg.access_key_secret, "sk-test");
        std::env::remove_var("SLB_ACCESS_KEY_ID");
        std::env::remove_var("SLB_ACCESS_KEY_SECRET");
    }

    #[test]
    fn test_load_config_with_delete_settings() {
        std::env::set_var("SLB_DELETE_TIMEOUT_SECS", "600");
        std::env::set_var("SLB_DELETE_POLL_INTERVAL_SECS", "10");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.delete_timeout_secs, 600);
        assert_eq!(cfg.delete_poll_interval_secs, 10);
        std::env::remove_var("SLB_DELETE_TIMEOUT_SECS");
        std::env::remove_var("SLB_DELETE_POLL_INTERVAL_SECS");
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        std::env::set_var("SLB_DELETE_TIMEOUT_SECS", "not_a_number");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.delete_timeout_secs, 300); // default
        std::env::remove_var("SLB_DELETE_TIMEOUT_SECS");
    }

    #[test]
    fn test_load_config_with_debug() {
        std::env::set_var("DEBUG", "1");
        let cfg = load_config().unwrap();
        assert!(cfg.debug);
        std::env::remove_var("DEBUG");
    }
}
