use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Run-level configuration for a single reconciliation pass, loaded via
/// `figment` layering a YAML file under environment-variable overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Worker pool size.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Inter-level pause in seconds.
    #[serde(default)]
    pub stage_delay_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_true")]
    pub emit_actions: bool,

    #[serde(default)]
    pub sanitize_output: bool,

    #[serde(default)]
    pub include_licenses: bool,

    #[serde(default)]
    pub is_konnect: bool,

    #[serde(default)]
    pub skip_ca_certs: bool,

    #[serde(default)]
    pub partial_apply: bool,

    #[serde(default)]
    pub consumer_group_policy_overrides: bool,

    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_base_secs")]
    pub base_secs: u64,
    #[serde(default = "default_retry_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_retry_max_retries")]
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_secs: default_retry_base_secs(),
            multiplier: default_retry_multiplier(),
            max_retries: default_retry_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gateway_version")]
    pub version: String,
}

impl RunConfig {
    /// Load configuration from a YAML file plus `GATESYNC_`-prefixed
    /// environment overrides (e.g. `GATESYNC_GATEWAY__BASE_URL`).
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        } else {
            for default_path in &["gatesync.yaml", "/etc/gatesync/gatesync.yaml"] {
                if std::path::Path::new(default_path).exists() {
                    figment = figment.merge(Yaml::file(default_path));
                    break;
                }
            }
        }

        figment = figment.merge(Env::prefixed("GATESYNC_").split("__"));

        let config: Self = figment.extract()?;
        Ok(config)
    }
}

fn default_parallelism() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_retry_base_secs() -> u64 {
    1
}

fn default_retry_multiplier() -> f64 {
    3.0
}

fn default_retry_max_retries() -> u32 {
    4
}

fn default_gateway_version() -> String {
    "3.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_defaults_match_default_backoff_schedule() {
        let retry = RetryConfig::default();
        assert_eq!(retry.base_secs, 1);
        assert_eq!(retry.multiplier, 3.0);
        assert_eq!(retry.max_retries, 4);
    }

    #[test]
    fn load_merges_env_overrides() {
        std::env::set_var("GATESYNC_GATEWAY__BASE_URL", "http://gw.internal:8001");
        std::env::set_var("GATESYNC_PARALLELISM", "20");
        let cfg = RunConfig::load(None).expect("env-only config should load");
        assert_eq!(cfg.gateway.base_url, "http://gw.internal:8001");
        assert_eq!(cfg.parallelism, 20);
        std::env::remove_var("GATESYNC_GATEWAY__BASE_URL");
        std::env::remove_var("GATESYNC_PARALLELISM");
    }
}
