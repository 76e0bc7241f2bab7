use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use parkwatch_core::{Capabilities, CostEstimator};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    pub anon_key: String,
    /// Session token of the signed-in user; reads fall back to the anon role without it
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_period")]
    pub period_seconds: u64,
    /// Only enable once `check_and_handle_overstay` is deployed
    #[serde(default)]
    pub overstay_sweep_enabled: bool,
    /// Page path fragments on which the monitor runs
    #[serde(default = "default_active_paths")]
    pub active_paths: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            period_seconds: default_period(),
            overstay_sweep_enabled: false,
            active_paths: default_active_paths(),
        }
    }
}

impl MonitorConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds.max(1))
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            overstay_sweep: self.overstay_sweep_enabled,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_overstay_rate")]
    pub overstay_rate_per_interval: f64,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            overstay_rate_per_interval: default_overstay_rate(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl PricingConfig {
    pub fn estimator(&self) -> CostEstimator {
        CostEstimator::new(self.overstay_rate_per_interval, self.interval_minutes)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Page the agent pretends to be mounted on
    #[serde(default = "default_page_path")]
    pub page_path: String,
    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            page_path: default_page_path(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_timeout() -> u64 { 10 }
fn default_period() -> u64 { 60 }
fn default_active_paths() -> Vec<String> {
    vec!["dashboard".to_string(), "admin".to_string()]
}
fn default_overstay_rate() -> f64 { 1.5 }
fn default_interval_minutes() -> u32 { 1 }
fn default_page_path() -> String { "/dashboard.html".to_string() }
fn default_log_filter() -> String {
    "parkwatch_agent=debug,parkwatch_monitor=info,parkwatch_lifecycle=info".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let source = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&source("default")))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&source(&run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name(&source("local")).required(false))
            // e.g. `PARKWATCH__BACKEND__ACCESS_TOKEN=...`
            .add_source(config::Environment::with_prefix("PARKWATCH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
