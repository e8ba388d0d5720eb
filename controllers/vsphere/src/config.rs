//! Controller configuration from environment variables.

use crate::error::ControllerError;
use std::fmt;
use std::time::Duration;
use vsphere_client::DEFAULT_API_RELEASE;

const DEFAULT_TASK_POLL_INTERVAL_MS: u64 = 1000;

/// Settings read once at startup
#[derive(Clone)]
pub struct Config {
    /// vCenter host name or address (`VSPHERE_HOST`)
    pub vsphere_host: String,
    /// SSO user (`VSPHERE_USERNAME`)
    pub vsphere_username: String,
    /// SSO password (`VSPHERE_PASSWORD`)
    pub vsphere_password: String,
    /// Accept a self-signed vCenter certificate (`VSPHERE_INSECURE`)
    pub insecure: bool,
    /// vim25 release used in API paths (`VSPHERE_API_RELEASE`)
    pub api_release: String,
    /// Delay between task info polls (`VSPHERE_TASK_POLL_INTERVAL_MS`)
    pub task_poll_interval: Duration,
    /// Namespace to watch (`WATCH_NAMESPACE`)
    pub namespace: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ControllerError::InvalidConfig(format!("{} environment variable is required", key)))
        };

        let insecure = match lookup("VSPHERE_INSECURE") {
            None => false,
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ControllerError::InvalidConfig(format!("VSPHERE_INSECURE must be true or false, got '{}'", value))
            })?,
        };

        let task_poll_interval = match lookup("VSPHERE_TASK_POLL_INTERVAL_MS") {
            None => Duration::from_millis(DEFAULT_TASK_POLL_INTERVAL_MS),
            Some(value) => value.parse::<u64>().map(Duration::from_millis).map_err(|e| {
                ControllerError::InvalidConfig(format!("VSPHERE_TASK_POLL_INTERVAL_MS '{}': {}", value, e))
            })?,
        };

        Ok(Self {
            vsphere_host: required("VSPHERE_HOST")?,
            vsphere_username: required("VSPHERE_USERNAME")?,
            vsphere_password: required("VSPHERE_PASSWORD")?,
            insecure,
            api_release: lookup("VSPHERE_API_RELEASE").unwrap_or_else(|| DEFAULT_API_RELEASE.to_string()),
            task_poll_interval,
            namespace: lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty()),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("vsphere_host", &self.vsphere_host)
            .field("vsphere_username", &self.vsphere_username)
            .field("vsphere_password", &"<redacted>")
            .field("insecure", &self.insecure)
            .field("api_release", &self.api_release)
            .field("task_poll_interval", &self.task_poll_interval)
            .field("namespace", &self.namespace)
            .finish()
    }
}
