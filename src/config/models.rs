use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Names of the Katello dependencies reported under `results.katello.services`.
pub const DEFAULT_KATELLO_SERVICES: [&str; 7] = [
    "candlepin",
    "candlepin_auth",
    "candlepin_events",
    "foreman_tasks",
    "katello_events",
    "pulp3",
    "pulp3_content",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub service: ServiceConfig,
    pub ping: PingConfig,
    pub port: PortConfig,
    pub katello: KatelloConfig,
    pub expected_failures: Vec<ExpectedFailureConfig>,
    pub strict_expected_failures: bool,
    pub report: ReportConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub unit: String,
    pub systemctl: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    pub path: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KatelloConfig {
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedFailureConfig {
    /// Check identifier, e.g. `katello_services_status[pulp3]`.
    pub check: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// node_exporter textfile collector target; nothing is written when unset.
    pub textfile: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            service: ServiceConfig::default(),
            ping: PingConfig::default(),
            port: PortConfig::default(),
            katello: KatelloConfig::default(),
            expected_failures: default_expected_failures(),
            strict_expected_failures: false,
            report: ReportConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 3000,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            unit: "foreman".to_string(),
            systemctl: "systemctl".to_string(),
        }
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            path: "/api/v2/ping".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for KatelloConfig {
    fn default() -> Self {
        Self {
            services: DEFAULT_KATELLO_SERVICES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_expected_failures() -> Vec<ExpectedFailureConfig> {
    let pulp = "Pulp is not yet integrated";
    vec![
        ExpectedFailureConfig {
            check: "katello_services_status[pulp3]".to_string(),
            reason: pulp.to_string(),
        },
        ExpectedFailureConfig {
            check: "katello_services_status[pulp3_content]".to_string(),
            reason: pulp.to_string(),
        },
        ExpectedFailureConfig {
            check: "katello_services_status[foreman_tasks]".to_string(),
            reason: "Foreman Tasks needs to boot workers, we don't wait enough".to_string(),
        },
    ]
}

impl TargetConfig {
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}://{}:{}", self.scheme, self.host, self.port))?)
    }
}

impl PingConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl PortConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Full URL of the ping endpoint on the target.
    pub fn ping_url(&self) -> Result<Url> {
        Ok(self.target.base_url()?.join(&self.ping.path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.host.trim().is_empty() {
            bail!("target.host must not be empty");
        }
        if self.target.port == 0 {
            bail!("target.port must be non-zero");
        }
        if !matches!(self.target.scheme.as_str(), "http" | "https") {
            bail!("target.scheme must be http or https, got {}", self.target.scheme);
        }
        if !self.ping.path.starts_with('/') {
            bail!("ping.path must start with '/', got {}", self.ping.path);
        }
        if self.service.unit.trim().is_empty() {
            bail!("service.unit must not be empty");
        }

        let mut seen = HashSet::new();
        for name in &self.katello.services {
            if !seen.insert(name.as_str()) {
                bail!("katello.services lists {} more than once", name);
            }
        }

        for entry in &self.expected_failures {
            if entry.reason.trim().is_empty() {
                bail!("expected failure for {} needs a reason", entry.check);
            }
        }

        self.ping_url()?;
        Ok(())
    }
}
