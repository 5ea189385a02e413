use super::ProbeError;
use async_trait::async_trait;
use serde::Serialize;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceState {
    pub running: bool,
    pub enabled: bool,
}

#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn service_state(&self, unit: &str) -> Result<ServiceState, ProbeError>;

    fn name(&self) -> &'static str;
}

/// Queries systemd through the `systemctl` binary.
#[derive(Debug, Clone)]
pub struct Systemctl {
    binary: String,
}

impl Systemctl {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn query(&self, args: &[&str]) -> Result<Output, ProbeError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        debug!("Running {}", command);

        Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ProbeError::Command {
                command,
                message: e.to_string(),
            })
    }
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new("systemctl")
    }
}

#[async_trait]
impl ServiceManager for Systemctl {
    async fn service_state(&self, unit: &str) -> Result<ServiceState, ProbeError> {
        let load = self
            .query(&["show", "--property=LoadState", "--value", unit])
            .await?;
        if !load.status.success() {
            // systemd itself is unreachable (not booted with systemd, no bus access)
            return Err(ProbeError::Command {
                command: format!("{} show {}", self.binary, unit),
                message: String::from_utf8_lossy(&load.stderr).trim().to_string(),
            });
        }
        if !is_loaded(&String::from_utf8_lossy(&load.stdout)) {
            return Err(ProbeError::UnknownUnit(unit.to_string()));
        }

        // is-active and is-enabled exit non-zero for inactive/disabled units,
        // so only stdout is consulted.
        let active = self.query(&["is-active", unit]).await?;
        let enabled = self.query(&["is-enabled", unit]).await?;

        let state = ServiceState {
            running: is_running(&String::from_utf8_lossy(&active.stdout)),
            enabled: is_enabled(&String::from_utf8_lossy(&enabled.stdout)),
        };
        debug!("Unit {} state: {:?}", unit, state);
        Ok(state)
    }

    fn name(&self) -> &'static str {
        "systemd"
    }
}

fn is_loaded(load_state: &str) -> bool {
    !matches!(load_state.trim(), "not-found" | "")
}

fn is_running(active_state: &str) -> bool {
    matches!(active_state.trim(), "active" | "reloading")
}

/// States for which `systemctl is-enabled` exits 0.
fn is_enabled(unit_file_state: &str) -> bool {
    matches!(
        unit_file_state.trim(),
        "enabled" | "enabled-runtime" | "static" | "alias" | "indirect" | "generated" | "transient"
    )
}
