use super::payload::{is_truthy, HealthPayload, PayloadError};
use crate::probe::{HttpResponse, ProbeError, ServiceState};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// The probe worked and the target is unhealthy.
    #[error("{0}")]
    Assertion(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl CheckError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, CheckError::Assertion(_))
    }
}

fn assertion(message: impl Into<String>) -> CheckError {
    CheckError::Assertion(message.into())
}

pub fn assert_service_state(unit: &str, state: ServiceState) -> Result<(), CheckError> {
    match (state.running, state.enabled) {
        (true, true) => Ok(()),
        (false, true) => Err(assertion(format!("unit {} is not running", unit))),
        (true, false) => Err(assertion(format!("unit {} is not enabled", unit))),
        (false, false) => Err(assertion(format!(
            "unit {} is neither running nor enabled",
            unit
        ))),
    }
}

pub fn assert_port_reachable(host: &str, port: u16, reachable: bool) -> Result<(), CheckError> {
    if reachable {
        Ok(())
    } else {
        Err(assertion(format!("{}:{} is not reachable", host, port)))
    }
}

/// The call must complete and answer exactly 200.
pub fn assert_ping_ok(response: &Result<HttpResponse, ProbeError>) -> Result<(), CheckError> {
    match response {
        Err(e) => Err(assertion(format!("ping request did not complete: {}", e))),
        Ok(response) if response.status != 200 => Err(assertion(format!(
            "ping returned HTTP {}, expected 200",
            response.status
        ))),
        Ok(_) => Ok(()),
    }
}

pub fn assert_database_active(payload: &HealthPayload) -> Result<(), CheckError> {
    let active = payload.lookup(&["results", "foreman", "database", "active"])?;
    if is_truthy(active) {
        Ok(())
    } else {
        Err(assertion(format!("database is not active (active = {})", active)))
    }
}

/// Only the first cache server is inspected.
pub fn assert_cache_ok(payload: &HealthPayload) -> Result<(), CheckError> {
    let servers = payload.lookup(&["results", "foreman", "cache", "servers"])?;
    if !is_truthy(servers) {
        return Err(assertion("no cache servers reported"));
    }

    let status = payload.lookup(&["results", "foreman", "cache", "servers", "0", "status"])?;
    expect_ok(status, "first cache server")
}

pub fn assert_katello_service_ok(payload: &HealthPayload, service: &str) -> Result<(), CheckError> {
    let status = payload.lookup(&["results", "katello", "services", service, "status"])?;
    expect_ok(status, &format!("katello service {}", service))
}

fn expect_ok(status: &Value, subject: &str) -> Result<(), CheckError> {
    if status.as_str() == Some("ok") {
        Ok(())
    } else {
        Err(assertion(format!("{} status is {}, expected \"ok\"", subject, status)))
    }
}
