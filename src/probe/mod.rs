mod http;
mod port;
mod service;

pub use http::{HttpResponse, PingProbe};
pub use port::check_port;
pub use service::{ServiceManager, ServiceState, Systemctl};

use std::time::Duration;

/// Failure of the probe itself, as opposed to the probed thing being unhealthy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to run {command}: {message}")]
    Command { command: String, message: String },

    #[error("unit {0} is not known to the service manager")]
    UnknownUnit(String),

    #[error("could not resolve {host}: {message}")]
    Resolve { host: String, message: String },

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("{target} timed out after {elapsed:?}")]
    Timeout { target: String, elapsed: Duration },
}
