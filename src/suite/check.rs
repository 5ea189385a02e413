use crate::config::Config;
use std::fmt;

/// One independent check of the suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    ServiceLiveness,
    PortReachable,
    PingStatus,
    Database,
    Cache,
    KatelloService(String),
}

impl Check {
    pub fn id(&self) -> String {
        match self {
            Check::ServiceLiveness => "foreman_service".to_string(),
            Check::PortReachable => "foreman_port".to_string(),
            Check::PingStatus => "foreman_status".to_string(),
            Check::Database => "foreman_status_database".to_string(),
            Check::Cache => "foreman_status_cache".to_string(),
            Check::KatelloService(name) => format!("katello_services_status[{}]", name),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Checks in execution order: the fixed Foreman checks, then one per Katello service.
pub fn plan(config: &Config) -> Vec<Check> {
    let mut checks = vec![
        Check::ServiceLiveness,
        Check::PortReachable,
        Check::PingStatus,
        Check::Database,
        Check::Cache,
    ];
    checks.extend(
        config
            .katello
            .services
            .iter()
            .cloned()
            .map(Check::KatelloService),
    );
    checks
}
