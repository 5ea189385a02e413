mod checks;
mod payload;

pub use checks::{
    assert_cache_ok, assert_database_active, assert_katello_service_ok, assert_ping_ok,
    assert_port_reachable, assert_service_state, CheckError,
};
pub use payload::{is_truthy, HealthPayload, PayloadError};
