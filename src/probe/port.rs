use super::ProbeError;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;

/// Resolves `host` and reports whether any of its addresses accepts a TCP
/// connection on `port`. Resolution failure is an error; refused or timed out
/// connections just mean "not reachable".
pub async fn check_port(
    host: &str,
    port: u16,
    connect_timeout: Option<Duration>,
) -> Result<bool, ProbeError> {
    let addrs: Vec<_> = lookup_host((host, port))
        .await
        .map_err(|e| ProbeError::Resolve {
            host: host.to_string(),
            message: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ProbeError::Resolve {
            host: host.to_string(),
            message: "no addresses found".to_string(),
        });
    }

    for addr in addrs {
        let connect = TcpStream::connect(addr);
        let result = match connect_timeout {
            Some(limit) => match timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => {
                    debug!("Connect to {} timed out after {:?}", addr, limit);
                    continue;
                }
            },
            None => connect.await,
        };

        match result {
            Ok(_) => {
                debug!("{} is reachable", addr);
                return Ok(true);
            }
            Err(e) => debug!("Connect to {} failed: {}", addr, e),
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(check_port("127.0.0.1", port, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let reachable = check_port("127.0.0.1", port, Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(!reachable);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_error() {
        let err = check_port("does-not-exist.invalid", 3000, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Resolve { .. }));
    }
}
