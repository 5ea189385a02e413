use crate::health::{CheckError, HealthPayload};
use crate::probe::{HttpResponse, PingProbe, ProbeError};
use tokio::sync::OnceCell;
use tracing::{debug, error};

/// Per-run cache of the ping request and its parsed body. Each value is
/// computed on first use and shared by every later check of the same run.
pub struct Fixtures {
    ping: PingProbe,
    response: OnceCell<Result<HttpResponse, ProbeError>>,
    payload: OnceCell<Result<HealthPayload, CheckError>>,
}

impl Fixtures {
    pub fn new(ping: PingProbe) -> Self {
        Self {
            ping,
            response: OnceCell::new(),
            payload: OnceCell::new(),
        }
    }

    pub async fn ping_response(&self) -> &Result<HttpResponse, ProbeError> {
        self.response
            .get_or_init(|| async {
                let result = self.ping.fetch().await;
                if let Err(e) = &result {
                    error!("Ping probe failed: {}", e);
                }
                result
            })
            .await
    }

    /// The body is parsed whatever the status code was.
    pub async fn payload(&self) -> &Result<HealthPayload, CheckError> {
        self.payload
            .get_or_init(|| async {
                match self.ping_response().await {
                    Ok(response) => {
                        let parsed = HealthPayload::parse(&response.body).map_err(CheckError::from);
                        if let Err(e) = &parsed {
                            error!("{}", e);
                        } else {
                            debug!("Parsed ping payload from {}", self.ping.url());
                        }
                        parsed
                    }
                    Err(e) => Err(CheckError::Probe(e.clone())),
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn test_ping_is_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/ping")
            .with_status(200)
            .with_body(r#"{"results":{}}"#)
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap().join("/api/v2/ping").unwrap();
        let fixtures = Fixtures::new(PingProbe::new(url, None).unwrap());

        assert_eq!(fixtures.ping_response().await.as_ref().unwrap().status, 200);
        assert!(fixtures.payload().await.is_ok());
        assert!(fixtures.payload().await.is_ok());
        assert_eq!(fixtures.ping_response().await.as_ref().unwrap().status, 200);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/ping")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap().join("/api/v2/ping").unwrap();
        let fixtures = Fixtures::new(PingProbe::new(url, None).unwrap());

        let err = fixtures.payload().await.as_ref().unwrap_err();
        assert!(matches!(err, CheckError::Payload(_)));
    }
}
