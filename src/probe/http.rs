use super::ProbeError;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Status line and raw body of one ping request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

pub struct PingProbe {
    client: Client,
    url: Url,
    timeout: Option<Duration>,
}

impl PingProbe {
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self, ProbeError> {
        let mut builder = Client::builder();
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }

        let client = builder.build().map_err(|e| ProbeError::Http {
            url: url.to_string(),
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issues the GET. Any status code counts as a completed call.
    pub async fn fetch(&self) -> Result<HttpResponse, ProbeError> {
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!("GET {} returned HTTP {} ({} bytes)", self.url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    fn transport_error(&self, e: reqwest::Error) -> ProbeError {
        match self.timeout {
            Some(elapsed) if e.is_timeout() => ProbeError::Timeout {
                target: self.url.to_string(),
                elapsed,
            },
            _ => ProbeError::Http {
                url: self.url.to_string(),
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_captures_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/ping")
            .with_status(503)
            .with_body("down for maintenance")
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap().join("/api/v2/ping").unwrap();
        let probe = PingProbe::new(url, None).unwrap();
        let response = probe.fetch().await.unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.body, "down for maintenance");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("http://127.0.0.1:{}/api/v2/ping", port)).unwrap();
        let probe = PingProbe::new(url, Some(Duration::from_secs(2))).unwrap();

        let err = probe.fetch().await.unwrap_err();
        assert!(matches!(err, ProbeError::Http { .. }));
    }
}
