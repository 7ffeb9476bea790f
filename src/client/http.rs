//! reqwest-backed customer client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::client::outcome::{EnrichmentOutcome, FailureKind};
use crate::client::{ClientError, RemoteCustomerClient};
use crate::config::CustomerServiceConfig;
use crate::domain::Customer;
use crate::resilience::with_timeout;

const PEER_SERVICE: &str = "customer-service";

/// Calls `GET {base_url}/api/customers/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCustomerClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

/// A failed attempt, before the elapsed time is attached.
struct FetchError {
    kind: FailureKind,
    detail: String,
}

impl FetchError {
    fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            FailureKind::Timeout
        } else if e.is_connect() {
            FailureKind::ConnectionError
        } else if e.is_decode() || e.is_body() {
            FailureKind::DecodeError
        } else if e.is_status() {
            FailureKind::HttpError
        } else if e.is_request() {
            FailureKind::ConnectionError
        } else {
            FailureKind::Unexpected
        };
        FetchError::new(kind, e.to_string())
    }
}

impl HttpCustomerClient {
    pub fn new(config: &CustomerServiceConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::NotABase(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Percent-encodes `customer_id` as a single path segment.
    pub fn customer_url(&self, customer_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "customers", customer_id]);
        }
        url
    }

    async fn request(&self, url: Url) -> Result<Option<Customer>, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpError,
                format!("customer service responded {status}"),
            ));
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        // `null` decodes to None, same as an empty body.
        serde_json::from_slice::<Option<Customer>>(&body)
            .map_err(|e| FetchError::new(FailureKind::DecodeError, e.to_string()))
    }
}

#[async_trait]
impl RemoteCustomerClient for HttpCustomerClient {
    fn peer_service(&self) -> &str {
        PEER_SERVICE
    }

    fn endpoint(&self, customer_id: &str) -> String {
        self.customer_url(customer_id).to_string()
    }

    async fn fetch(&self, customer_id: &str) -> EnrichmentOutcome {
        let url = self.customer_url(customer_id);
        let started = Instant::now();
        let result = with_timeout(self.timeout, self.request(url)).await;
        let duration = started.elapsed();

        match result {
            Ok(Ok(Some(customer))) => EnrichmentOutcome::Success { customer, duration },
            Ok(Ok(None)) => EnrichmentOutcome::EmptyResponse { duration },
            Ok(Err(e)) => {
                tracing::debug!(customer_id, kind = %e.kind, detail = %e.detail, "Customer fetch failed");
                EnrichmentOutcome::failure(e.kind, e.detail, duration)
            }
            Err(elapsed) => EnrichmentOutcome::failure(FailureKind::Timeout, elapsed.to_string(), duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpCustomerClient {
        HttpCustomerClient::new(&CustomerServiceConfig {
            base_url: base_url.to_string(),
            timeout_ms: 300,
            connect_timeout_ms: 100,
        })
        .unwrap()
    }

    #[test]
    fn test_customer_url() {
        assert_eq!(
            client("http://localhost:8081").endpoint("123"),
            "http://localhost:8081/api/customers/123"
        );
        assert_eq!(
            client("http://gateway/customers-v1/").endpoint("a b/c"),
            "http://gateway/customers-v1/api/customers/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_unusable_base() {
        let config = CustomerServiceConfig {
            base_url: "mailto:ops@example.com".into(),
            ..CustomerServiceConfig::default()
        };
        assert!(matches!(HttpCustomerClient::new(&config), Err(ClientError::NotABase(_))));

        let config = CustomerServiceConfig {
            base_url: "not a url".into(),
            ..CustomerServiceConfig::default()
        };
        assert!(matches!(HttpCustomerClient::new(&config), Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        // Port 9 (discard) on loopback is closed on test machines.
        let outcome = client("http://127.0.0.1:9").fetch("123").await;
        match outcome {
            EnrichmentOutcome::Failure { kind, .. } => {
                assert!(matches!(kind, FailureKind::ConnectionError | FailureKind::Timeout))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
