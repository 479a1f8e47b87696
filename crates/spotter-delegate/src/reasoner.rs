//! The consumed reasoning boundary and its HTTP implementation.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::client::{Answer, DelegationRequest};
use crate::errors::DelegateError;

/// The reasoning subsystem as this core consumes it: one request in, one
/// answer or typed failure out. No streaming.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Route a query to the requested specialist.
    async fn route(&self, request: &DelegationRequest) -> Result<Answer, DelegateError>;
}

/// Configuration for [`HttpReasoner`].
#[derive(Clone, Debug)]
pub struct HttpReasonerConfig {
    /// Base URL of the reasoning subsystem, e.g. `https://reasoner.internal`.
    pub base_url: String,
    /// Bearer token for the subsystem.
    pub api_key: String,
}

/// Wire shape of a successful route response.
#[derive(Debug, Deserialize)]
struct RouteResponse {
    answer: String,
}

/// HTTP implementation of [`Reasoner`].
///
/// JSON POST to `{base_url}/v1/route` with Bearer auth. Client errors map
/// to [`DelegateError::Rejected`], server and transport errors to
/// [`DelegateError::Unavailable`]. The time budget is enforced by the
/// [`DelegationClient`](crate::client::DelegationClient), not here.
pub struct HttpReasoner {
    config: HttpReasonerConfig,
    client: reqwest::Client,
}

impl HttpReasoner {
    /// Create a new HTTP reasoner.
    #[must_use]
    pub fn new(config: HttpReasonerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a new HTTP reasoner with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: HttpReasonerConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Build request headers.
    fn build_headers(&self) -> Result<HeaderMap, DelegateError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = format!("Bearer {}", self.config.api_key);
        let _ = headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| DelegateError::Rejected {
                message: format!("invalid API key header: {e}"),
            })?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl Reasoner for HttpReasoner {
    #[instrument(skip_all, fields(specialist = %request.specialist, provider = %request.provider.as_str()))]
    async fn route(&self, request: &DelegationRequest) -> Result<Answer, DelegateError> {
        let url = format!("{}/v1/route", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "specialist": request.specialist,
            "provider": request.provider,
            "query": request.query,
        });

        debug!(query_len = request.query.len(), "sending route request");

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| DelegateError::Unavailable {
                message: format!("transport error: {e}"),
            })?;

        let status = response.status();
        if status.is_client_error() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "route request rejected");
            return Err(DelegateError::Rejected {
                message: format!("{status}: {detail}"),
            });
        }
        if !status.is_success() {
            warn!(%status, "reasoning subsystem error");
            return Err(DelegateError::Unavailable {
                message: format!("upstream returned {status}"),
            });
        }

        let parsed: RouteResponse =
            response
                .json()
                .await
                .map_err(|e| DelegateError::Unavailable {
                    message: format!("malformed route response: {e}"),
                })?;

        Ok(Answer {
            text: parsed.answer,
            specialist: request.specialist,
            provider: request.provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotter_core::specialist::SpecialistTag;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::providers::ReasonerProvider;

    fn request(query: &str) -> DelegationRequest {
        DelegationRequest {
            specialist: SpecialistTag::Workout,
            provider: ReasonerProvider::Anthropic,
            query: query.to_string(),
        }
    }

    fn reasoner_for(server: &MockServer) -> HttpReasoner {
        HttpReasoner::new(HttpReasonerConfig {
            base_url: server.uri(),
            api_key: "test-key".into(),
        })
    }

    #[tokio::test]
    async fn successful_route_returns_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/route"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"specialist": "workout"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Three sets is plenty today."
            })))
            .mount(&server)
            .await;

        let reasoner = reasoner_for(&server);
        let answer = reasoner.route(&request("how many sets?")).await.unwrap();
        assert_eq!(answer.text, "Three sets is plenty today.");
        assert_eq!(answer.specialist, SpecialistTag::Workout);
    }

    #[tokio::test]
    async fn client_error_maps_to_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/route"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad query"))
            .mount(&server)
            .await;

        let reasoner = reasoner_for(&server);
        let err = reasoner.route(&request("?")).await.unwrap_err();
        assert_eq!(err.kind(), "rejected");
        assert!(err.to_string().contains("422"));
    }

    #[tokio::test]
    async fn server_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/route"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let reasoner = reasoner_for(&server);
        let err = reasoner.route(&request("?")).await.unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[tokio::test]
    async fn malformed_body_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/route"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let reasoner = reasoner_for(&server);
        let err = reasoner.route(&request("?")).await.unwrap_err();
        assert_eq!(err.kind(), "unavailable");
        assert!(err.to_string().contains("malformed"));
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_unavailable() {
        let reasoner = HttpReasoner::new(HttpReasonerConfig {
            base_url: "http://127.0.0.1:1".into(),
            api_key: "k".into(),
        });
        let err = reasoner.route(&request("?")).await.unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }
}
