//! A generic reqwest-based [`DecisionSource`] implementation.

use crate::error::DecisionSourceError;
use crate::source::DecisionSource;
use crate::types::{DecisionRequest, DecisionResponse, ModelTier};
use std::future::Future;

/// Default base URL, overridden in production via `Config`/`APP_URL`.
const DEFAULT_BASE_URL: &str = "https://api.example-model-provider.invalid";

/// HTTP client for a `{prompt, system?, max_tokens, temperature} ->
/// {text}`-shaped decision source endpoint.
pub struct HttpDecisionSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    tier: ModelTier,
}

impl HttpDecisionSource {
    /// Create a client targeting the default base URL at the `Small` tier.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            tier: ModelTier::Small,
        }
    }

    /// Override the base URL (tests point this at a `wiremock` server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the model tier.
    #[must_use]
    pub fn tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }
}

#[derive(serde::Serialize)]
struct CompletionRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(serde::Deserialize)]
struct CompletionResponseBody {
    text: String,
}

impl DecisionSource for HttpDecisionSource {
    fn decide(
        &self,
        request: DecisionRequest,
    ) -> impl Future<Output = Result<DecisionResponse, DecisionSourceError>> + Send {
        let url = self.completions_url();
        let api_key = self.api_key.clone();
        let model = self.tier.model_name();
        let http_client = self.client.clone();

        async move {
            let body = CompletionRequestBody {
                model,
                prompt: &request.prompt,
                system: request.system.as_deref(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            };

            tracing::debug!(url = %url, model, "sending decision request");

            let response = http_client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| DecisionSourceError::RequestFailed(e.to_string()))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| DecisionSourceError::RequestFailed(e.to_string()))?;

            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                return Err(DecisionSourceError::AuthFailed(text));
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(DecisionSourceError::RateLimited);
            }
            if !status.is_success() {
                return Err(DecisionSourceError::RequestFailed(format!("HTTP {status}: {text}")));
            }

            let parsed: CompletionResponseBody = serde_json::from_str(&text)
                .map_err(|e| DecisionSourceError::InvalidResponse(e.to_string()))?;

            Ok(DecisionResponse { raw_text: parsed.text })
        }
    }
}
