use crate::auth::{AuthError, Authenticator};
use crate::models::review::{Sentiment, UnknownSentiment};
use async_trait::async_trait;
use leptos::logging::{log, warn};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sentiment request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sentiment service answered {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("sentiment service returned no document sentiment")]
    MissingSentiment,
    #[error(transparent)]
    UnknownLabel(#[from] UnknownSentiment),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// Classifies free text as positive, negative or neutral.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Sentiment, AnalysisError>;
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    sentiment: Option<SentimentResult>,
}

#[derive(Debug, Deserialize)]
struct SentimentResult {
    document: Option<DocumentSentiment>,
}

#[derive(Debug, Deserialize)]
struct DocumentSentiment {
    label: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct NluErrorResponse {
    error: String,
}

/// Watson Natural Language Understanding client, sentiment feature only.
#[derive(Debug)]
pub struct NluClient {
    client: reqwest::Client,
    url: String,
    version: String,
    auth: Authenticator,
}

impl NluClient {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        version: impl Into<String>,
        auth: Authenticator,
    ) -> Self {
        NluClient {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            version: version.into(),
            auth,
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for NluClient {
    async fn analyze(&self, text: &str) -> Result<Sentiment, AnalysisError> {
        let request = self
            .client
            .post(format!("{}/v1/analyze", self.url))
            .query(&[("version", self.version.as_str())])
            .json(&json!({
                "text": text,
                "features": { "sentiment": {} },
            }));
        let response = self.auth.authorize(request).await?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<NluErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!("[NLU] Analysis rejected with {}: {}", status, message);
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: AnalyzeResponse = response.json().await?;
        let document = body
            .sentiment
            .and_then(|s| s.document)
            .ok_or(AnalysisError::MissingSentiment)?;
        log!("[NLU] Document sentiment {} ({:.3})", document.label, document.score);
        Ok(document.label.parse::<Sentiment>()?)
    }
}
