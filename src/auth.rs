//! Request authentication for the hosted services.
//!
//! Cloudant accepts either basic credentials or an IAM bearer token, the NLU service
//! only IAM. IAM tokens are exchanged for an API key and cached until shortly before
//! they expire.
use crate::config::REDACTED;
use leptos::logging::log;
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;

/// Seconds before expiry at which a cached token is refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;
const APIKEY_GRANT: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint answered {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub enum Authenticator {
    Basic { username: String, password: String },
    Iam(IamTokenManager),
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authenticator::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            Authenticator::Iam(manager) => f.debug_tuple("Iam").field(manager).finish(),
        }
    }
}

impl Authenticator {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Authenticator::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn iam(client: reqwest::Client, token_url: impl Into<String>, apikey: impl Into<String>) -> Self {
        Authenticator::Iam(IamTokenManager::new(client, token_url, apikey))
    }

    /// Attaches credentials to an outgoing request.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        match self {
            Authenticator::Basic { username, password } => {
                Ok(request.basic_auth(username, Some(password)))
            }
            Authenticator::Iam(manager) => {
                let token = manager.token().await?;
                Ok(request.bearer_auth(token))
            }
        }
    }
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expiration: i64,
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &REDACTED)
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expiration: Option<i64>,
    expires_in: Option<i64>,
}

pub struct IamTokenManager {
    client: reqwest::Client,
    token_url: String,
    apikey: String,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for IamTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamTokenManager")
            .field("token_url", &self.token_url)
            .field("apikey", &REDACTED)
            .finish_non_exhaustive()
    }
}

impl IamTokenManager {
    pub fn new(client: reqwest::Client, token_url: impl Into<String>, apikey: impl Into<String>) -> Self {
        IamTokenManager {
            client,
            token_url: token_url.into(),
            apikey: apikey.into(),
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid access token, requesting a new one when none is cached or the
    /// cached one is about to expire.
    pub async fn token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expiration - REFRESH_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        log!("[IAM] Requesting access token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[("grant_type", APIKEY_GRANT), ("apikey", self.apikey.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: TokenResponse = response.json().await?;
        let expiration = body
            .expiration
            .or_else(|| body.expires_in.map(|secs| now + secs))
            .unwrap_or(now);
        let token = CachedToken {
            access_token: body.access_token,
            expiration,
        };
        *cached = Some(token.clone());
        Ok(token.access_token)
    }
}
