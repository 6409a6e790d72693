//! Review listing and submission, independent of HTTP.
use crate::auth::Authenticator;
use crate::cloudant::CloudantClient;
use crate::config::{AppConfig, CloudantAuth, DEFAULT_PAGE_SIZE};
use crate::db::{Database, ReviewStore, StoreError};
use crate::models::review::{new_review_id, Review, ReviewForm};
use crate::nlu::{AnalysisError, NluClient, SentimentAnalyzer};
use crate::utils::strings;
use leptos::logging::{error, log, warn};
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a failed list or submit.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Unavailable dependencies and/or an incomplete form.
    #[error("request rejected: {}", .messages.join(" "))]
    Rejected { messages: Vec<String> },
    #[error("sentiment analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("database error: {0}")]
    Storage(#[from] StoreError),
}

impl ReviewError {
    /// Messages shown to the user in place of the normal page content.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ReviewError::Rejected { messages } => messages.clone(),
            ReviewError::Analysis(_) => vec![strings::NLU_NOT_ENOUGH_TEXT.to_string()],
            ReviewError::Storage(e) => vec![format!("{} {}", strings::CLOUDANT_ERROR, e)],
        }
    }
}

/// The long-lived clients shared by every request. Read-only after startup.
pub struct Services {
    pub store: Option<Arc<dyn ReviewStore>>,
    pub analyzer: Option<Arc<dyn SentimentAnalyzer>>,
    pub page_size: usize,
}

impl Services {
    pub fn new(
        store: Option<Arc<dyn ReviewStore>>,
        analyzer: Option<Arc<dyn SentimentAnalyzer>>,
    ) -> Self {
        Services {
            store,
            analyzer,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Builds the clients the configuration allows for and prepares the database.
    /// Anything that cannot be built is left out and reported by the credential gate.
    pub async fn connect(config: &AppConfig) -> Self {
        let http = match reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                error!("[CONFIG] Could not build HTTP client: {}", e);
                return Services::new(None, None).with_page_size(config.page_size);
            }
        };

        let store: Option<Arc<dyn ReviewStore>> = if let Some(cloudant) = &config.cloudant {
            let auth = match &cloudant.auth {
                CloudantAuth::Basic { username, password } => {
                    Authenticator::basic(username.as_str(), password.as_str())
                }
                CloudantAuth::ApiKey(apikey) => {
                    Authenticator::iam(http.clone(), config.iam_url.as_str(), apikey.as_str())
                }
            };
            log!("[CONFIG] Using Cloudant database {}", config.database_name);
            Some(Arc::new(CloudantClient::new(
                http.clone(),
                cloudant.url.as_str(),
                config.database_name.as_str(),
                auth,
            )))
        } else if let Some(path) = &config.sqlite_path {
            match Database::new(path) {
                Ok(db) => Some(Arc::new(db)),
                Err(e) => {
                    error!("[CONFIG] Could not open SQLite store {}: {}", path, e);
                    None
                }
            }
        } else {
            warn!("[CONFIG] No database credentials found");
            None
        };

        if let Some(store) = &store {
            if let Err(e) = store.ensure_database().await {
                warn!("[CONFIG] Could not prepare database {}: {}", config.database_name, e);
            }
        }

        let analyzer: Option<Arc<dyn SentimentAnalyzer>> = match &config.nlu {
            Some(nlu) => {
                log!("[CONFIG] Using NLU service at {}", nlu.url);
                let auth = Authenticator::iam(http.clone(), config.iam_url.as_str(), nlu.apikey.as_str());
                Some(Arc::new(NluClient::new(
                    http.clone(),
                    nlu.url.as_str(),
                    nlu.version.as_str(),
                    auth,
                )))
            }
            None => {
                warn!("[CONFIG] No NLU credentials found");
                None
            }
        };

        Services::new(store, analyzer).with_page_size(config.page_size)
    }
}

/// Reports which dependencies are unavailable, database first. Empty means both are usable.
pub fn check_service_credentials(services: &Services) -> Vec<String> {
    let mut errors = Vec::new();
    if services.store.is_none() {
        errors.push(strings::CLOUDANT_PROBLEM.to_string());
    }
    if services.analyzer.is_none() {
        errors.push(strings::NLU_PROBLEM.to_string());
    }
    errors
}

/// Fetches one page of stored reviews.
pub async fn list_reviews(services: &Services) -> Result<Vec<Review>, ReviewError> {
    let messages = check_service_credentials(services);
    let Some(store) = services.store.as_ref().filter(|_| messages.is_empty()) else {
        return Err(ReviewError::Rejected { messages });
    };

    store.list_reviews(services.page_size).await.map_err(|e| {
        error!("[FLOW] Listing reviews failed: {}", e);
        ReviewError::Storage(e)
    })
}

/// Validates, analyzes and stores one submission, returning the stored review.
pub async fn submit_review(services: &Services, form: &ReviewForm) -> Result<Review, ReviewError> {
    let mut messages = check_service_credentials(services);
    let draft = match form.validate() {
        Ok(draft) => Some(draft),
        Err(e) => {
            log!("[FLOW] Invalid submission: {}", e);
            messages.push(strings::INVALID_FORM.to_string());
            None
        }
    };

    let (Some(store), Some(analyzer), Some(draft)) = (&services.store, &services.analyzer, draft)
    else {
        return Err(ReviewError::Rejected { messages });
    };

    let sentiment = analyzer.analyze(&draft.review_text).await.map_err(|e| {
        warn!("[FLOW] Sentiment analysis failed: {}", e);
        ReviewError::Analysis(e)
    })?;

    let review = draft.into_review(new_review_id(), sentiment);
    store.insert_review(&review).await.map_err(|e| {
        error!("[FLOW] Failed to store review {}: {}", review.id, e);
        ReviewError::Storage(e)
    })?;

    log!("[FLOW] Stored review {} for {} ({})", review.id, review.movie, sentiment);
    Ok(review)
}
