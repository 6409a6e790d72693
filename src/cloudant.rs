use crate::auth::Authenticator;
use crate::db::{ReviewStore, StoreError};
use crate::models::review::Review;
use async_trait::async_trait;
use leptos::logging::{log, warn};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

/// Client for a Cloudant (CouchDB-compatible) database holding the reviews.
#[derive(Debug)]
pub struct CloudantClient {
    client: reqwest::Client,
    base_url: String,
    db_name: String,
    auth: Authenticator,
}

#[derive(Debug, Deserialize)]
struct CouchError {
    error: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse {
    rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow {
    id: String,
    doc: Option<serde_json::Value>,
}

impl CloudantClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        db_name: impl Into<String>,
        auth: Authenticator,
    ) -> Self {
        CloudantClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            db_name: db_name.into(),
            auth,
        }
    }

    fn db_url(&self) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(&self.db_name))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let request = self.auth.authorize(request).await?;
        Ok(request.send().await?)
    }

    async fn list_databases(&self) -> Result<Vec<String>, StoreError> {
        let response = self
            .send(self.client.get(format!("{}/_all_dbs", self.base_url)))
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn create_database(&self) -> Result<(), StoreError> {
        let response = self
            .send(
                self.client
                    .put(self.db_url())
                    .query(&[("partitioned", "true")]),
            )
            .await?;

        // Another instance may have created it in the meantime.
        if response.status().as_u16() == 412 {
            return Ok(());
        }
        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx reply into a `StoreError::Status` carrying CouchDB's reason.
async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let reason = match serde_json::from_str::<CouchError>(&body) {
        Ok(CouchError {
            reason: Some(reason),
            ..
        }) => reason,
        Ok(CouchError {
            error: Some(error), ..
        }) => error,
        _ if body.is_empty() => status.canonical_reason().unwrap_or("request failed").to_string(),
        _ => body,
    };
    Err(StoreError::Status {
        status: status.as_u16(),
        reason,
    })
}

#[async_trait]
impl ReviewStore for CloudantClient {
    async fn ensure_database(&self) -> Result<(), StoreError> {
        let databases = self.list_databases().await?;
        if databases.iter().any(|name| name == &self.db_name) {
            return Ok(());
        }
        log!("[CLOUDANT] {} doesn't exist. Creating it.", self.db_name);
        self.create_database().await
    }

    async fn insert_review(&self, review: &Review) -> Result<String, StoreError> {
        let response = self
            .send(self.client.post(self.db_url()).json(review))
            .await?;
        let response = check_status(response).await.map_err(|e| {
            warn!("[CLOUDANT] Insert of {} rejected: {}", review.id, e);
            e
        })?;
        let result: DocumentResult = response.json().await?;
        log!("[CLOUDANT] Stored review {}", result.id);
        Ok(result.id)
    }

    async fn list_reviews(&self, limit: usize) -> Result<Vec<Review>, StoreError> {
        let response = self
            .send(
                self.client
                    .post(format!("{}/_all_docs", self.db_url()))
                    .json(&json!({ "include_docs": true, "limit": limit })),
            )
            .await?;
        let response = check_status(response).await?;
        let body: AllDocsResponse = response.json().await?;

        let mut reviews = Vec::with_capacity(body.rows.len());
        for row in body.rows {
            if row.id.starts_with("_design/") {
                continue;
            }
            let Some(doc) = row.doc else {
                continue;
            };
            match serde_json::from_value::<Review>(doc) {
                Ok(review) => reviews.push(review),
                Err(e) => warn!("[CLOUDANT] Skipping undecodable document {}: {}", row.id, e),
            }
        }
        Ok(reviews)
    }
}
