// src/models/review.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Document-level sentiment label returned by the NLU service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sentiment label: {0}")]
pub struct UnknownSentiment(pub String);

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

/// A stored movie review. Field names follow the persisted document shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub movie: String,
    #[serde(rename = "review")]
    pub review_text: String,
    #[serde(
        default,
        deserialize_with = "lenient_sentiment",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment: Option<Sentiment>,
}

// Documents written by other tools may carry labels in any case or ones we don't know.
fn lenient_sentiment<'de, D>(deserializer: D) -> Result<Option<Sentiment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|value| value.as_str())
        .and_then(|label| label.parse().ok()))
}

/// Generates a document id with the `:1` partition suffix used by partitioned databases.
pub fn new_review_id() -> String {
    format!("{}:1", Uuid::new_v4())
}

/// Raw fields of the submission form. Absent keys deserialize as empty strings.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReviewForm {
    pub first_name: String,
    pub last_name: String,
    pub review: String,
    pub movie: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing form fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// A validated submission that has not been analyzed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub first_name: String,
    pub last_name: String,
    pub movie: String,
    pub review_text: String,
}

impl ReviewForm {
    /// Checks that all four fields carry non-blank text and returns them trimmed.
    pub fn validate(&self) -> Result<ReviewDraft, ValidationError> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("review", &self.review),
            ("movie", &self.movie),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(ReviewDraft {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            movie: self.movie.trim().to_string(),
            review_text: self.review.trim().to_string(),
        })
    }
}

impl ReviewDraft {
    pub fn into_review(self, id: String, sentiment: Sentiment) -> Review {
        Review {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            movie: self.movie,
            review_text: self.review_text,
            sentiment: Some(sentiment),
        }
    }
}
