use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;

use moviereviews::api;
use moviereviews::db::{Database, ReviewStore, StoreError};
use moviereviews::flow::Services;
use moviereviews::models::review::{Review, Sentiment};
use moviereviews::nlu::{AnalysisError, SentimentAnalyzer};
use moviereviews::utils::strings;

/// Labels text by keyword and refuses anything shorter than three words,
/// like the hosted service does for very short input.
struct KeywordAnalyzer;

#[async_trait]
impl SentimentAnalyzer for KeywordAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Sentiment, AnalysisError> {
        if text.split_whitespace().count() < 3 {
            return Err(AnalysisError::Rejected {
                status: 422,
                message: "not enough text for language id".into(),
            });
        }
        let text = text.to_lowercase();
        Ok(if text.contains("masterpiece") {
            Sentiment::Positive
        } else if text.contains("boring") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        })
    }
}

/// A database that is reachable at startup but refuses every later request.
struct UnavailableStore;

#[async_trait]
impl ReviewStore for UnavailableStore {
    async fn ensure_database(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_review(&self, _review: &Review) -> Result<String, StoreError> {
        Err(StoreError::Status {
            status: 503,
            reason: "service unavailable".into(),
        })
    }

    async fn list_reviews(&self, _limit: usize) -> Result<Vec<Review>, StoreError> {
        Err(StoreError::Status {
            status: 503,
            reason: "service unavailable".into(),
        })
    }
}

async fn memory_db() -> Arc<Database> {
    let db = Database::new(":memory:").unwrap();
    db.ensure_database().await.unwrap();
    Arc::new(db)
}

async fn body_text(resp: ServiceResponse) -> String {
    let body = test::read_body(resp).await;
    String::from_utf8(body.to_vec()).unwrap()
}

macro_rules! init_app {
    ($services:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($services))
                .configure(api::routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_index_reports_missing_configuration() {
    let app = init_app!(Services::new(None, None));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains(strings::CLOUDANT_PROBLEM));
    assert!(body.contains(strings::NLU_PROBLEM));
}

#[actix_web::test]
async fn test_index_without_errors_has_no_error_list() {
    let db = memory_db().await;
    let app = init_app!(Services::new(Some(db), Some(Arc::new(KeywordAnalyzer))));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body = body_text(resp).await;
    assert!(!body.contains("class=\"errors\""));
}

#[actix_web::test]
async fn test_submit_redirects_and_lists_review() {
    let db = memory_db().await;
    let app = init_app!(Services::new(Some(db.clone()), Some(Arc::new(KeywordAnalyzer))));

    let req = test::TestRequest::post()
        .uri("/reviews")
        .set_form(vec![
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("review", "A masterpiece of pacing and acting."),
            ("movie", "Inception"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/reviews");

    let stored = db.list_reviews(10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].first_name, "Ada");
    assert_eq!(stored[0].movie, "Inception");
    assert_eq!(stored[0].sentiment, Some(Sentiment::Positive));
    assert!(stored[0].id.ends_with(":1"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/reviews").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("Inception"));
    assert!(body.contains("positive"));
}

#[actix_web::test]
async fn test_listing_twice_has_no_side_effects() {
    let db = memory_db().await;
    let app = init_app!(Services::new(Some(db.clone()), Some(Arc::new(KeywordAnalyzer))));

    let req = test::TestRequest::post()
        .uri("/reviews")
        .set_form(vec![
            ("first_name", "Grace"),
            ("last_name", "Hopper"),
            ("review", "Long and boring in the middle."),
            ("movie", "Tenet"),
        ])
        .to_request();
    test::call_service(&app, req).await;

    let first = body_text(test::call_service(&app, test::TestRequest::get().uri("/reviews").to_request()).await).await;
    let second = body_text(test::call_service(&app, test::TestRequest::get().uri("/reviews").to_request()).await).await;
    assert!(first.contains("Tenet") && second.contains("Tenet"));
    assert!(second.contains("negative"));
    assert_eq!(db.list_reviews(10).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_empty_review_shows_validation_error() {
    let db = memory_db().await;
    let app = init_app!(Services::new(Some(db.clone()), Some(Arc::new(KeywordAnalyzer))));

    let req = test::TestRequest::post()
        .uri("/reviews")
        .set_form(vec![
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("review", ""),
            ("movie", "Inception"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::LOCATION).is_none());

    let body = body_text(resp).await;
    assert!(body.contains(strings::INVALID_FORM));
    assert!(db.list_reviews(10).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_missing_form_keys_count_as_empty() {
    let db = memory_db().await;
    let app = init_app!(Services::new(Some(db.clone()), Some(Arc::new(KeywordAnalyzer))));

    let req = test::TestRequest::post()
        .uri("/reviews")
        .set_form(vec![("first_name", "Ada")])
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains(strings::INVALID_FORM));
    assert!(db.list_reviews(10).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_short_review_shows_insufficient_text() {
    let db = memory_db().await;
    let app = init_app!(Services::new(Some(db.clone()), Some(Arc::new(KeywordAnalyzer))));

    let req = test::TestRequest::post()
        .uri("/reviews")
        .set_form(vec![
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("review", "Loved it"),
            ("movie", "Inception"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains(strings::NLU_NOT_ENOUGH_TEXT));
    assert!(db.list_reviews(10).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_reviews_without_database_shows_configuration_error() {
    let app = init_app!(Services::new(None, Some(Arc::new(KeywordAnalyzer))));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/reviews").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains(strings::CLOUDANT_PROBLEM));
    assert!(!body.contains(strings::NLU_PROBLEM));
}

#[actix_web::test]
async fn test_reviews_page_reports_database_failure() {
    let app = init_app!(Services::new(
        Some(Arc::new(UnavailableStore)),
        Some(Arc::new(KeywordAnalyzer))
    ));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/reviews").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains(strings::CLOUDANT_ERROR));
    assert!(body.contains("service unavailable"));
}

#[actix_web::test]
async fn test_failed_insert_renders_error_without_redirect() {
    let app = init_app!(Services::new(
        Some(Arc::new(UnavailableStore)),
        Some(Arc::new(KeywordAnalyzer))
    ));

    let req = test::TestRequest::post()
        .uri("/reviews")
        .set_form(vec![
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("review", "A masterpiece of pacing and acting."),
            ("movie", "Inception"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::LOCATION).is_none());

    let body = body_text(resp).await;
    assert!(body.contains(strings::CLOUDANT_ERROR));
}
