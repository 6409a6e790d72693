use actix_web::http::header;
use actix_web::{web, HttpResponse};
use leptos::logging::log;
use leptos::*;

use crate::app::{render_page, IndexPage, ReviewsPage};
use crate::flow::{check_service_credentials, list_reviews, submit_review, Services};
use crate::models::review::{Review, ReviewForm};

/// Registers the page routes. `Services` must be provided as app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/reviews", web::get().to(get_reviews))
        .route("/reviews", web::post().to(post_review));
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn reviews_page(errors: Vec<String>, reviews: Vec<Review>) -> HttpResponse {
    html(render_page(move || view! { <ReviewsPage errors=errors reviews=reviews /> }))
}

pub async fn index(services: web::Data<Services>) -> HttpResponse {
    let errors = check_service_credentials(&services);
    html(render_page(move || view! { <IndexPage errors=errors /> }))
}

pub async fn get_reviews(services: web::Data<Services>) -> HttpResponse {
    match list_reviews(&services).await {
        Ok(reviews) => {
            log!("[SERVER] Rendering {} reviews", reviews.len());
            reviews_page(Vec::new(), reviews)
        }
        Err(err) => reviews_page(err.messages(), Vec::new()),
    }
}

pub async fn post_review(
    services: web::Data<Services>,
    form: web::Form<ReviewForm>,
) -> HttpResponse {
    match submit_review(&services, &form).await {
        Ok(review) => {
            log!("[SERVER] Review {} saved, redirecting", review.id);
            HttpResponse::Found()
                .insert_header((header::LOCATION, "/reviews"))
                .finish()
        }
        Err(err) => reviews_page(err.messages(), Vec::new()),
    }
}
