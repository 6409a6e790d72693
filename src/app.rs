/// Server-rendered pages of the movie reviews site.
/// Each page is rendered to a complete HTML document by `render_page`.
use leptos::*;
use crate::components::{error_list::ErrorList, review_form::ReviewForm, reviews_list::ReviewsList};
use crate::models::review::Review;

/// Renders a view to a standalone HTML document.
pub fn render_page<F, N>(page: F) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView,
{
    format!("<!DOCTYPE html>{}", leptos::ssr::render_to_string(page))
}

#[component]
fn Shell(title: &'static str, children: Children) -> impl IntoView {
    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>{ title }</title>
                <link rel="stylesheet" href="/assets/main.css" />
            </head>
            <body>
                <header>
                    <h1><a href="/">{ "Movie Reviews" }</a></h1>
                    <nav><a href="/reviews">{ "Reviews" }</a></nav>
                </header>
                <main>{ children() }</main>
            </body>
        </html>
    }
}

#[component]
pub fn IndexPage(errors: Vec<String>) -> impl IntoView {
    view! {
        <Shell title="Movie Reviews">
            <ErrorList errors=errors />
            <section class="intro">
                <p>{ "Tell us what you thought of a movie. Every review is scored for sentiment when it is submitted." }</p>
                <a class="button" href="/reviews">{ "Read and write reviews" }</a>
            </section>
        </Shell>
    }
}

#[component]
pub fn ReviewsPage(errors: Vec<String>, reviews: Vec<Review>) -> impl IntoView {
    view! {
        <Shell title="Reviews | Movie Reviews">
            <ErrorList errors=errors />
            <ReviewForm />
            <h3>{ "Reviews" }</h3>
            <ReviewsList reviews=reviews />
        </Shell>
    }
}
