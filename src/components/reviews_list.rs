use leptos::*;
use crate::models::review::Review;

#[component]
pub fn ReviewsList(reviews: Vec<Review>) -> impl IntoView {
    if reviews.is_empty() {
        return view! { <p class="empty">{ "No reviews yet." }</p> }.into_view();
    }

    view! {
        <table class="reviews">
            <thead>
                <tr>
                    <th>{ "Name" }</th>
                    <th>{ "Movie" }</th>
                    <th>{ "Review" }</th>
                    <th>{ "Sentiment" }</th>
                </tr>
            </thead>
            <tbody>
                {
                    reviews.into_iter().map(|review| {
                        let sentiment = review
                            .sentiment
                            .map(|s| s.as_str())
                            .unwrap_or("unknown");
                        view! {
                            <tr>
                                <td>{ format!("{} {}", review.first_name, review.last_name) }</td>
                                <td>{ review.movie }</td>
                                <td>{ review.review_text }</td>
                                <td class=format!("sentiment {}", sentiment)>{ sentiment }</td>
                            </tr>
                        }
                    }).collect::<Vec<_>>()
                }
            </tbody>
        </table>
    }
    .into_view()
}
