use leptos::*;

/// Plain HTML form posting a new review to `/reviews`.
#[component]
pub fn ReviewForm() -> impl IntoView {
    view! {
        <form class="review-form" method="post" action="/reviews">
            <h3>{ "Submit Review" }</h3>
            <label>
                "First name"
                <input type="text" name="first_name" />
            </label>
            <label>
                "Last name"
                <input type="text" name="last_name" />
            </label>
            <label>
                "Movie"
                <input type="text" name="movie" />
            </label>
            <label>
                "Review"
                <textarea name="review" rows="5" placeholder="Write your review here"></textarea>
            </label>
            <button type="submit">{ "Submit Review" }</button>
        </form>
    }
}
