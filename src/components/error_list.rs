use leptos::*;

/// Renders request errors; renders nothing when there are none.
#[component]
pub fn ErrorList(errors: Vec<String>) -> impl IntoView {
    (!errors.is_empty()).then(|| {
        view! {
            <ul class="errors">
                { errors.into_iter().map(|e| view! { <li>{ e }</li> }).collect::<Vec<_>>() }
            </ul>
        }
    })
}
