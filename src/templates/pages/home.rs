// templates/pages/home.rs

use crate::templates::{
    components::{bulk_uploader, card, search_form},
    desktop_layout,
};
use maud::{html, Markup};

/// Landing page. `results` is pre-rendered when the page is requested
/// with a query, so the search also works without JavaScript.
pub fn home_page(query: &str, results: Option<Markup>) -> Markup {
    desktop_layout(
        "Floor Area Finder",
        html! {
            main class="container" {
                h1 { "UK Property Floor Area Finder" }
                p class="lead" {
                    "Look up EPC floor areas and local price per square foot by postcode or address."
                }

                (search_form(query))

                div id="results" aria-live="polite" {
                    @if let Some(results) = results {
                        (results)
                    }
                }

                section id="bulk" {
                    (card("Bulk processing", html! {
                        p { "Upload a spreadsheet of addresses to look up floor areas for every row." }
                        (bulk_uploader())
                        div id="bulk-area" {}
                    }))
                }
            }
        },
    )
}
