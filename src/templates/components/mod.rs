use maud::{html, Markup};

pub mod error;
pub mod forms;

pub use error::{error_message, html_error_response};
pub use forms::{bulk_uploader, search_form};

pub fn button(label: &str) -> Markup {
    html! {
        button class="btn" { (label) }
    }
}

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn notice(message: &str) -> Markup {
    html! {
        p class="notice" { (message) }
    }
}
