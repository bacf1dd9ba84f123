use maud::{html, Markup};

pub fn search_form(query: &str) -> Markup {
    html! {
        form
            class="search-form"
            action="/search"
            method="get"
            hx-get="/search"
            hx-target="#results"
            hx-swap="innerHTML"
            hx-sync="this:replace"
            hx-indicator="#search-spinner"
        {
            label class="sr-only" for="q" { "Postcode or address" }
            input
                type="search"
                id="q"
                name="q"
                value=(query)
                placeholder="Enter a UK postcode or full address, e.g. 1 Example Road, SW1A 1AA"
                autocomplete="off";
            button type="submit" class="btn primary" {
                span class="btn-text" { "Search" }
                span id="search-spinner" class="spinner htmx-indicator" aria-hidden="true" {}
            }
        }
    }
}

pub fn bulk_uploader() -> Markup {
    html! {
        div class="bulk-uploader" {
            label for="bulk-file" { "Upload an Excel file with Address and Post Code columns" }
            input type="file" id="bulk-file" accept=".xlsx,.xls" data-upload-url="/bulk/upload" data-target="#bulk-area";
            p class="microcopy" { "Accepted formats: .xlsx, .xls" }
        }
    }
}
