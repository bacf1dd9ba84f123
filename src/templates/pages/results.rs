use crate::domain::table::{format_area, format_currency, format_date};
use crate::domain::{sort_properties, PropertyRecord, SortConfig, SortDirection, COLUMNS};
use crate::services::{SearchState, SearchSuccess};
use crate::templates::components::{error_message, notice};
use maud::{html, Markup};
use url::form_urlencoded;

fn search_url(query: &str, sort: Option<SortConfig>) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("q", query);
    if let Some(sort) = sort {
        params.append_pair("sort", sort.key.as_str());
        params.append_pair("dir", sort.direction.as_str());
    }
    format!("/search?{}", params.finish())
}

fn export_url(query: &str) -> String {
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query)
        .finish();
    format!("/export?{params}")
}

/// Fragment swapped into `#results` after a search.
pub fn results_fragment(state: &SearchState, sort: Option<SortConfig>) -> Markup {
    match state {
        SearchState::Idle => html! {},
        SearchState::Searching => html! { div class="spinner" aria-label="Searching" {} },
        SearchState::Error(message) => error_message(message),
        SearchState::Success(success) => success_fragment(success, sort),
    }
}

fn success_fragment(success: &SearchSuccess, sort: Option<SortConfig>) -> Markup {
    let mut properties = success.properties.clone();
    if let Some(sort) = sort {
        sort_properties(&mut properties, sort);
    }

    html! {
        @if let Some(n) = success.notice {
            (notice(n.message()))
        }
        @if !properties.is_empty() {
            div class="results-actions" {
                span { (properties.len()) " properties in " (success.postcode.to_uppercase()) }
                a class="btn export" href=(export_url(&success.query)) download { "Export to Excel" }
            }
            (property_table(&success.query, &properties, sort))
        }
    }
}

fn property_table(query: &str, properties: &[PropertyRecord], sort: Option<SortConfig>) -> Markup {
    html! {
        div class="table-wrap" {
            table class="property-table" {
                thead {
                    tr {
                        @for column in COLUMNS {
                            @let next = SortConfig::next_for(sort, column.key);
                            @let active = sort.filter(|s| s.key == column.key);
                            th scope="col" title=(column.tooltip) {
                                a
                                    href=(search_url(query, Some(next)))
                                    hx-get=(search_url(query, Some(next)))
                                    hx-target="#results"
                                    hx-swap="innerHTML"
                                {
                                    (column.label)
                                    @if let Some(active) = active {
                                        span class="sort-indicator" {
                                            @if active.direction == SortDirection::Asc { " ▲" } @else { " ▼" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                tbody {
                    @for p in properties {
                        tr {
                            td { (p.address) }
                            td class="num" { (format_area(p.floor_area_sq_ft)) }
                            td class="num" { (format_area(p.floor_area_sq_m)) }
                            td class="num" { (format_currency(p.price_per_sq_ft)) }
                            td class="num" { (format_currency(p.price_per_sq_m)) }
                            td class="num" {
                                (format_currency(p.estimated_value))
                                @if let Some(level) = p.confidence_level {
                                    @if p.estimated_value.is_some() {
                                        span class={ "confidence confidence-" (level.as_str().to_lowercase()) } title="Confidence in the estimate" {
                                            (level.as_str())
                                        }
                                    }
                                }
                            }
                            td class="num" { (p.habitable_rooms) }
                            td { (format_date(&p.inspection_date)) }
                        }
                    }
                }
            }
        }
    }
}
