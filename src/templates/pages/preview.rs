use crate::bulk::{BulkSession, PREVIEW_LIMIT};
use crate::templates::components::{button, error_message};
use maud::{html, Markup};

/// Fragment swapped into `#bulk-area` after an upload or sheet change.
pub fn bulk_preview(session: &BulkSession) -> Markup {
    let rows = &session.preview_rows;
    let valid = rows.iter().filter(|r| r.is_valid).count();

    html! {
        div class="bulk-preview fade-in" {
            div class="bulk-header" {
                p { "File: " strong { (session.workbook.filename) } }

                @if session.workbook.sheets.len() > 1 {
                    form hx-post="/bulk/sheet" hx-target="#bulk-area" hx-swap="innerHTML" hx-trigger="change" {
                        label for="sheet" { "Sheet" }
                        select id="sheet" name="sheet" {
                            @for name in session.workbook.sheet_names() {
                                option value=(name) selected[name == session.selected_sheet] { (name) }
                            }
                        }
                    }
                }
            }

            p class="text-muted" {
                "Found " strong { (rows.len()) } " rows, " strong { (valid) } " valid."
                @if rows.len() > PREVIEW_LIMIT {
                    " Showing the first " (PREVIEW_LIMIT) "."
                }
            }

            @if rows.is_empty() {
                (error_message("No rows with an Address or Post Code column were found in this sheet."))
            } @else {
                table class="preview-table" {
                    thead {
                        tr {
                            th scope="col" { "Address" }
                            th scope="col" { "Post Code" }
                            th scope="col" { "Status" }
                        }
                    }
                    tbody {
                        @for row in rows.iter().take(PREVIEW_LIMIT) {
                            tr class=(if row.is_valid { "valid" } else { "invalid" }) {
                                td { (row.address) }
                                td { (row.postcode) }
                                td {
                                    @match &row.error {
                                        Some(error) => span class="badge badge-error" { (error) },
                                        None => span class="badge badge-ok" { "Valid" },
                                    }
                                }
                            }
                        }
                    }
                }
            }

            @if session.has_valid_rows() {
                div id="process-controls" data-process-url="/bulk/process" {
                    (button("Process Data"))
                    span class="spinner" aria-hidden="true" {}
                }
            }
            div id="bulk-report" {}
        }
    }
}

/// Shown when a bulk run produced nothing to download.
pub fn bulk_report(processed: usize, errors: usize) -> Markup {
    html! {
        div class="bulk-report" {
            @if processed == 0 {
                (error_message(&format!("{errors} addresses could not be processed. No file was produced.")))
            } @else {
                p { "Successfully processed " (processed) " addresses." }
            }
        }
    }
}
