use crate::bulk::{BulkProcessor, BulkSession, UploadedWorkbook, SESSION_COOKIE};
use crate::domain::{SortConfig, SortDirection, SortKey};
use crate::errors::ServerError;
use crate::responses::{html_response, html_response_with, json_response, static_response, ResultResp};
use crate::services::{
    get_floor_area, get_price_per_sqft, search, FloorAreaResponse, PriceRequest, PriceResponse, SearchState,
};
use crate::spreadsheets::{export_processed_xlsx, export_properties_xlsx, ERRORS_HEADER};
use crate::state::AppState;
use crate::templates;
use astra::Request;
use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;
use url::form_urlencoded;

const MAIN_CSS: &str = include_str!("../static/main.css");
const BULK_JS: &str = include_str!("../static/bulk.js");

const MAX_JSON_BYTES: u64 = 64 * 1024;
const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => home(&req, state),
        ("GET", "/search") => search_fragment(&req, state),
        ("GET", "/export") => export(&req, state),

        ("POST", "/api/get-floor-area") => api_floor_area(req, state),
        ("POST", "/api/get-price-per-sqft") => api_price(req, state),

        ("POST", "/bulk/upload") => bulk_upload(req, state),
        ("POST", "/bulk/sheet") => bulk_sheet(req, state),
        ("POST", "/bulk/process") => bulk_process(&req, state),

        ("GET", "/static/main.css") => static_response(MAIN_CSS, "text/css; charset=utf-8"),
        ("GET", "/static/bulk.js") => static_response(BULK_JS, "text/javascript; charset=utf-8"),

        _ => Err(ServerError::NotFound),
    }
}

fn run_search(state: &AppState, query: &str) -> SearchState {
    search(
        state.api.as_ref(),
        &state.normalizer,
        state.config.no_match_policy,
        query,
        state.now(),
    )
}

fn home(req: &Request, state: &AppState) -> ResultResp {
    let params = parse_query(req);
    let query = params.get("q").map(String::as_str).unwrap_or("").trim();

    let results = if query.is_empty() {
        None
    } else {
        Some(templates::pages::results_fragment(&run_search(state, query), None))
    };
    html_response(templates::pages::home_page(query, results))
}

fn search_fragment(req: &Request, state: &AppState) -> ResultResp {
    let params = parse_query(req);
    let query = params.get("q").map(String::as_str).unwrap_or("");
    let sort = sort_config(&params);

    let fragment = templates::pages::results_fragment(&run_search(state, query), sort);

    // Plain form submissions get the whole page back.
    if req.headers().contains_key("HX-Request") {
        html_response(fragment)
    } else {
        html_response(templates::pages::home_page(query.trim(), Some(fragment)))
    }
}

fn export(req: &Request, state: &AppState) -> ResultResp {
    let params = parse_query(req);
    let query = params.get("q").map(String::as_str).unwrap_or("");

    match run_search(state, query) {
        SearchState::Success(success) => export_properties_xlsx(&success.properties, query),
        _ => Err(ServerError::BadRequest("No data to export".into())),
    }
}

// The JSON endpoints answer every failure with a 200 and an error payload.
fn api_floor_area(req: Request, state: &AppState) -> ResultResp {
    let body = match read_body(req, MAX_JSON_BYTES) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "floor area request body rejected");
            return json_response(&FloorAreaResponse::error(e.to_string()));
        }
    };
    // Malformed JSON is answered like a missing address.
    let address = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("address").and_then(|a| a.as_str()).map(str::to_string))
        .unwrap_or_default();

    json_response(&get_floor_area(state.api.as_ref(), &address, state.now()))
}

fn api_price(req: Request, state: &AppState) -> ResultResp {
    let body = match read_body(req, MAX_JSON_BYTES) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "price request body rejected");
            return json_response(&PriceResponse::error(e.to_string()));
        }
    };
    let price_req: PriceRequest = serde_json::from_slice(&body).unwrap_or_default();

    json_response(&get_price_per_sqft(state.api.as_ref(), &price_req, state.now()))
}

fn bulk_upload(req: Request, state: &AppState) -> ResultResp {
    let filename = header_str(&req, "X-Filename")
        .map(decode_component)
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("Missing X-Filename header".into()))?;

    let bytes = read_body(req, MAX_UPLOAD_BYTES)?;
    let workbook = UploadedWorkbook::from_bytes(&filename, bytes).map_err(|e| {
        tracing::warn!(filename = %filename, error = ?e, "upload rejected");
        ServerError::BadRequest(e.to_string())
    })?;

    let session = BulkSession::new(workbook);
    let preview = templates::pages::bulk_preview(&session);
    let token = state.bulk.create(session);

    html_response_with(
        preview,
        &[(
            "Set-Cookie",
            format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"),
        )],
    )
}

fn bulk_sheet(req: Request, state: &AppState) -> ResultResp {
    let token = session_token(&req)?;
    let form = parse_form(&read_body(req, MAX_JSON_BYTES)?);
    let sheet = form
        .get("sheet")
        .ok_or_else(|| ServerError::BadRequest("Missing sheet".into()))?;

    let preview = state
        .bulk
        .with_session(&token, |session| {
            session
                .select_sheet(sheet)
                .map(|()| templates::pages::bulk_preview(session))
        })
        .ok_or_else(no_session)?
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    html_response(preview)
}

fn bulk_process(req: &Request, state: &AppState) -> ResultResp {
    let token = session_token(req)?;
    // Copy the rows out so the session lock is not held during lookups.
    let rows = state
        .bulk
        .with_session(&token, |session| session.valid_rows())
        .ok_or_else(no_session)?;

    let now = state.now();
    let report = BulkProcessor::new(state.api.as_ref(), &state.normalizer, state.config.bulk_strategy)
        .process(&rows, now);

    if report.has_output() {
        export_processed_xlsx(&report.processed, report.errors.len(), now.date_naive())
    } else {
        html_response_with(
            templates::pages::bulk_report(0, report.errors.len()),
            &[(ERRORS_HEADER, report.errors.len().to_string())],
        )
    }
}

fn no_session() -> ServerError {
    ServerError::BadRequest("Upload a spreadsheet first".into())
}

fn session_token(req: &Request) -> Result<String, ServerError> {
    cookie(req, SESSION_COOKIE).ok_or_else(no_session)
}

fn sort_config(params: &HashMap<String, String>) -> Option<SortConfig> {
    let key: SortKey = params.get("sort")?.parse().ok()?;
    let direction = params
        .get("dir")
        .and_then(|d| d.parse::<SortDirection>().ok())
        .unwrap_or_default();
    Some(SortConfig { key, direction })
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| parse_form(q.as_bytes()))
        .unwrap_or_default()
}

fn parse_form(body: &[u8]) -> HashMap<String, String> {
    form_urlencoded::parse(body).into_owned().collect()
}

/// Percent-decodes a single header value (the browser encodes filenames).
fn decode_component(raw: &str) -> String {
    form_urlencoded::parse(format!("v={}", raw.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| raw.to_string())
}

fn header_str<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn cookie(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get_all("Cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

#[derive(Debug, Error)]
enum BodyError {
    #[error("Request body too large")]
    TooLarge,
    #[error("Failed to read request body: {0}")]
    Unreadable(#[from] std::io::Error),
}

impl From<BodyError> for ServerError {
    fn from(e: BodyError) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

fn read_body(req: Request, limit: u64) -> Result<Vec<u8>, BodyError> {
    let mut body = req.into_body();
    let mut buf = Vec::new();
    body.reader().take(limit + 1).read_to_end(&mut buf)?;

    if buf.len() as u64 > limit {
        return Err(BodyError::TooLarge);
    }
    Ok(buf)
}
