use crate::router::handle;
use crate::spreadsheets::ERRORS_HEADER;
use crate::state::AppState;
use crate::tests::utils::{floor_areas_json, prices_json, read_xlsx, test_state, xlsx_bytes, StubApi};
use astra::{Body, Response};
use http::{Method, Request};
use std::io::Read;

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn stub() -> StubApi {
    StubApi::new()
        .with_floor_areas(
            "SW1A 1AA",
            floor_areas_json(&[("1 Example Road", Some(1000.0)), ("2 Example Road", Some(750.0))]),
        )
        .with_prices("SW1A 1AA", prices_json(500.0, 35, "2024-05-22"))
}

fn upload_bytes() -> Vec<u8> {
    xlsx_bytes(&[
        (
            "Addresses",
            &[
                &["Address", "Post Code"],
                &["1 Example Road", "SW1A 1AA"],
                &["9 Nowhere Lane", "SW1A 1AA"],
                &["3 Example Road", ""],
            ],
        ),
        ("Other", &[&["ADDRESS", "POSTCODE"], &["2 Example Road", "SW1A 1AA"]]),
    ])
}

fn upload(state: &AppState, filename: Option<&str>, bytes: Vec<u8>) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri("/bulk/upload");
    if let Some(name) = filename {
        builder = builder.header("X-Filename", name);
    }
    handle(builder.body(Body::from(bytes)).unwrap(), state).expect("Handler failed")
}

fn post_with_cookie(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Cookie", format!("bulk_session={token}"))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn session_token(resp: &Response) -> String {
    let cookie = resp.headers()["Set-Cookie"].to_str().unwrap();
    assert!(cookie.contains("HttpOnly"));
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("bulk_session="))
        .expect("session cookie")
        .to_string()
}

fn body_bytes(resp: Response) -> Vec<u8> {
    let mut body = Vec::new();
    resp.into_body().reader().read_to_end(&mut body).unwrap();
    body
}

#[test]
fn upload_previews_rows_and_sets_session_cookie() {
    let state = test_state(stub());
    let resp = upload(&state, Some("My%20Addresses.xlsx"), upload_bytes());
    assert_eq!(resp.status(), 200);
    let token = session_token(&resp);
    assert!(!token.is_empty());
    assert_eq!(state.bulk.len(), 1);

    let html = String::from_utf8(body_bytes(resp)).unwrap();
    assert!(html.contains("My Addresses.xlsx"));
    assert!(html.contains("1 Example Road"));
    assert!(html.contains("Missing or invalid postcode"));
    assert!(html.contains("Process Data"));
    assert!(html.contains(r#"<option value="Other">"#));
}

#[test]
fn switching_sheets_rebuilds_the_preview() {
    let state = test_state(stub());
    let token = session_token(&upload(&state, Some("book.xlsx"), upload_bytes()));

    let resp = handle(post_with_cookie("/bulk/sheet", &token, "sheet=Other"), &state).expect("Handler failed");
    let html = String::from_utf8(body_bytes(resp)).unwrap();
    assert!(html.contains("2 Example Road"));
    assert!(!html.contains("9 Nowhere Lane"));

    match handle(post_with_cookie("/bulk/sheet", &token, "sheet=Missing"), &state) {
        Err(err) => assert_eq!(err.to_string(), "Bad Request: Sheet not found: Missing"),
        Ok(_) => panic!("unknown sheet should be rejected"),
    }
}

#[test]
fn processing_downloads_matched_rows_and_counts_errors() {
    let state = test_state(stub());
    let token = session_token(&upload(&state, Some("book.xlsx"), upload_bytes()));

    let resp = handle(post_with_cookie("/bulk/process", &token, ""), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["Content-Type"], XLSX);
    assert_eq!(
        resp.headers()["Content-Disposition"],
        "attachment; filename=\"processed_data_2024-06-01.xlsx\""
    );
    // The unmatched lane counts, the row without a postcode was never valid.
    assert_eq!(resp.headers()[ERRORS_HEADER], "1");

    let sheets = read_xlsx(&body_bytes(resp));
    let rows = &sheets[0].1;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "1 Example Road");
    assert_eq!(rows[1][1], "SW1A 1AA");
}

#[test]
fn processing_with_no_matches_returns_report() {
    let state = test_state(StubApi::new());
    let token = session_token(&upload(&state, Some("book.xlsx"), upload_bytes()));

    let resp = handle(post_with_cookie("/bulk/process", &token, ""), &state).expect("Handler failed");
    assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
    assert_eq!(resp.headers()[ERRORS_HEADER], "2");

    let html = String::from_utf8(body_bytes(resp)).unwrap();
    assert!(html.contains("2 addresses could not be processed"));
}

#[test]
fn rejects_bad_uploads() {
    let state = test_state(stub());

    let mut builder = Request::builder().method(Method::POST).uri("/bulk/upload");
    builder = builder.header("X-Filename", "addresses.csv");
    match handle(builder.body(Body::from(b"a,b\n".to_vec())).unwrap(), &state) {
        Err(err) => assert_eq!(err.status(), 400),
        Ok(_) => panic!("csv upload should be rejected"),
    }

    let req = Request::builder()
        .method(Method::POST)
        .uri("/bulk/upload")
        .body(Body::from(upload_bytes()))
        .unwrap();
    match handle(req, &state) {
        Err(err) => assert_eq!(err.to_string(), "Bad Request: Missing X-Filename header"),
        Ok(_) => panic!("upload without filename should be rejected"),
    }

    match handle(
        Request::builder()
            .method(Method::POST)
            .uri("/bulk/upload")
            .header("X-Filename", "broken.xlsx")
            .body(Body::from(b"not a zip".to_vec()))
            .unwrap(),
        &state,
    ) {
        Err(err) => assert_eq!(
            err.to_string(),
            "Bad Request: Failed to read the Excel file. Please check the file format."
        ),
        Ok(_) => panic!("garbage should be rejected"),
    }
    assert_eq!(state.bulk.len(), 0);
}

#[test]
fn bulk_steps_require_a_session() {
    let state = test_state(stub());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/bulk/process")
        .body(Body::empty())
        .unwrap();
    match handle(req, &state) {
        Err(err) => assert_eq!(err.to_string(), "Bad Request: Upload a spreadsheet first"),
        Ok(_) => panic!("process without session should fail"),
    }

    match handle(post_with_cookie("/bulk/sheet", "stale-token", "sheet=Other"), &state) {
        Err(err) => assert_eq!(err.status(), 400),
        Ok(_) => panic!("unknown session should fail"),
    }
}
