use crate::config::AppConfig;
use crate::router::handle;
use crate::services::NoMatchPolicy;
use crate::tests::utils::{floor_areas_json, prices_json, read_xlsx, test_state, test_state_with, StubApi};
use astra::{Body, Response};
use http::{Method, Request};
use std::io::Read;

fn stub() -> StubApi {
    StubApi::new()
        .with_floor_areas(
            "SW1A 1AA",
            floor_areas_json(&[
                ("1 Example Road", Some(1000.0)),
                ("2 Example Road", Some(800.0)),
                ("3 Example Road", None),
            ]),
        )
        .with_prices("SW1A 1AA", prices_json(500.0, 35, "2024-05-22"))
}

fn get(uri: &str, htmx: bool) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if htmx {
        builder = builder.header("HX-Request", "true");
    }
    builder.body(Body::empty()).unwrap()
}

fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

#[test]
fn home_page_renders_search_and_uploader() {
    let state = test_state(stub());
    let resp = handle(get("/", false), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("hx-sync=\"this:replace\""));
    assert!(body.contains("data-upload-url=\"/bulk/upload\""));
}

#[test]
fn postcode_search_returns_fragment_with_all_properties() {
    let state = test_state(stub());
    let resp = handle(get("/search?q=SW1A+1AA", true), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(!body.contains("<html"));
    assert!(body.contains("Showing all properties in the postcode area"));
    assert!(body.contains("1 Example Road"));
    assert!(body.contains("3 Example Road"));
    assert!(body.contains("£500,000"));
}

#[test]
fn address_search_narrows_results() {
    let state = test_state(stub());
    let resp = handle(get("/search?q=2+Example+Road%2C+SW1A+1AA", true), &state).unwrap();
    let body = body_string(resp);

    assert!(body.contains("2 Example Road"));
    assert!(!body.contains("1 Example Road"));
    assert!(!body.contains("Showing all properties"));
}

#[test]
fn sorted_search_orders_rows() {
    let state = test_state(stub());
    let resp = handle(get("/search?q=SW1A+1AA&sort=floor_area_sq_ft&dir=desc", true), &state).unwrap();
    let body = body_string(resp);

    let first = body.find("1 Example Road").unwrap();
    let second = body.find("2 Example Road").unwrap();
    let third = body.find("3 Example Road").unwrap();
    assert!(first < second && second < third);
    assert!(body.contains("sort=floor_area_sq_ft&amp;dir=asc"));
}

#[test]
fn no_match_policy_is_configurable() {
    let uri = "/search?q=99+Nowhere+Lane%2C+SW1A+1AA";

    let body = body_string(handle(get(uri, true), &test_state(stub())).unwrap());
    assert!(body.contains("No matching properties found for this address."));
    assert!(!body.contains("1 Example Road"));

    let config = AppConfig {
        no_match_policy: NoMatchPolicy::ShowAllInPostcode,
        ..AppConfig::default()
    };
    let body = body_string(handle(get(uri, true), &test_state_with(config, stub())).unwrap());
    assert!(body.contains("Showing all properties in the postcode area"));
    assert!(body.contains("1 Example Road"));
}

#[test]
fn flat_numbers_can_be_ignored_when_matching() {
    let uri = "/search?q=Flat+2%2C+1+Example+Road%2C+SW1A+1AA";

    let body = body_string(handle(get(uri, true), &test_state(stub())).unwrap());
    assert!(body.contains("Exact match not found. Showing similar addresses."));
    assert!(body.contains("1 Example Road"));

    let config = AppConfig {
        strip_flat_numbers: true,
        ..AppConfig::default()
    };
    let body = body_string(handle(get(uri, true), &test_state_with(config, stub())).unwrap());
    assert!(!body.contains("Showing similar addresses"));
    assert!(body.contains("1 Example Road"));
    assert!(!body.contains("2 Example Road"));
}

#[test]
fn search_errors_render_inline() {
    let state = test_state(stub());
    let body = body_string(handle(get("/search?q=Example+Road", true), &state).unwrap());
    assert!(body.contains("Please include a valid UK postcode in the address"));
}

#[test]
fn plain_form_submission_gets_full_page() {
    let state = test_state(stub());
    let body = body_string(handle(get("/search?q=SW1A+1AA", false), &state).unwrap());
    assert!(body.contains("<html"));
    assert!(body.contains("1 Example Road"));
}

#[test]
fn export_downloads_property_workbook() {
    let state = test_state(stub());
    let resp = handle(get("/export?q=SW1A+1AA", false), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["Content-Disposition"],
        "attachment; filename=\"property_data_SW1A_1AA.xlsx\""
    );

    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    let sheets = read_xlsx(&bytes);
    assert_eq!(sheets[0].0, "Property Data");
    assert_eq!(sheets[0].1.len(), 4);
}

#[test]
fn export_without_results_is_bad_request() {
    let state = test_state(stub());
    match handle(get("/export?q=E1+1AA", false), &state) {
        Err(err) => {
            assert_eq!(err.status(), 400);
            assert!(err.to_string().contains("No data to export"));
        }
        Ok(_) => panic!("export of an empty search should fail"),
    }
}

#[test]
fn unknown_route_is_not_found() {
    let state = test_state(stub());
    match handle(get("/nope", false), &state) {
        Err(err) => assert_eq!(err.status(), 404),
        Ok(_) => panic!("expected 404"),
    }
}

#[test]
fn static_assets_are_served() {
    let state = test_state(stub());
    let resp = handle(get("/static/main.css", false), &state).unwrap();
    assert_eq!(resp.headers()["Content-Type"], "text/css; charset=utf-8");
    let resp = handle(get("/static/bulk.js", false), &state).unwrap();
    assert!(body_string(resp).contains("X-Filename"));
}
