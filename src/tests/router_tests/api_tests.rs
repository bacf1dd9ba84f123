use crate::router::handle;
use crate::tests::utils::{floor_areas_json, prices_json, test_state, StubApi};
use astra::Body;
use http::{Method, Request};
use serde_json::{json, Value};
use std::io::Read;

fn stub() -> StubApi {
    StubApi::new()
        .with_floor_areas("W14 9RS", floor_areas_json(&[("18 Example Road", Some(850.0))]))
        .with_prices("W14 9RS", prices_json(1200.0, 15, "2024-03-01"))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn call(state: &crate::state::AppState, uri: &str, body: &str) -> Value {
    let resp = handle(post_json(uri, body), state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["Content-Type"], "application/json");

    let mut text = String::new();
    resp.into_body().reader().read_to_string(&mut text).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn floor_area_endpoint_returns_priced_properties() {
    let state = test_state(stub());
    let json = call(&state, "/api/get-floor-area", r#"{"address": "18 Example Road, W14 9RS"}"#);

    assert_eq!(json["status"], "success");
    let p = &json["data"]["properties"][0];
    assert_eq!(p["address"], "18 Example Road");
    assert_eq!(p["floor_area_sq_m"], 78.97);
    assert_eq!(p["estimated_value"], 1_020_000.0);
    assert_eq!(p["confidence_level"], "Medium");
    assert_eq!(p["transaction_count"], 15);
}

#[test]
fn floor_area_endpoint_reports_errors_with_200() {
    let state = test_state(stub());

    let json = call(&state, "/api/get-floor-area", r#"{"address": ""}"#);
    assert_eq!(json, json!({"status": "error", "message": "Address is required", "data": {"properties": []}}));

    let json = call(&state, "/api/get-floor-area", "not json");
    assert_eq!(json["message"], "Address is required");

    let json = call(&state, "/api/get-floor-area", r#"{"address": "18 Example Road"}"#);
    assert_eq!(json["message"], "Please include a valid UK postcode in the address");

    let json = call(&state, "/api/get-floor-area", r#"{"address": "E1 1AA"}"#);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Postcode not found");
}

#[test]
fn price_endpoint_accepts_postcode_or_address() {
    let state = test_state(stub());

    for body in [
        r#"{"postcode": "W14 9RS"}"#,
        r#"{"address": "W14 9RS"}"#,
        r#"{"address": "18 Example Road, W14 9RS"}"#,
    ] {
        let json = call(&state, "/api/get-price-per-sqft", body);
        assert_eq!(json["status"], "success", "{body}");
        assert_eq!(json["data"]["price_per_sq_ft"], 1200.0);
        assert_eq!(json["data"]["pricing_date"], "2024-03-01");
        assert_eq!(json["data"]["transaction_count"], 15);
        assert_eq!(json["data"]["postcode"], "W14 9RS");
    }

    let json = call(&state, "/api/get-price-per-sqft", "{}");
    assert_eq!(json["message"], "Postcode is required");
}

#[test]
fn oversized_bodies_get_json_errors() {
    let state = test_state(stub());
    let padding = "x".repeat(70 * 1024);
    let body = format!(r#"{{"address": "18 Example Road, W14 9RS", "notes": "{padding}"}}"#);

    let json = call(&state, "/api/get-floor-area", &body);
    assert_eq!(
        json,
        json!({"status": "error", "message": "Request body too large", "data": {"properties": []}})
    );

    let json = call(&state, "/api/get-price-per-sqft", &body);
    assert_eq!(json, json!({"status": "error", "message": "Request body too large"}));
}
