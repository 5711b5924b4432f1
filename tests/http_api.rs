use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use location_market::catalog::Catalog;
use location_market::favorites::{FavoriteController, FavoriteError, HttpFavoriteApi, QueryCache, TracingNotifier};
use location_market::models::Viewer;
use location_market::server::{build_router, AppState, Config};

const TOKEN: &str = "test-token";

fn state_with(vars: &[(&str, &str)]) -> Arc<AppState> {
    let vars: Vec<(String, String)> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let config = Config::from_lookup(|key| {
        vars.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    })
    .unwrap();
    AppState::with_catalog(config, Catalog::demo())
}

fn app() -> Router {
    build_router(state_with(&[]))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn mutation(method: Method, uri: &str, viewer: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-csrf-token", TOKEN)
        .header(header::COOKIE, format!("csrf_token={TOKEN}"));
    if let Some(viewer) = viewer {
        builder = builder.header("x-viewer-id", viewer);
    }
    builder.body(body).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|location| location["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_carries_security_headers() {
    let response = app().oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert!(headers.contains_key("content-security-policy"));
    assert!(!headers.contains_key("strict-transport-security"));
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn production_adds_hsts() {
    let app = build_router(state_with(&[("APP_ENV", "production")]));
    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert!(response.headers().contains_key("strict-transport-security"));
}

#[tokio::test]
async fn categories_list_taxonomy() {
    let response = app().oneshot(get("/api/categories")).await.unwrap();
    let body = json_body(response).await;

    let mains = body["main_categories"].as_array().unwrap();
    assert_eq!(mains.len(), 6);
    assert_eq!(mains[0]["name"], "Residential");
    assert!(!body["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_filters_and_decorates_cards() {
    let body = json_body(app().oneshot(get("/api/locations?category=Residential")).await.unwrap()).await;
    assert_eq!(ids(&body), ["loc_arts_district_loft", "loc_malibu_beach_house"]);
    assert_eq!(body[0]["card"]["city"], "Los Angeles");
    assert_eq!(body[0]["card"]["category"], "Loft");
    assert_eq!(body[0]["card"]["price_label"], "$175/hr");

    let body = json_body(app().oneshot(get("/api/locations?city=Vernon")).await.unwrap()).await;
    assert_eq!(ids(&body), ["loc_vernon_warehouse"]);

    let body = json_body(
        app()
            .oneshot(get("/api/locations?instant=true&max_price=200"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(ids(&body), ["loc_arts_district_loft", "loc_silver_lake_studio"]);
}

#[tokio::test]
async fn unknown_location_is_404() {
    let response = app().oneshot(get("/api/locations/loc_nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Location loc_nowhere not found");
}

#[tokio::test]
async fn quote_checks_hours() {
    let response = app()
        .oneshot(get("/api/locations/loc_vernon_warehouse/quote?hours=3"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 750.0);
    assert_eq!(body["requires_approval"], true);

    let response = app()
        .oneshot(get("/api/locations/loc_vernon_warehouse/quote?hours=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let response = app()
        .oneshot(get("/api/locations/loc_vernon_warehouse/quote?hours=-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].as_str().unwrap().contains("hours"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/locations/loc_vernon_warehouse/rating")
        .header("x-csrf-token", TOKEN)
        .header(header::COOKIE, format!("csrf_token={TOKEN}"))
        .header("x-viewer-id", "viewer-1")
        .body(Body::from(r#"{"score":4}"#))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(!json_body(response).await["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn csrf_token_sets_cookie() {
    let response = app().oneshot(get("/api/csrf-token")).await.unwrap();
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    let body = json_body(response).await;
    let token = body["token"].as_str().unwrap();

    assert_eq!(token.len(), 64);
    assert!(cookie.starts_with(&format!("csrf_token={token}")));
    assert!(cookie.contains("SameSite=Strict"));
}

#[tokio::test]
async fn mutation_without_csrf_is_forbidden() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/locations/loc_dtla_rooftop/save")
        .header("x-viewer-id", "viewer-1")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn save_requires_viewer() {
    let request = mutation(Method::POST, "/api/locations/loc_dtla_rooftop/save", None, Body::empty());
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn save_flow() {
    let app = app();
    let viewer = Some("viewer-1");

    let response = app
        .clone()
        .oneshot(mutation(Method::POST, "/api/locations/loc_dtla_rooftop/save", viewer, Body::empty()))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!({ "saved": true }));

    let request = Request::builder()
        .uri("/api/locations/loc_dtla_rooftop/saved")
        .header("x-viewer-id", "viewer-1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(json_body(response).await, json!({ "saved": true }));

    // anonymous viewers never have saved locations
    let response = app
        .clone()
        .oneshot(get("/api/locations/loc_dtla_rooftop/saved"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!({ "saved": false }));

    let request = Request::builder()
        .uri("/api/saved")
        .header("x-viewer-id", "viewer-1")
        .body(Body::empty())
        .unwrap();
    let body = json_body(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(ids(&body), ["loc_dtla_rooftop"]);

    let response = app
        .clone()
        .oneshot(mutation(Method::DELETE, "/api/locations/loc_dtla_rooftop/save", viewer, Body::empty()))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!({ "saved": false }));

    let request = Request::builder()
        .uri("/api/saved/ids")
        .header("x-viewer-id", "viewer-1")
        .body(Body::empty())
        .unwrap();
    assert_eq!(json_body(app.oneshot(request).await.unwrap()).await, json!([]));
}

#[tokio::test]
async fn rating_averages_viewers() {
    let app = app();
    for (viewer, score) in [("viewer-1", 5), ("viewer-2", 2)] {
        let body = Body::from(json!({ "score": score }).to_string());
        let request = mutation(Method::POST, "/api/locations/loc_malibu_beach_house/rating", Some(viewer), body);
        assert_eq!(app.clone().oneshot(request).await.unwrap().status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/locations/loc_malibu_beach_house/rating"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!({ "average": 3.5, "count": 2 }));

    let body = Body::from(json!({ "score": 9 }).to_string());
    let request = mutation(Method::POST, "/api/locations/loc_malibu_beach_house/rating", Some("viewer-1"), body);
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_413_json() {
    let app = build_router(state_with(&[("BODY_LIMIT_BYTES", "64")]));
    let padding = "x".repeat(256);
    let body = Body::from(json!({ "score": 4, "note": padding }).to_string());
    let request = mutation(Method::POST, "/api/locations/loc_malibu_beach_house/rating", Some("viewer-1"), body);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["error"], "Request entity too large");
}

#[tokio::test]
async fn webhook_skips_csrf_and_body_limit() {
    let app = build_router(state_with(&[("BODY_LIMIT_BYTES", "64")]));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/payments")
        .body(Body::from("y".repeat(4096)))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await, json!({ "received": true }));
}

#[tokio::test]
async fn diagnostic_page_is_html() {
    let response = app().oneshot(get("/ssl-diagnostic")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("Secure connection troubleshooting"));
}

#[tokio::test]
async fn managed_host_redirects_plain_http() {
    let app = build_router(state_with(&[("MANAGED_HOST", "true")]));
    let request = Request::builder()
        .uri("/api/locations?city=Malibu")
        .header(header::HOST, "market.example.com")
        .header("x-forwarded-proto", "http")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://market.example.com/api/locations?city=Malibu",
    );
}

#[tokio::test]
async fn development_fallback_is_404() {
    let response = app().oneshot(get("/some/client/route")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn markers_unavailable_without_maps_key() {
    let request = mutation(Method::POST, "/api/map/markers", None, Body::from("{}"));
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn favorite_controller_over_http() {
    let state = state_with(&[]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let router = build_router(state.clone());
    tokio::spawn(async move { axum::serve(listener, router).await });

    let api = Arc::new(HttpFavoriteApi::new(format!("http://{address}")).unwrap());
    let cache = Arc::new(QueryCache::new());
    let viewer = Some(Viewer::new("viewer-9"));

    let mut controller = FavoriteController::load(
        api.clone(),
        cache.clone(),
        Arc::new(TracingNotifier),
        viewer.clone(),
        "loc_silver_lake_studio",
    )
    .await
    .unwrap();
    let heart = controller.heart();
    assert!(!heart.is_active());

    assert_eq!(controller.toggle().await, Ok(true));
    assert!(heart.is_active());
    assert_eq!(
        state.favorites.saved_ids(&Viewer::new("viewer-9")).await,
        ["loc_silver_lake_studio"],
    );

    let mut missing = FavoriteController::new(api, cache, Arc::new(TracingNotifier), viewer, "loc_nowhere");
    let result = missing.toggle().await;
    assert!(matches!(result, Err(FavoriteError::Rejected { status: 404, .. })));
    assert!(!missing.is_favorite());
}
