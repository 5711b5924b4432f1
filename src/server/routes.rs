use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequestParts, OptionalFromRequestParts, Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::error::AppError;
use super::state::AppState;
use crate::catalog::{BookingQuote, RatingSummary, SearchParams};
use crate::display::CardSummary;
use crate::favorites::api::{CSRF_COOKIE, VIEWER_HEADER};
use crate::map::{MapSnapshot, MarkerPipeline};
use crate::models::{GeoPoint, Location, PropertyCategory, Viewer};
use crate::taxonomy::{self, MAIN_CATEGORIES};

pub const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint::new(34.0522, -118.2437);
pub const DEFAULT_MAP_ZOOM: u8 = 10;

fn viewer_from_headers(headers: &HeaderMap) -> Option<Viewer> {
    headers
        .get(VIEWER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Viewer::new)
}

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        viewer_from_headers(&parts.headers).ok_or(AppError::Unauthorized)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(viewer_from_headers(&parts.headers))
    }
}

/// A location together with its display-ready card fields
#[derive(Serialize)]
pub struct LocationView {
    #[serde(flatten)]
    pub location: Location,
    pub card: CardSummary,
}

impl From<Location> for LocationView {
    fn from(location: Location) -> Self {
        let card = CardSummary::from(&location);
        Self { location, card }
    }
}

#[derive(Serialize)]
pub struct MainCategoryView {
    pub name: &'static str,
    pub icon: &'static str,
    pub subcategories: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub main_categories: Vec<MainCategoryView>,
    pub categories: Vec<PropertyCategory>,
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub score: u8,
}

#[derive(Deserialize)]
pub struct QuoteParams {
    pub hours: u32,
}

#[derive(Deserialize, Default)]
pub struct MarkersRequest {
    /// Defaults to the whole catalog
    pub location_ids: Option<Vec<String>>,
    pub center: Option<GeoPoint>,
    pub zoom: Option<u8>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Issue a CSRF token as a cookie and echo it in the body.
pub async fn csrf_token(State(state): State<Arc<AppState>>) -> Response {
    let token = generate_token();
    let secure = if state.config.is_production() { "; Secure" } else { "" };
    let cookie = format!("{CSRF_COOKIE}={token}; Path=/; SameSite=Strict{secure}");
    ([(SET_COOKIE, cookie)], Json(json!({ "token": token }))).into_response()
}

pub async fn categories() -> Json<CategoriesResponse> {
    let main_categories = MAIN_CATEGORIES
        .iter()
        .map(|main| MainCategoryView {
            name: main.name,
            icon: main.icon,
            subcategories: taxonomy::subcategories(main.name),
        })
        .collect();
    Json(CategoriesResponse {
        main_categories,
        categories: taxonomy::categories(),
    })
}

pub async fn search_locations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<LocationView>> {
    Json(state.catalog.search(&params).into_iter().map(LocationView::from).collect())
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<LocationView>, AppError> {
    let location = state
        .catalog
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Location {id}")))?;
    Ok(Json(location.into()))
}

pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(state.catalog.rating(&id).await?))
}

pub async fn rate_location(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<String>,
    Json(request): Json<RateRequest>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(state.catalog.rate(&viewer, &id, request.score).await?))
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<BookingQuote>, AppError> {
    Ok(Json(state.catalog.quote(&id, params.hours)?))
}

fn require_location(state: &AppState, id: &str) -> Result<(), AppError> {
    match state.catalog.get(id) {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Location {id}"))),
    }
}

pub async fn is_saved(
    State(state): State<Arc<AppState>>,
    viewer: Option<Viewer>,
    Path(id): Path<String>,
) -> Json<Value> {
    let saved = match viewer {
        Some(viewer) => state.favorites.is_saved(&viewer, &id).await,
        None => false,
    };
    Json(json!({ "saved": saved }))
}

pub async fn save_location(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_location(&state, &id)?;
    state.favorites.save(&viewer, &id).await;
    Ok(Json(json!({ "saved": true })))
}

pub async fn unsave_location(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_location(&state, &id)?;
    state.favorites.unsave(&viewer, &id).await;
    Ok(Json(json!({ "saved": false })))
}

pub async fn saved_locations(State(state): State<Arc<AppState>>, viewer: Viewer) -> Json<Vec<LocationView>> {
    let ids = state.favorites.saved_ids(&viewer).await;
    Json(state.catalog.find_many(&ids).into_iter().map(LocationView::from).collect())
}

pub async fn saved_ids(State(state): State<Arc<AppState>>, viewer: Viewer) -> Json<Vec<String>> {
    Json(state.favorites.saved_ids(&viewer).await)
}

pub async fn map_markers(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MarkersRequest>,
) -> Result<Json<MapSnapshot>, AppError> {
    let sdk = state.maps.get().await?;
    let locations = match &request.location_ids {
        Some(ids) => state.catalog.find_many(ids),
        None => state.catalog.all().to_vec(),
    };

    let mut pipeline = MarkerPipeline::new(sdk);
    let snapshot = pipeline
        .render(
            &locations,
            request.center.unwrap_or(DEFAULT_MAP_CENTER),
            request.zoom.unwrap_or(DEFAULT_MAP_ZOOM),
        )
        .await;
    Ok(Json(snapshot))
}

/// Payment provider callback; the raw body is acknowledged, not processed.
pub async fn payment_webhook(body: Bytes) -> impl IntoResponse {
    info!("Received payment webhook ({} bytes)", body.len());
    (StatusCode::ACCEPTED, Json(json!({ "received": true })))
}

/// In development the client dev server owns every non-API path.
pub async fn dev_fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}
