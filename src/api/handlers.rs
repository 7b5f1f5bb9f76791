//! HTTP handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::AppState;
use crate::models::page::page_offset;
use crate::models::{PlacesPage, Recommendation, PAGE_SIZE};
use crate::store::{MAX_RESULT_WINDOW, RECOMMENDATION_SIZE};

/// Title of the listing
const LISTING_NAME: &str = "Places";

type HandlerError = (StatusCode, String);

#[derive(Debug, Deserialize)]
pub struct PageQueryParams {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQueryParams {
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: bool,
}

/// Parse a 1-based page number; an absent or empty value means page 1.
pub fn parse_page(raw: Option<&str>) -> Result<usize, HandlerError> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(1),
        Some(s) => match s.parse::<usize>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err((StatusCode::BAD_REQUEST, "Invalid page number".to_string())),
        },
    }
}

fn parse_coordinate(raw: &str, what: &str) -> Result<f64, HandlerError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {}", what)))
}

async fn fetch_page(state: &AppState, params: &PageQueryParams) -> Result<PlacesPage, HandlerError> {
    let page = parse_page(params.page.as_deref())?;

    let in_window = page_offset(page).filter(|offset| {
        offset
            .checked_add(PAGE_SIZE)
            .is_some_and(|end| end <= MAX_RESULT_WINDOW)
    });

    let listed = match in_window {
        Some(offset) => state.store.list(PAGE_SIZE, offset).await,
        // Beyond the result window nothing can be listed, only counted
        None => state.store.count().await.map(|total| (Vec::new(), total)),
    };

    let (places, total) = listed.map_err(|e| {
        error!("Listing page {} failed: {}", page, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error fetching places".to_string(),
        )
    })?;

    Ok(PlacesPage::new(LISTING_NAME, places, total, page))
}

/// `GET /places`
pub async fn places_html(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQueryParams>,
) -> Result<Html<String>, HandlerError> {
    let page = fetch_page(&state, &params).await?;
    let html = state.template.render(&page).map_err(|e| {
        error!("Rendering page {} failed: {}", page.page, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error rendering template".to_string(),
        )
    })?;
    Ok(Html(html))
}

/// `GET /api/places`
pub async fn places_api(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQueryParams>,
) -> Result<Json<PlacesPage>, HandlerError> {
    fetch_page(&state, &params).await.map(Json)
}

/// `GET /api/recommend`
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecommendQueryParams>,
) -> Result<Json<Recommendation>, HandlerError> {
    let (lat, lon) = match (
        params.lat.as_deref().filter(|s| !s.is_empty()),
        params.lon.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Missing latitude or longitude".to_string(),
            ))
        }
    };

    let lat = parse_coordinate(lat, "latitude")?;
    let lon = parse_coordinate(lon, "longitude")?;

    let places = state
        .store
        .nearest(lat, lon, RECOMMENDATION_SIZE)
        .await
        .map_err(|e| {
            error!("Nearest search at ({}, {}) failed: {}", lat, lon, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching recommendations".to_string(),
            )
        })?;

    Ok(Json(Recommendation::new(places)))
}

/// `POST /api/get_token`
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, HandlerError> {
    let request: TokenRequest = serde_json::from_slice(&body).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid request payload".to_string(),
        )
    })?;

    let credentials = state.credentials.clone();
    let username = request.username.clone();
    // bcrypt verification is CPU-bound
    let verified = tokio::task::spawn_blocking(move || {
        credentials.verify(&request.username, &request.password)
    })
    .await
    .map_err(|e| {
        error!("Password check task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error checking credentials".to_string(),
        )
    })?;

    match verified {
        Ok(true) => {}
        Ok(false) => {
            warn!("Rejected login for {}", username);
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ));
        }
        Err(e) => {
            error!("Password check for {} failed: {}", username, e);
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ));
        }
    }

    let token = state.jwt.issue(&username).map_err(|e| {
        error!("Signing token failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error issuing token".to_string(),
        )
    })?;

    info!("Issued token for {}", username);
    Ok(Json(TokenResponse { token }))
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let healthy = state.store.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        store: healthy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("")).unwrap(), 1);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);

        for bad in ["0", "-1", "abc", "1.5"] {
            let (status, body) = parse_page(Some(bad)).unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, "Invalid page number");
        }
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("55.5", "latitude").unwrap(), 55.5);
        let (status, body) = parse_coordinate("north", "latitude").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid latitude");
    }
}
