mod handlers;
mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::location::LocationResolver;
use crate::offices::OfficeRegistry;

pub fn build_router() -> Router {
    build_router_with(LocationResolver::new())
}

/// Router over an explicit resolver (offline or custom cache).
pub fn build_router_with(resolver: LocationResolver) -> Router {
    let state = Arc::new(AppState {
        resolver: Mutex::new(resolver),
        registry: OfficeRegistry::massachusetts(),
    });

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/offices", get(handlers::office_list))
        .route("/api/offices/{code}", get(handlers::office_by_code))
        .route("/api/nearest", get(handlers::nearest))
        .route("/api/markers", get(handlers::office_markers))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resolver: LocationResolver) -> std::io::Result<()> {
    let app = build_router_with(resolver);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("RMV locator listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationCache;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn offline_router() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut resolver = LocationResolver::with_cache(LocationCache::load_from(dir.path().join("cache.json")));
        resolver.set_offline(true);
        (build_router_with(resolver), dir)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_office_list() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/offices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 17);
        assert_eq!(body[0]["code"], "601");
    }

    #[tokio::test]
    async fn test_office_by_code() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app.clone(), "/api/offices/670").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Watertown");

        let (status, body) = get_json(app, "/api/offices/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_nearest_by_city() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/nearest?city=worcester").await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["code"], "628");
        assert_eq!(results[0]["near"], true);
        assert_eq!(results[1]["code"], "613");
    }

    #[tokio::test]
    async fn test_nearest_by_coordinates_with_limit() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/nearest?lat=42.3601&lon=-71.0589&limit=4").await;
        assert_eq!(status, StatusCode::OK);
        let codes: Vec<&str> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["601", "622", "670", "620"]);
    }

    #[tokio::test]
    async fn test_nearest_unknown_city_uses_default_center() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/nearest?city=zzzzzzzz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"]["source"], "Fallback");
        assert_eq!(body["results"][0]["code"], "601");
    }

    #[tokio::test]
    async fn test_nearest_invalid_coordinate() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/nearest?lat=200&lon=-71").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid coordinate"));
    }

    #[tokio::test]
    async fn test_nearest_half_coordinate_rejected() {
        let (app, _dir) = offline_router();
        let (status, _) = get_json(app, "/api/nearest?lat=42.0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_markers_cover_every_office() {
        let (app, _dir) = offline_router();
        let (status, body) = get_json(app, "/api/markers?lat=42.3625&lon=-71.0561").await;
        assert_eq!(status, StatusCode::OK);
        let pins = body.as_array().unwrap();
        assert_eq!(pins.len(), 17);
        assert_eq!(pins[0]["code"], "601");
        assert_eq!(pins[0]["near"], true);
        assert!(pins[0]["tooltip"].as_str().unwrap().contains("136 Blackstone St"));
        assert!(pins[1..].iter().all(|p| p["near"] == false));
    }

    #[tokio::test]
    async fn test_markers_invalid_coordinate() {
        let (app, _dir) = offline_router();
        let (status, _) = get_json(app, "/api/markers?lat=42.0&lon=-500").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nearest_zero_limit_rejected() {
        let (app, _dir) = offline_router();
        let (status, _) = get_json(app, "/api/nearest?city=boston&limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
