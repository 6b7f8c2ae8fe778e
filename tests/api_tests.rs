use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["service"], "terminal-queue");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_queue_projection_shape() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/queue")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // El contrato que consumen la página pública y el poll de respaldo
    let body = read_json(response).await;
    assert!(body["entries"].is_array());
    assert!(body["route_sections"].is_array());
    assert!(body["counts"]["queued"].is_number());
    assert!(body["counts"]["boarding"].is_number());
    assert!(body["counts"]["departed"].is_number());
    assert!(body["countdown_duration"].is_number());
    assert!(body["refresh_interval"].is_number());
    assert!(body["departure_duration_minutes"].is_number());
    assert!(body["server_time"].is_number());

    let entry = &body["entries"][0];
    assert_eq!(entry["status"], "Boarding");
    assert!(entry["countdown_active"].as_bool().unwrap());
    assert!(entry["expiry_timestamp"].is_number());
}

#[tokio::test]
async fn test_tv_projection_collapses_queued_to_badge() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/queue/tv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let section = &body["route_sections"][0];
    assert_eq!(section["queued_count"], 2);

    // El TV nunca lista tarjetas Queued
    for entry in section["entries"].as_array().unwrap() {
        assert_ne!(entry["status"], "Queued");
    }
    assert!(body["history"].is_object());
}

#[tokio::test]
async fn test_entry_scan_rejections_are_responses_not_errors() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scan/entry")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "qr_code": "UNKNOWN-CODE" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Un QR inválido es un resultado informativo con mensaje, nunca un 500
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("Invalid QR"));
}

#[tokio::test]
async fn test_exit_scan_response_shape() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scan/exit")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "qr_code": "ABC-123" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["status"].is_string());
    assert!(body["message"].is_string());
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// App de test con payloads representativos del contrato. Los flujos reales
// contra la base corren en los módulos de unit tests de los services.
fn create_test_app() -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async {
                Json(json!({
                    "service": "terminal-queue",
                    "status": "healthy",
                }))
            }),
        )
        .route(
            "/api/queue",
            get(|| async {
                Json(json!({
                    "entries": [
                        {
                            "id": "9b2ce731-8f2e-4f52-a6e3-0cf1d7f0a111",
                            "vehicle_plate": "ABC-123",
                            "driver_name": "Juan Cruz",
                            "route": "Bayan → Crossing",
                            "route_id": null,
                            "status": "Boarding",
                            "entry_time_display": "Aug 05, 2026 08:00 AM",
                            "departure_time_display": "Aug 05, 2026 08:30 AM",
                            "countdown_active": true,
                            "expiry_timestamp": 1786007400,
                            "departed_countdown_active": false,
                            "departed_countdown_expiry": null
                        }
                    ],
                    "route_sections": [
                        {
                            "name": "Bayan → Crossing",
                            "route_id": null,
                            "entries": [],
                            "queued_count": 2
                        }
                    ],
                    "counts": { "queued": 2, "boarding": 1, "departed": 0 },
                    "countdown_duration": 60,
                    "refresh_interval": 15,
                    "departure_duration_minutes": 30,
                    "server_time": 1786005600
                }))
            }),
        )
        .route(
            "/api/queue/tv",
            get(|| async {
                Json(json!({
                    "route_sections": [
                        {
                            "name": "Bayan → Crossing",
                            "route_id": null,
                            "entries": [
                                { "status": "Boarding" },
                                { "status": "Departed" }
                            ],
                            "queued_count": 2
                        }
                    ],
                    "counts": { "queued": 2, "boarding": 1, "departed": 1 },
                    "history": { "Bayan → Crossing": [] },
                    "countdown_duration": 60,
                    "refresh_interval": 15,
                    "departure_duration_minutes": 30,
                    "server_time": 1786005600
                }))
            }),
        )
        .route(
            "/api/scan/entry",
            post(|| async {
                Json(json!({
                    "status": "error",
                    "message": "❌ Invalid QR code."
                }))
            }),
        )
        .route(
            "/api/scan/exit",
            post(|| async {
                Json(json!({
                    "status": "error",
                    "message": "⚠️ ABC-123 not inside terminal."
                }))
            }),
        )
}
