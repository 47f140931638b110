use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use pixelcast::{
    AppState, ErrorTracker, Options, Pixel, PixelController, PixelMap, frame_channel, router,
    shared_options,
};

struct TestApp {
    router: Router,
    // Keeps the universe sink open for the lifetime of the test.
    _sink_rx: mpsc::Receiver<Vec<u8>>,
}

async fn test_app() -> TestApp {
    let (tx, sink_rx) = mpsc::channel(64);
    let mut sinks = HashMap::new();
    sinks.insert(1u16, tx);
    let tracker = Arc::new(ErrorTracker::new(Duration::from_secs(1), 10));
    let pixels = PixelMap::new(vec![Pixel::new(0, 0, 1, 1)]).unwrap();
    let options = shared_options(Options::default());

    let controller = PixelController::new(
        sinks,
        tracker,
        20,
        "rainbowDiagonal",
        pixels,
        options.clone(),
    )
    .unwrap();
    let handle = controller.start();

    let state = AppState {
        controller: handle,
        options,
        frames: frame_channel(),
    };
    TestApp {
        router: router(state),
        _sink_rx: sink_rx,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_is_alive() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"pixelcast web server");
}

#[tokio::test]
async fn patterns_catalog_lists_registered_patterns() {
    let app = test_app().await;
    let (status, body) = send(&app.router, "GET", "/patterns", None).await;
    assert_eq!(status, StatusCode::OK);

    let patterns = body["patterns"].as_object().unwrap();
    assert!(patterns.contains_key("solidColor"));
    assert!(patterns.contains_key("rainbowDiagonal"));
    assert_eq!(
        patterns["solidColor"]["parameters"]["color"]["type"],
        "color"
    );
    assert_eq!(body["activePattern"], "rainbowDiagonal");
}

#[tokio::test]
async fn update_unknown_pattern_is_404() {
    let app = test_app().await;
    let (status, _) = send(
        &app.router,
        "PUT",
        "/patterns/doesNotExist",
        Some(json!({"parameters": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_pattern_rejects_bad_values() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        "PUT",
        "/patterns/rainbow",
        Some(json!({"parameters": {"speed": {"value": 500.0}}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/patterns/rainbow",
        Some(json!({"parameters": {"speed": {"value": true}}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_pattern_applies_parameters() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        "PUT",
        "/patterns/solidColor",
        Some(json!({"parameters": {"color": {"value": {"r": 1, "g": 2, "b": 3}}}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app.router, "GET", "/patterns", None).await;
    assert_eq!(
        body["patterns"]["solidColor"]["parameters"]["color"]["value"],
        json!({"r": 1, "g": 2, "b": 3, "w": 0})
    );
}

#[tokio::test]
async fn options_roundtrip() {
    let app = test_app().await;

    let (status, body) = send(&app.router, "GET", "/options", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brightness"]["value"], 100.0);

    let (status, body) = send(
        &app.router,
        "PUT",
        "/options/brightness",
        Some(json!({"value": 40.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brightness"]["value"], 40.0);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/options/brightness",
        Some(json!({"value": 400.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/options/noSuchOption",
        Some(json!({"value": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, "PUT", "/options/brightness", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app.router, "POST", "/options/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brightness"]["value"], 100.0);
}

#[tokio::test]
async fn color_mask_endpoints() {
    let app = test_app().await;

    let (status, body) = send(&app.router, "GET", "/colorMasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["colorMasks"].as_object().unwrap().contains_key("waveMask"));
    assert_eq!(body["activeColorMask"], "rainbowCircleMask");

    let (status, _) = send(&app.router, "PUT", "/colorMask/doesNotExist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/colorMask/solidMask",
        Some(json!({"parameters": {"color": {"value": {"r": 0, "g": 255, "b": 0}}}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Give the render loop a tick to drain the queued change; the change
    // channel holds a single pending intent.
    tokio::time::sleep(Duration::from_millis(150)).await;

    let (status, _) = send(&app.router, "DELETE", "/colorMask", None).await;
    assert_eq!(status, StatusCode::OK);
}
