//! Exporter end-to-end tests against in-process mock upstreams.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use homeprom_exporter::app_state::AppState;
use homeprom_exporter::config;
use homeprom_exporter::refresh::RefreshHandle;
use homeprom_exporter::router::build_router;

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Mock upstream serving every source, with switches for failure modes.
#[derive(Clone, Default)]
struct Mock {
    hue_fixture: Arc<String>,
    weather_down: Arc<AtomicBool>,
}

async fn hue_sensors(State(m): State<Mock>, Path(key): Path<String>) -> Response {
    if key != "test-key" {
        let body = r#"[{"error":{"type":1,"address":"/","description":"unauthorized user"}}]"#;
        return ([(header::CONTENT_TYPE, "application/json")], body).into_response();
    }
    ([(header::CONTENT_TYPE, "application/json")], m.hue_fixture.to_string()).into_response()
}

async fn forecast(State(m): State<Mock>, Query(q): Query<HashMap<String, String>>) -> Response {
    if m.weather_down.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
    }
    assert_eq!(q.get("current_weather").map(String::as_str), Some("true"));
    assert!(q.contains_key("latitude") && q.contains_key("longitude"));
    ([(header::CONTENT_TYPE, "application/json")], load("weather.json")).into_response()
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    r#"{"current_weather":{"temperature":99.0}}"#
}

async fn quote_page() -> Response {
    ([(header::CONTENT_TYPE, "text/html")], load("quote_page.html")).into_response()
}

async fn mock_upstream(mock: Mock) -> SocketAddr {
    let app = Router::new()
        .route("/api/:key/sensors", get(hue_sensors))
        .route("/v1/forecast", get(forecast))
        .route("/slow/forecast", get(slow))
        .route("/quotes/world", get(quote_page))
        .with_state(mock);
    serve(app).await
}

fn lookup(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<&'static str, String> = pairs.into_iter().collect();
    move |k| map.get(k).cloned()
}

/// Build state, start its refresh tasks, and serve the exporter router.
async fn exporter(pairs: Vec<(&'static str, String)>, start: bool) -> (AppState, SocketAddr, Vec<RefreshHandle>) {
    let cfg = config::from_lookup(lookup(pairs)).unwrap();
    let (state, tasks) = AppState::new(cfg).unwrap();
    let handles = if start { tasks.into_iter().map(|t| t.start()).collect() } else { Vec::new() };
    let addr = serve(build_router(state.clone())).await;
    (state, addr, handles)
}

async fn scrape(addr: SocketAddr) -> String {
    let resp = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    resp.text().await.unwrap()
}

/// Value of the first sample line starting with `prefix`.
fn sample(body: &str, prefix: &str) -> Option<f64> {
    body.lines()
        .find(|l| l.starts_with(prefix))
        .and_then(|l| l.rsplit(' ').next())
        .map(|v| v.parse().unwrap())
}

async fn eventually<F: Fn() -> bool>(what: &str, f: F) {
    for _ in 0..200 {
        if f() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {what}");
}

fn hue_env(addr: SocketAddr, labels: &str) -> Vec<(&'static str, String)> {
    vec![
        ("HUE_BRIDGE_IP", addr.to_string()),
        ("HUE_API_KEY", "test-key".to_string()),
        ("HUE_SENSOR_LABELS", labels.to_string()),
        ("HTTP_TIMEOUT", "2s".to_string()),
    ]
}

#[tokio::test]
async fn hue_cached_scrape_maps_room_label() {
    let upstream = mock_upstream(Mock {
        hue_fixture: Arc::new(load("hue_kitchen.json")),
        ..Mock::default()
    })
    .await;
    let (state, addr, _handles) = exporter(hue_env(upstream, r#"{"Kitchen":"Living Room"}"#), true).await;

    eventually("hue cache", || state.warming_sources().is_empty()).await;
    let body = scrape(addr).await;

    let line = r#"hue_temperature{room="Living Room",sensor_name="Kitchen",sensor_id="1"}"#;
    assert_eq!(sample(&body, line), Some(21.0), "body:\n{body}");
    assert!(body.contains("homeprom_refresh_total{outcome=\"ok\",source=\"hue\"} 1"));

    let ready = reqwest::get(format!("http://{addr}/readyz")).await.unwrap();
    assert_eq!(ready.status(), 200);
}

#[tokio::test]
async fn hue_direct_scrape_keeps_unmapped_sensors() {
    let upstream = mock_upstream(Mock {
        hue_fixture: Arc::new(load("hue_sensors.json")),
        ..Mock::default()
    })
    .await;
    let mut env = hue_env(upstream, r#"{"Kitchen":"Living Room"}"#);
    env.push(("HUE_MODE", "direct".to_string()));
    let (_state, addr, handles) = exporter(env, true).await;
    assert!(handles.is_empty(), "direct mode has no refresh loop");

    let body = scrape(addr).await;
    assert_eq!(
        sample(&body, r#"hue_temperature{room="Living Room",sensor_name="Kitchen",sensor_id="1"}"#),
        Some(21.5)
    );
    assert_eq!(
        sample(&body, r#"hue_temperature{room="Unknown",sensor_name="Bedroom",sensor_id="5"}"#),
        Some(18.75)
    );
    assert_eq!(body.matches("hue_temperature{").count(), 2, "only temperature sensors:\n{body}");
}

#[tokio::test]
async fn direct_failure_omits_series_but_scrape_succeeds() {
    let upstream = mock_upstream(Mock::default()).await;
    let mut env = hue_env(upstream, "");
    env[1].1 = "wrong-key".to_string();
    env.push(("HUE_MODE", "direct".to_string()));
    let (state, addr, _handles) = exporter(env, false).await;

    let body = scrape(addr).await;
    assert!(!body.contains("hue_temperature{"));
    assert!(body.contains("homeprom_collect_errors_total{collector=\"hue\"} 1"));
    assert_eq!(state.metrics().collect_errors.get(&[("collector", "hue")]), 1);
}

#[tokio::test]
async fn weather_gauge_after_one_refresh() {
    let upstream = mock_upstream(Mock::default()).await;
    let env = vec![
        ("HOMEPROM_SOURCES", "weather".to_string()),
        ("WEATHER_LATITUDE", "52.52".to_string()),
        ("WEATHER_LONGITUDE", "13.41".to_string()),
        ("WEATHER_BASE_URL", format!("http://{upstream}/v1/forecast")),
    ];
    let (state, addr, _handles) = exporter(env, true).await;

    eventually("weather cache", || state.warming_sources().is_empty()).await;
    let body = scrape(addr).await;
    assert_eq!(
        sample(&body, r#"weather_temperature_celsius{latitude="52.52",longitude="13.41"}"#),
        Some(5.5)
    );
    assert_eq!(sample(&body, "weather_windspeed_kmh{"), Some(11.2));
}

#[tokio::test]
async fn scrape_before_first_refresh_is_empty_not_error() {
    let upstream = mock_upstream(Mock::default()).await;
    let env = vec![
        ("HOMEPROM_SOURCES", "weather".to_string()),
        ("WEATHER_LATITUDE", "1".to_string()),
        ("WEATHER_LONGITUDE", "2".to_string()),
        ("WEATHER_BASE_URL", format!("http://{upstream}/v1/forecast")),
    ];
    let (_state, addr, _handles) = exporter(env, false).await;

    let body = scrape(addr).await;
    assert!(body.contains("# TYPE weather_temperature_celsius gauge"));
    assert!(!body.contains("weather_temperature_celsius{"));

    let ready = reqwest::get(format!("http://{addr}/readyz")).await.unwrap();
    assert_eq!(ready.status(), 503);
    assert_eq!(ready.text().await.unwrap(), "warming: weather");
}

#[tokio::test]
async fn timed_out_upstream_leaves_cache_absent() {
    let upstream = mock_upstream(Mock::default()).await;
    let env = vec![
        ("HOMEPROM_SOURCES", "weather".to_string()),
        ("WEATHER_LATITUDE", "1".to_string()),
        ("WEATHER_LONGITUDE", "2".to_string()),
        ("WEATHER_BASE_URL", format!("http://{upstream}/slow/forecast")),
        ("HTTP_TIMEOUT", "200ms".to_string()),
        ("REFRESH_INTERVAL", "1s".to_string()),
    ];
    let (state, addr, handles) = exporter(env, true).await;

    let metrics = state.metrics();
    eventually("a timed out refresh", || {
        metrics.refresh_total.get(&[("source", "weather"), ("outcome", "timeout")]) >= 1
    })
    .await;

    let body = scrape(addr).await;
    assert!(!body.contains("weather_temperature_celsius{"));
    assert!(!handles[0].is_finished(), "refresh loop must survive failures");
}

#[tokio::test]
async fn failing_refreshes_serve_last_good_value() {
    let mock = Mock::default();
    let upstream = mock_upstream(mock.clone()).await;
    let env = vec![
        ("HOMEPROM_SOURCES", "weather".to_string()),
        ("WEATHER_LATITUDE", "1".to_string()),
        ("WEATHER_LONGITUDE", "2".to_string()),
        ("WEATHER_BASE_URL", format!("http://{upstream}/v1/forecast")),
        ("HTTP_TIMEOUT", "500ms".to_string()),
        ("REFRESH_INTERVAL", "1s".to_string()),
    ];
    let (state, addr, _handles) = exporter(env, true).await;
    eventually("weather cache", || state.warming_sources().is_empty()).await;

    mock.weather_down.store(true, Ordering::SeqCst);
    let metrics = state.metrics();
    eventually("two failed refreshes", || {
        metrics.refresh_total.get(&[("source", "weather"), ("outcome", "status")]) >= 2
    })
    .await;

    let body = scrape(addr).await;
    assert_eq!(sample(&body, "weather_temperature_celsius{"), Some(5.5));
}

#[tokio::test]
async fn quote_scraped_from_page() {
    let upstream = mock_upstream(Mock::default()).await;
    let env = vec![
        ("HOMEPROM_SOURCES", "quote".to_string()),
        ("QUOTE_URL", format!("http://{upstream}/quotes/world")),
    ];
    let (state, addr, _handles) = exporter(env, true).await;
    eventually("quote cache", || state.warming_sources().is_empty()).await;

    let body = scrape(addr).await;
    assert_eq!(sample(&body, "msci_world_last_price "), Some(3512.25));
}

#[tokio::test]
async fn healthz_is_always_ok() {
    let upstream = mock_upstream(Mock::default()).await;
    let (_state, addr, _handles) = exporter(hue_env(upstream, ""), false).await;
    let resp = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}
