//! Integration tests for the locale-site application
//!
//! These tests drive the full axum app (locale middleware, handlers,
//! fetchers, request cache) against a mocked content source.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use locale_site::api::{fallback, ContentClient, ContentFetcher};
use locale_site::config::{Config, SiteEnvironment};
use locale_site::i18n::Locale;
use locale_site::server::{build_app, AppState};

// ==================== Test Helpers ====================

fn create_test_config(api_url: &str, timeout: Duration) -> Config {
    Config {
        site_url: "https://site.test".to_string(),
        api_url: api_url.to_string(),
        api_timeout: timeout,
        cdn_url: None,
        environment: SiteEnvironment::Production,
        show_debug_info: false,
        port: 0,
    }
}

fn create_app(api_url: &str, timeout: Duration) -> Router {
    let config = create_test_config(api_url, timeout);
    let fetcher = ContentFetcher::new(ContentClient::from_config(&config).expect("client"));
    build_app(AppState::new(config, fetcher))
}

async fn get(app: Router, uri: &str, headers: &[(header::HeaderName, &str)]) -> Response {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, *value);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .expect("app should respond")
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("JSON body")
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data, "timestamp": "2024-01-15T10:30:00Z" })
}

fn remote_home() -> Value {
    json!({
        "hero": {
            "title": "Remote hero",
            "subtitle": "From the API",
            "ctaText": "Go",
            "ctaLink": "/en/products",
            "backgroundImage": "/images/remote.jpg"
        },
        "features": [],
        "stats": [{ "label": "Remote", "value": "1" }]
    })
}

fn remote_products() -> Value {
    json!({
        "products": [{
            "id": "42",
            "title": "Remote product",
            "description": "From the API",
            "image": "/images/products/42.jpg",
            "features": [],
            "order": 1
        }],
        "total": 1
    })
}

// ==================== Routing Tests ====================

#[tokio::test]
async fn test_unprefixed_request_redirects_by_accept_language() {
    let app = create_app("http://localhost:1", Duration::from_secs(1));

    let response = get(app, "/about", &[(header::ACCEPT_LANGUAGE, "zh-CN,en;q=0.8")]).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/zh/about");
    assert_eq!(
        set_cookie(&response).as_deref(),
        Some("NEXT_LOCALE=zh; Path=/; Max-Age=31536000; SameSite=Lax")
    );
}

#[tokio::test]
async fn test_sticky_cookie_overrides_accept_language() {
    let app = create_app("http://localhost:1", Duration::from_secs(1));

    let response = get(
        app,
        "/products",
        &[
            (header::COOKIE, "NEXT_LOCALE=en"),
            (header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9"),
        ],
    )
    .await;

    assert_eq!(response.headers()[header::LOCATION], "/en/products");
}

#[tokio::test]
async fn test_health_bypasses_locale_logic() {
    let app = create_app("http://localhost:1", Duration::from_secs(1));

    let response = get(app, "/api/health", &[(header::ACCEPT_LANGUAGE, "zh")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "production");
}

#[tokio::test]
async fn test_static_asset_paths_are_not_redirected() {
    let app = create_app("http://localhost:1", Duration::from_secs(1));

    let response = get(app, "/images/logo.png", &[]).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie(&response).is_none());
}

// ==================== Page Content Tests ====================

#[tokio::test]
async fn test_home_page_fetches_each_content_type_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/home"))
        .and(query_param("locale", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(remote_home())))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("locale", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(remote_products())))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_app(&server.uri(), Duration::from_secs(5));
    let response = get(app, "/en", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).unwrap().starts_with("NEXT_LOCALE=en;"));

    let body = json_body(response).await;
    assert_eq!(body["locale"], "en");
    assert_eq!(body["canonical_url"], "https://site.test/en");
    assert_eq!(body["data"]["home"]["hero"]["title"], "Remote hero");
    assert_eq!(body["data"]["products"][0]["id"], "42");
    assert!(body.get("environment_badge").is_none());
}

#[tokio::test]
async fn test_partial_outage_mixes_per_content_type_not_per_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/home"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(remote_home())))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let app = create_app(&server.uri(), Duration::from_secs(5));
    let body = json_body(get(app, "/zh/", &[]).await).await;

    assert_eq!(body["data"]["home"]["hero"]["title"], "Remote hero");

    let expected = serde_json::to_value(fallback::products().get(Locale::CHINESE)).unwrap();
    assert_eq!(body["data"]["products"], expected);
}

#[tokio::test]
async fn test_about_page_serves_fallback_when_source_is_down() {
    let app = create_app("http://localhost:1", Duration::from_secs(2));

    let response = get(app, "/zh/about", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let expected = serde_json::to_value(fallback::about().get(Locale::CHINESE)).unwrap();
    assert_eq!(body["data"], expected);
    assert_eq!(body["alternates"][0]["path"], "/en/about");
}

#[tokio::test]
async fn test_stalled_source_does_not_stall_the_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let app = create_app(&server.uri(), Duration::from_millis(300));
    let started = Instant::now();
    let response = get(app, "/en", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    // Both calls run concurrently, so one timeout bounds the page.
    assert!(started.elapsed() < Duration::from_millis(1500));

    let body = json_body(response).await;
    let expected = serde_json::to_value(fallback::home().get(Locale::ENGLISH)).unwrap();
    assert_eq!(body["data"]["home"], expected);
}

// ==================== Product Detail Tests ====================

#[tokio::test]
async fn test_product_detail_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/42"))
        .and(query_param("locale", "zh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            remote_products()["products"][0].clone(),
        )))
        .mount(&server)
        .await;

    let app = create_app(&server.uri(), Duration::from_secs(5));
    let response = get(app, "/zh/products/42", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["id"], "42");
    assert_eq!(body["alternates"][0]["path"], "/en/products/42");
}

#[tokio::test]
async fn test_product_detail_missing_is_404_not_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/42"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_app(&server.uri(), Duration::from_secs(5));
    let response = get(app, "/en/products/42", &[]).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
