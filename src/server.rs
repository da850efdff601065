//! HTTP application: page data endpoints behind the locale router.
//!
//! Rendering is not done here; each page route returns the view model a
//! renderer would consume, serialized as JSON.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{async_trait, middleware, Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::api::{AboutData, ContentFetcher, HomeData, Product};
use crate::cache::RequestScope;
use crate::config::Config;
use crate::i18n::Locale;
use crate::router::{locale_middleware, switch_locale_path};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: ContentFetcher,
}

impl AppState {
    pub fn new(config: Config, fetcher: ContentFetcher) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }
}

/// Handlers receive the scope created by the locale middleware. Outside the
/// middleware a fresh scope is used, which still bounds memoization to the
/// current request.
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestScope {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RequestScope>().cloned().unwrap_or_default())
    }
}

/// Link to the current page in another locale.
#[derive(Debug, Serialize)]
pub struct Alternate {
    pub locale: Locale,
    pub label: &'static str,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentBadge {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_scope: Option<u64>,
}

/// Data handed to the page renderer.
#[derive(Debug, Serialize)]
pub struct PageView<T> {
    pub locale: Locale,
    pub path: String,
    pub canonical_url: String,
    pub alternates: Vec<Alternate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_badge: Option<EnvironmentBadge>,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub home: HomeData,
    pub products: Vec<Product>,
}

impl<T: Serialize> IntoResponse for PageView<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

fn page<T>(config: &Config, scope: &RequestScope, locale: Locale, path: String, data: T) -> PageView<T> {
    let alternates = Locale::supported()
        .into_iter()
        .map(|alt| Alternate {
            locale: alt,
            label: alt.native_name(),
            path: switch_locale_path(&path, alt),
        })
        .collect();

    let environment_badge = config.environment.shows_badge().then(|| EnvironmentBadge {
        name: config.environment.display_name(),
        api_url: config.show_debug_info.then(|| config.api_url.clone()),
        request_scope: config.show_debug_info.then(|| scope.id()),
    });

    PageView {
        locale,
        canonical_url: format!("{}{}", config.site_url.trim_end_matches('/'), path),
        path,
        alternates,
        environment_badge,
        data,
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

/// Route parameter to a supported locale. The middleware only lets
/// supported prefixes through, so `None` here means the router was bypassed.
fn path_locale(code: &str) -> Option<Locale> {
    Locale::from_code(code)
}

async fn home_page(
    State(state): State<AppState>,
    scope: RequestScope,
    Path(code): Path<String>,
) -> Response {
    let Some(locale) = path_locale(&code) else {
        return not_found();
    };

    // Independent fetches; each resolves to remote data or its own fallback.
    let (home, products) = tokio::join!(
        state.fetcher.home(&scope, locale),
        state.fetcher.products(&scope, locale)
    );

    page(
        &state.config,
        &scope,
        locale,
        format!("/{}", locale),
        HomePage { home, products },
    )
    .into_response()
}

async fn about_page(
    State(state): State<AppState>,
    scope: RequestScope,
    Path(code): Path<String>,
) -> Response {
    let Some(locale) = path_locale(&code) else {
        return not_found();
    };

    let about: AboutData = state.fetcher.about(&scope, locale).await;
    page(&state.config, &scope, locale, format!("/{}/about", locale), about).into_response()
}

async fn products_page(
    State(state): State<AppState>,
    scope: RequestScope,
    Path(code): Path<String>,
) -> Response {
    let Some(locale) = path_locale(&code) else {
        return not_found();
    };

    let products = state.fetcher.products(&scope, locale).await;
    page(&state.config, &scope, locale, format!("/{}/products", locale), products).into_response()
}

async fn product_page(
    State(state): State<AppState>,
    scope: RequestScope,
    Path((code, id)): Path<(String, String)>,
) -> Response {
    let Some(locale) = path_locale(&code) else {
        return not_found();
    };

    match state.fetcher.product_by_id(&scope, &id, locale).await {
        Some(product) => page(
            &state.config,
            &scope,
            locale,
            format!("/{}/products/{}", locale, id),
            product,
        )
        .into_response(),
        None => not_found(),
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
    }))
}

async fn fallback_handler() -> Response {
    not_found()
}

/// Build the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/:locale", get(home_page))
        .route("/:locale/", get(home_page))
        .route("/:locale/about", get(about_page))
        .route("/:locale/products", get(products_page))
        .route("/:locale/products/:id", get(product_page))
        .fallback(fallback_handler)
        .layer(middleware::from_fn(locale_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
