//! Edge routing: every page path is locale-prefixed.
//!
//! The decision itself ([`route_request`]) is a pure function of the path,
//! query, cookie header and `Accept-Language` header. [`locale_middleware`]
//! applies it to axum requests: it redirects unprefixed paths, refreshes the
//! persisted preference cookie, and hands the locale and a fresh
//! [`RequestScope`] to downstream handlers.

use std::time::Duration;

use axum::extract::Request;
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::cache::RequestScope;
use crate::i18n::{resolve, Locale, LocalePreference};

/// Cookie holding the sticky locale preference
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// One year
pub const LOCALE_COOKIE_MAX_AGE: Duration = Duration::from_secs(31_536_000);

/// Non-page paths that skip locale handling entirely
pub const BYPASS_PREFIXES: [&str; 6] = [
    "/api",
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
    "/images",
    "/videos",
];

/// What the router does with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Reserved prefix: no locale logic, no cookie
    Bypass,
    /// Already prefixed with a supported locale: continue, refresh the cookie
    PassThrough { locale: Locale },
    /// Not prefixed: redirect to the prefixed path and persist the locale
    Redirect { locale: Locale, location: String },
}

impl RouteDecision {
    /// The locale to persist, if this decision writes the preference.
    pub fn persisted_locale(&self) -> Option<Locale> {
        match self {
            RouteDecision::Bypass => None,
            RouteDecision::PassThrough { locale } | RouteDecision::Redirect { locale, .. } => {
                Some(*locale)
            }
        }
    }
}

pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Supported locale named by the first path segment, if any.
///
/// Matches `/{locale}` and `/{locale}/...` only; `/english` is not `/en`.
pub fn locale_in_path(path: &str) -> Option<Locale> {
    let first = path.strip_prefix('/')?.split('/').next()?;
    Locale::from_code(first)
}

/// Value of the persisted preference cookie from a `Cookie` header.
pub fn persisted_locale_value(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == LOCALE_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"'))
}

/// Path of the same page in another locale, for a locale switcher.
///
/// Unprefixed paths are prefixed; prefixed paths get their first segment
/// replaced.
pub fn switch_locale_path(path: &str, target: Locale) -> String {
    match locale_in_path(path) {
        Some(current) => {
            let rest = &path[1 + current.code().len()..];
            format!("/{}{}", target, rest)
        }
        None => format!("/{}{}", target, path),
    }
}

/// Decide how to handle a request.
pub fn route_request(
    path: &str,
    query: Option<&str>,
    cookie_header: Option<&str>,
    accept_language: Option<&str>,
) -> RouteDecision {
    if is_bypassed(path) {
        return RouteDecision::Bypass;
    }

    if let Some(locale) = locale_in_path(path) {
        return RouteDecision::PassThrough { locale };
    }

    let preferences = accept_language
        .map(LocalePreference::from_header)
        .unwrap_or_default();
    let locale = resolve(
        cookie_header.and_then(persisted_locale_value),
        &preferences,
        &Locale::supported(),
        Locale::default_locale(),
    );

    let mut location = format!("/{}{}", locale, path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }

    RouteDecision::Redirect { locale, location }
}

/// `Set-Cookie` value persisting `locale` site-wide for a year.
pub fn locale_cookie(locale: Locale) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        LOCALE_COOKIE,
        locale,
        LOCALE_COOKIE_MAX_AGE.as_secs()
    )
}

fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    (!joined.is_empty()).then_some(joined)
}

fn persist(response: &mut Response, locale: Locale) {
    if let Ok(value) = HeaderValue::from_str(&locale_cookie(locale)) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

/// axum middleware applying [`route_request`].
pub async fn locale_middleware(mut req: Request, next: Next) -> Response {
    let cookies = cookie_header(req.headers());
    let accept_language = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());

    let decision = route_request(
        req.uri().path(),
        req.uri().query(),
        cookies.as_deref(),
        accept_language,
    );

    match decision {
        RouteDecision::Bypass => next.run(req).await,
        RouteDecision::PassThrough { locale } => {
            req.extensions_mut().insert(locale);
            req.extensions_mut().insert(RequestScope::new());

            let mut response = next.run(req).await;
            persist(&mut response, locale);
            response
        }
        RouteDecision::Redirect { locale, location } => {
            debug!(locale = %locale, location = %location, "Redirecting to locale-prefixed path");

            let mut response = Redirect::temporary(&location).into_response();
            persist(&mut response, locale);
            response
        }
    }
}
