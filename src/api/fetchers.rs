//! Locale-aware content fetchers.
//!
//! Every fetcher except the product-detail lookup is total: it returns the
//! remote record when the call succeeds, and otherwise the bundled record for
//! the locale. The result is either fully remote or fully bundled, never a
//! mix. Each failure produces one `warn` event with the content type, locale
//! and error kind.
//!
//! Product detail has no meaningful static fallback for an arbitrary id, so
//! its failures yield `None` instead.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::client::{ContentClient, ContentError, ContentRequest};
use crate::api::endpoints::{self, ContentKind};
use crate::api::fallback::{self, FallbackDataset};
use crate::api::types::{AboutData, HomeData, Product, ProductsData};
use crate::cache::{CacheKey, RequestScope};
use crate::i18n::Locale;

#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: ContentClient,
}

impl ContentFetcher {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    pub async fn home(&self, scope: &RequestScope, locale: Locale) -> HomeData {
        scope
            .memoize(CacheKey::new(ContentKind::Home, locale), || {
                self.fetch_or_fallback::<HomeData, _, _>(
                    ContentKind::Home,
                    endpoints::HOME,
                    locale,
                    fallback::home(),
                    |data| data,
                )
            })
            .await
    }

    pub async fn about(&self, scope: &RequestScope, locale: Locale) -> AboutData {
        scope
            .memoize(CacheKey::new(ContentKind::About, locale), || {
                self.fetch_or_fallback::<AboutData, _, _>(
                    ContentKind::About,
                    endpoints::ABOUT,
                    locale,
                    fallback::about(),
                    |data| data,
                )
            })
            .await
    }

    /// Product list. The remote payload is `ProductsData`; only its
    /// `products` are returned.
    pub async fn products(&self, scope: &RequestScope, locale: Locale) -> Vec<Product> {
        scope
            .memoize(CacheKey::new(ContentKind::Products, locale), || {
                self.fetch_or_fallback::<ProductsData, _, _>(
                    ContentKind::Products,
                    endpoints::PRODUCTS,
                    locale,
                    fallback::products(),
                    |data| data.products,
                )
            })
            .await
    }

    /// Single product by id. `None` on any failure, never a bundled record.
    pub async fn product_by_id(
        &self,
        scope: &RequestScope,
        id: &str,
        locale: Locale,
    ) -> Option<Product> {
        scope
            .memoize(
                CacheKey::with_id(ContentKind::ProductDetail, locale, id),
                || self.lookup_product(id, locale),
            )
            .await
    }

    async fn lookup_product(&self, id: &str, locale: Locale) -> Option<Product> {
        let kind = ContentKind::ProductDetail;
        let request = ContentRequest::get(endpoints::product_detail(id))
            .query("locale", locale.code())
            .freshness(kind.freshness_window());

        match self.client.call_content::<Product>(request).await {
            Ok(product) => Some(product),
            Err(err) => {
                let err = err.into_lookup_error();
                if matches!(err, ContentError::NotFound { .. }) {
                    debug!(
                        content_type = kind.name(),
                        locale = %locale,
                        product_id = id,
                        "Product not found"
                    );
                } else {
                    warn!(
                        content_type = kind.name(),
                        locale = %locale,
                        product_id = id,
                        error_kind = err.kind(),
                        error = %err,
                        "Product lookup failed"
                    );
                }
                None
            }
        }
    }

    async fn fetch_or_fallback<P, T, F>(
        &self,
        kind: ContentKind,
        endpoint: &str,
        locale: Locale,
        dataset: &FallbackDataset<T>,
        extract: F,
    ) -> T
    where
        P: DeserializeOwned,
        T: Clone,
        F: FnOnce(P) -> T,
    {
        let request = ContentRequest::get(endpoint)
            .query("locale", locale.code())
            .freshness(kind.freshness_window());

        match self.client.call_content::<P>(request).await {
            Ok(payload) => extract(payload),
            Err(err) => {
                warn!(
                    content_type = kind.name(),
                    locale = %locale,
                    error_kind = err.kind(),
                    error = %err,
                    "Content fetch failed, serving bundled fallback"
                );
                dataset.get(locale).clone()
            }
        }
    }
}
