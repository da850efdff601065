//! Content acquisition: bounded remote calls, typed records, bundled fallbacks.

pub mod client;
pub mod endpoints;
pub mod fallback;
pub mod fetchers;
pub mod types;

pub use client::{ContentClient, ContentError, ContentRequest};
pub use endpoints::ContentKind;
pub use fetchers::ContentFetcher;
pub use types::{AboutData, ContentEnvelope, HomeData, Product, ProductsData};
