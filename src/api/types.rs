//! Wire types for the content source.
//!
//! Every response is wrapped in a [`ContentEnvelope`]. Record fields use the
//! source's camelCase names on the wire.

use serde::{Deserialize, Serialize};

/// Response wrapper returned by every content endpoint.
///
/// `data` is only meaningful when `success` is true. When `success` is false
/// the payload may be missing, null, or garbage, so it is kept optional and
/// must not be read.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Required: an envelope without it is malformed.
    pub timestamp: String,
}

impl<T> ContentEnvelope<T> {
    /// Payload of a successful envelope, `None` otherwise.
    pub fn into_payload(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

// ==================== Home ====================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeHero {
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub background_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_video: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HomeFeature {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HomeStat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HomeData {
    pub hero: HomeHero,
    pub features: Vec<HomeFeature>,
    pub stats: Vec<HomeStat>,
}

// ==================== Products ====================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub features: Vec<String>,
    pub order: i32,
}

/// Payload of the product list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProductsData {
    pub products: Vec<Product>,
    pub total: u32,
}

// ==================== About ====================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Company {
    pub name: String,
    pub description: String,
    pub mission: String,
    pub vision: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub position: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimelineEvent {
    pub id: String,
    pub year: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AboutData {
    pub company: Company,
    pub team: Vec<TeamMember>,
    pub timeline: Vec<TimelineEvent>,
    pub contact: Contact,
}
