use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A game in the lounge catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A bookable play package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub description: String,
}

/// A membership tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// A promotional offer that admins switch on and off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

/// Body of the offer toggle PATCH.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OfferActivation {
    pub is_active: bool,
}
