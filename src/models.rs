use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A backend-managed record with a server-issued identifier.
pub trait Entity {
    fn id(&self) -> &str;
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrateur",
            Role::SuperAdmin => "Super administrateur",
        }
    }
}

/// Embedded `{id, name}` reference the backend attaches to items and categories.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

// ===== Business =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub hours: Option<String>,
    pub logo_url: Option<String>,
    pub slogan: Option<String>,
    pub url_facebook: Option<String>,
    pub url_instagram: Option<String>,
    pub uber_eats_url: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slogan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uber_eats_url: Option<String>,
}

// ===== Category =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    pub parent_id: Option<String>,
    pub parent: Option<CategoryRef>,
    pub item_count: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub display_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub is_active: bool,
}

// ===== Event =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventStatus {
    #[default]
    #[serde(rename = "En cours")]
    Ongoing,
    #[serde(rename = "Terminé")]
    Finished,
    #[serde(rename = "Annulé")]
    Cancelled,
}

impl EventStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Ongoing => "En cours",
            EventStatus::Finished => "Terminé",
            EventStatus::Cancelled => "Annulé",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: EventStatus,
    pub event_type: Option<String>,
}

/// Dates travel as millisecond-precision RFC 3339 strings (`2025-01-12T00:00:00.000Z`).
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

// ===== Item =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: Option<String>,
    pub category: Option<CategoryRef>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub variants: Vec<ItemVariant>,
    #[serde(default)]
    pub images: Vec<ItemImage>,
    #[serde(default)]
    pub options: Vec<ItemOption>,
}

impl Item {
    /// Prices shown to customers: one per variant, or the base price when there are none.
    pub fn display_prices(&self) -> Vec<f64> {
        if self.variants.is_empty() {
            vec![self.price]
        } else {
            self.variants.iter().map(|v| v.price).collect()
        }
    }

    pub fn default_image(&self) -> Option<&ItemImage> {
        self.images
            .iter()
            .find(|image| image.is_default)
            .or_else(|| self.images.first())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub is_available: bool,
    pub variants: Vec<ItemVariant>,
    pub images: Vec<ItemImage>,
    pub options: Vec<ItemOption>,
}

// ===== User =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    pub is_active: bool,
}

impl Entity for Business {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Event {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Item {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}
