// ── Admin domain types ──
//
// Typed views over the records the admin API serves. Adapter operations
// stay untyped; these are decoded from their results and ignore unknown
// fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::convert::lenient_datetime;

/// A typed resource with a fixed collection path.
pub trait Resource {
    /// Collection path relative to the API base URL.
    const NAME: &'static str;
}

/// Dashboard counters served by `GET /admin/stats`.
pub const STATS: &str = "admin/stats";

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub phone_number: String,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for User {
    const NAME: &'static str = "admin/users";
}

// ── Orders ───────────────────────────────────────────────────────────

/// Order lifecycle state, as stored by the API.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub service_id: Option<i64>,
    pub status: OrderStatus,
    #[serde(default, alias = "amount")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub address_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Order {
    const NAME: &'static str = "admin/orders";
}

// ── Services ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Resource for Service {
    const NAME: &'static str = "admin/services";
}

// ── Dashboard ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub orders: u64,
}

/// A decoded page of typed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}
