use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Item, ItemCategory, ItemId, WeightUnit};
use super::expiration::{self, ExpirationStatus};
use super::safety::WeightSafetyResult;
use super::units;

/// Per-item projection served to dashboards, with the banded expiration
/// status already computed.
#[derive(Debug, Clone, Serialize)]
pub struct ItemStatusView {
    pub id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub category_label: &'static str,
    pub quantity: u32,
    pub weight_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiration: Option<i64>,
    pub expiration: ExpirationStatus,
    pub is_essential: bool,
}

impl ItemStatusView {
    pub fn for_item(item: &Item, today: NaiveDate) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category,
            category_label: item.category.label(),
            quantity: item.quantity,
            weight_display: units::format_weight(item.weight, item.weight_unit),
            expiration_date: item.expiration_date,
            days_until_expiration: expiration::days_until_expiration(item.expiration_date, today),
            expiration: expiration::expiration_status(item.expiration_date, today),
            is_essential: item.is_essential,
        }
    }
}

/// Aggregated dashboard view of one user's bag.
#[derive(Debug, Clone, Serialize)]
pub struct KitSummary {
    pub unit: WeightUnit,
    pub total_weight: f64,
    pub total_weight_display: String,
    pub item_count: usize,
    pub expiring_soon: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<WeightSafetyResult>,
    pub items: Vec<ItemStatusView>,
}
