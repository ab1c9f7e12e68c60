use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored bag items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Mass units accepted on item weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "oz")]
    Ounces,
    #[serde(rename = "lb")]
    Pounds,
}

impl WeightUnit {
    pub const fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Grams => "g",
            WeightUnit::Kilograms => "kg",
            WeightUnit::Ounces => "oz",
            WeightUnit::Pounds => "lb",
        }
    }

    pub const fn ordered() -> [Self; 4] {
        [
            WeightUnit::Grams,
            WeightUnit::Kilograms,
            WeightUnit::Ounces,
            WeightUnit::Pounds,
        ]
    }

    /// Strict symbol lookup, case-insensitive.
    pub fn from_symbol(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "g" => Some(WeightUnit::Grams),
            "kg" => Some(WeightUnit::Kilograms),
            "oz" => Some(WeightUnit::Ounces),
            "lb" => Some(WeightUnit::Pounds),
            _ => None,
        }
    }

    /// Lenient lookup for free-text boundaries such as catalog rows and query
    /// strings. Unknown text falls back to grams with the substitution flagged
    /// so callers can report it instead of silently miscounting weight.
    pub fn coerce(raw: &str) -> CoercedUnit {
        match Self::from_symbol(raw) {
            Some(unit) => CoercedUnit {
                unit,
                assumed_grams: false,
            },
            None => CoercedUnit {
                unit: WeightUnit::Grams,
                assumed_grams: true,
            },
        }
    }
}

/// Outcome of lenient unit parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercedUnit {
    pub unit: WeightUnit,
    /// True when the raw text named no known unit and grams were substituted.
    pub assumed_grams: bool,
}

/// Categories a bag item can be filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Medical,
    Food,
    Water,
    Tools,
    Documents,
    Clothing,
    Electronics,
    #[default]
    Other,
}

impl ItemCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ItemCategory::Medical => "Medical",
            ItemCategory::Food => "Food",
            ItemCategory::Water => "Water",
            ItemCategory::Tools => "Tools",
            ItemCategory::Documents => "Documents",
            ItemCategory::Clothing => "Clothing",
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Other => "Other",
        }
    }

    pub const fn ordered() -> [Self; 8] {
        [
            ItemCategory::Medical,
            ItemCategory::Food,
            ItemCategory::Water,
            ItemCategory::Tools,
            ItemCategory::Documents,
            ItemCategory::Clothing,
            ItemCategory::Electronics,
            ItemCategory::Other,
        ]
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
    }
}

/// How often a user wants alert e-mails batched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// Per-user alerting switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub expiration_alerts: bool,
    #[serde(default)]
    pub email_frequency: EmailFrequency,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            expiration_alerts: true,
            email_frequency: EmailFrequency::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Stored account record. Height and body weight are in centimeters and
/// kilograms and stay optional until the user fills in their profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub email_verified: bool,
    pub notification_preferences: NotificationPreferences,
}

/// Registration payload before an identifier is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl UserDraft {
    /// Normalize and validate inbound registration fields. The e-mail is
    /// lowercased so duplicate detection is case-insensitive.
    pub fn sanitized(mut self) -> Result<Self, UserValidationError> {
        self.email = self.email.trim().to_ascii_lowercase();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();

        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err(UserValidationError::MissingName);
        }
        if !email_is_well_formed(&self.email) {
            return Err(UserValidationError::MalformedEmail(self.email));
        }
        if let Some(height) = self.height {
            if !height.is_finite() || height < 0.0 {
                return Err(UserValidationError::InvalidHeight(height));
            }
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(UserValidationError::InvalidBodyWeight(weight));
            }
        }
        Ok(self)
    }
}

/// Partial profile edit. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notification_preferences: Option<NotificationPreferencesUpdate>,
}

impl ProfileUpdate {
    /// Merge the edit into a stored profile, validating each supplied field.
    pub fn apply_to(self, profile: &mut UserProfile) -> Result<(), UserValidationError> {
        if let Some(first_name) = self.first_name {
            let first_name = first_name.trim().to_string();
            if first_name.is_empty() {
                return Err(UserValidationError::MissingName);
            }
            profile.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            let last_name = last_name.trim().to_string();
            if last_name.is_empty() {
                return Err(UserValidationError::MissingName);
            }
            profile.last_name = last_name;
        }
        if let Some(height) = self.height {
            if !height.is_finite() || height < 0.0 {
                return Err(UserValidationError::InvalidHeight(height));
            }
            profile.height = Some(height);
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(UserValidationError::InvalidBodyWeight(weight));
            }
            profile.weight = Some(weight);
        }
        if let Some(preferences) = self.notification_preferences {
            if let Some(flag) = preferences.expiration_alerts {
                profile.notification_preferences.expiration_alerts = flag;
            }
            if let Some(frequency) = preferences.email_frequency {
                profile.notification_preferences.email_frequency = frequency;
            }
        }
        Ok(())
    }
}

/// Partial edit of the nested notification switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferencesUpdate {
    #[serde(default)]
    pub expiration_alerts: Option<bool>,
    #[serde(default)]
    pub email_frequency: Option<EmailFrequency>,
}

/// One packed item in a user's emergency bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub user_id: UserId,
    pub name: String,
    pub category: ItemCategory,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_essential: bool,
}

/// Inbound item payload before an identifier and owner are assigned.
///
/// Expiration dates are parsed leniently: absent or unparseable raws land as
/// `None` and classify as unknown downstream rather than failing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(
        default,
        deserialize_with = "super::expiration::deserialize_lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_essential: bool,
}

impl ItemDraft {
    /// Trim the name and validate the measurable fields.
    pub fn sanitized(mut self) -> Result<Self, ItemValidationError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(ItemValidationError::InvalidWeight(self.weight));
        }
        if self.quantity == 0 {
            return Err(ItemValidationError::ZeroQuantity);
        }
        Ok(self)
    }
}

fn default_quantity() -> u32 {
    1
}

/// Partial item edit. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<ItemCategory>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: Option<WeightUnit>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(
        default,
        deserialize_with = "super::expiration::deserialize_lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_essential: Option<bool>,
}

impl ItemUpdate {
    /// Merge the edit into a stored item, validating each supplied field.
    /// `None` fields keep their stored value, so an expiration date can be
    /// corrected but never cleared through this path.
    pub fn apply_to(self, item: &mut Item) -> Result<(), ItemValidationError> {
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ItemValidationError::EmptyName);
            }
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(ItemValidationError::InvalidWeight(weight));
            }
            item.weight = weight;
        }
        if let Some(weight_unit) = self.weight_unit {
            item.weight_unit = weight_unit;
        }
        if let Some(quantity) = self.quantity {
            if quantity == 0 {
                return Err(ItemValidationError::ZeroQuantity);
            }
            item.quantity = quantity;
        }
        if let Some(expiration_date) = self.expiration_date {
            item.expiration_date = Some(expiration_date);
        }
        if let Some(notes) = self.notes {
            item.notes = Some(notes);
        }
        if let Some(is_essential) = self.is_essential {
            item.is_essential = is_essential;
        }
        Ok(())
    }
}

/// Validation failures on inbound item payloads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("item name must not be empty")]
    EmptyName,
    #[error("item weight must be a positive number (found {0})")]
    InvalidWeight(f64),
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
}

/// Validation failures on inbound user payloads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UserValidationError {
    #[error("e-mail address '{0}' is malformed")]
    MalformedEmail(String),
    #[error("first and last name are required")]
    MissingName,
    #[error("height must be a non-negative number (found {0})")]
    InvalidHeight(f64),
    #[error("body weight must be a non-negative number (found {0})")]
    InvalidBodyWeight(f64),
}

fn email_is_well_formed(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}
