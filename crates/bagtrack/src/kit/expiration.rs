use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Look-ahead horizon for "expiring soon". Shared by the status classifier,
/// the alert query, and the notification sweep so the three can never drift.
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// Upper bound of the critical band, in days from today.
pub const CRITICAL_WINDOW_DAYS: i64 = 7;

/// Advisory severity of an item's expiration date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationBand {
    Unknown,
    Expired,
    Critical,
    Warning,
    Ok,
}

impl ExpirationBand {
    pub const fn label(self) -> &'static str {
        match self {
            ExpirationBand::Unknown => "unknown",
            ExpirationBand::Expired => "expired",
            ExpirationBand::Critical => "critical",
            ExpirationBand::Warning => "warning",
            ExpirationBand::Ok => "ok",
        }
    }
}

/// Display hint paired with each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Default,
    Error,
    Warning,
    Success,
}

impl StatusColor {
    pub const fn label(self) -> &'static str {
        match self {
            StatusColor::Default => "default",
            StatusColor::Error => "error",
            StatusColor::Warning => "warning",
            StatusColor::Success => "success",
        }
    }
}

/// Band plus its display color, as served to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationStatus {
    #[serde(rename = "status")]
    pub band: ExpirationBand,
    pub color: StatusColor,
}

/// Whole calendar days from `today` until `expiration`. Negative for past
/// dates, `None` when no date is recorded.
pub fn days_until_expiration(expiration: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    expiration.map(|date| (date - today).num_days())
}

/// Classify an expiration date relative to `today`. Today itself counts as
/// critical, day 7 closes the critical band, day 30 closes the warning band.
pub fn expiration_status(expiration: Option<NaiveDate>, today: NaiveDate) -> ExpirationStatus {
    match days_until_expiration(expiration, today) {
        None => ExpirationStatus {
            band: ExpirationBand::Unknown,
            color: StatusColor::Default,
        },
        Some(days) if days < 0 => ExpirationStatus {
            band: ExpirationBand::Expired,
            color: StatusColor::Error,
        },
        Some(days) if days <= CRITICAL_WINDOW_DAYS => ExpirationStatus {
            band: ExpirationBand::Critical,
            color: StatusColor::Error,
        },
        Some(days) if days <= EXPIRING_SOON_WINDOW_DAYS => ExpirationStatus {
            band: ExpirationBand::Warning,
            color: StatusColor::Warning,
        },
        Some(_) => ExpirationStatus {
            band: ExpirationBand::Ok,
            color: StatusColor::Success,
        },
    }
}

/// Parse a date from free text: `YYYY-MM-DD` first, then the date part of an
/// RFC 3339 timestamp. Returns `None` for anything else.
pub fn parse_expiration_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
}

pub(crate) fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_expiration_date))
}
