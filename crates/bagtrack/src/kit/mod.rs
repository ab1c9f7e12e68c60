//! Emergency bag tracking: items, weight math, expiration banding, and the
//! HTTP surface that serves them.
//!
//! The module is split the way the data flows. `domain` defines the stored
//! types and their validation, `units`, `expiration`, and `safety` hold the
//! pure calculators, `service` composes them over the repository traits, and
//! `sweep` is the batch counterpart of the alert query. `catalog` carries the
//! curated recommendation list.

pub mod catalog;
pub mod domain;
pub mod expiration;
pub mod repository;
pub mod router;
pub mod safety;
pub mod service;
pub mod sweep;
pub mod units;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogImport, CatalogImportError, Recommendation, RecommendationCatalog};
pub use domain::{
    CoercedUnit, EmailFrequency, Item, ItemCategory, ItemDraft, ItemId, ItemUpdate,
    ItemValidationError, NotificationPreferences, NotificationPreferencesUpdate, ProfileUpdate,
    UserDraft, UserId, UserProfile, UserValidationError, WeightUnit,
};
pub use expiration::{
    days_until_expiration, expiration_status, ExpirationBand, ExpirationStatus, StatusColor,
    CRITICAL_WINDOW_DAYS, EXPIRING_SOON_WINDOW_DAYS,
};
pub use repository::{
    EmailMessage, ItemRepository, MailError, Mailer, RepositoryError, UserRepository,
};
pub use router::{kit_router, KitRouterState, USER_ID_HEADER};
pub use safety::{weight_safety, SafetyBand, WeightSafetyResult, MAX_LOAD_FRACTION};
pub use service::{KitService, KitServiceError};
pub use sweep::{expiration_notice, ExpirationSweep, SweepReport};
pub use units::{convert_weight, format_weight, total_kit_weight};
pub use views::{ItemStatusView, KitSummary};
