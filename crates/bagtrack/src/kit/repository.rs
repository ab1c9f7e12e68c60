use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Item, ItemId, UserId, UserProfile};

/// Storage abstraction over the item collection so the service module can be
/// exercised in isolation.
pub trait ItemRepository: Send + Sync {
    fn insert(&self, item: Item) -> Result<Item, RepositoryError>;
    fn update(&self, item: Item) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError>;
    fn delete(&self, id: &ItemId) -> Result<(), RepositoryError>;
    /// Every item owned by `user`, ascending by item id.
    fn for_user(&self, user: &UserId) -> Result<Vec<Item>, RepositoryError>;
    /// Items owned by `user` whose expiration date falls inside the inclusive
    /// `[from, until]` window, ascending by expiration date. Items without a
    /// date never match.
    fn expiring_within(
        &self,
        user: &UserId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Item>, RepositoryError>;
}

/// Storage abstraction over user accounts. Implementations must treat the
/// e-mail address as unique and answer duplicate inserts with `Conflict`.
pub trait UserRepository: Send + Sync {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError>;
    fn update(&self, profile: UserProfile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;
    /// Users eligible for expiration notices: alerts switched on and e-mail
    /// verified.
    fn alert_subscribers(&self) -> Result<Vec<UserProfile>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing the outbound e-mail hook. Provider wiring lives with the
/// binary, not the domain.
pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Rendered e-mail payload so routes and tests can assert what was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}
