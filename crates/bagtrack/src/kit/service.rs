use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::warn;

use super::domain::{
    Item, ItemDraft, ItemId, ItemUpdate, ItemValidationError, ProfileUpdate, UserDraft, UserId,
    UserProfile, UserValidationError, WeightUnit,
};
use super::expiration::{self, ExpirationBand};
use super::repository::{
    EmailMessage, ItemRepository, Mailer, RepositoryError, UserRepository,
};
use super::safety;
use super::units;
use super::views::{ItemStatusView, KitSummary};

/// Service composing the repositories, the mailer, and the bag domain rules.
pub struct KitService<I, U, M> {
    items: Arc<I>,
    users: Arc<U>,
    mailer: Arc<M>,
}

static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_item_id() -> ItemId {
    let id = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ItemId(format!("item-{id:06}"))
}

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("user-{id:06}"))
}

impl<I, U, M> KitService<I, U, M>
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    pub fn new(items: Arc<I>, users: Arc<U>, mailer: Arc<M>) -> Self {
        Self {
            items,
            users,
            mailer,
        }
    }

    /// Register a new account and dispatch the verification e-mail. A mail
    /// transport failure is logged but does not fail the registration.
    pub fn register_user(&self, draft: UserDraft) -> Result<UserProfile, KitServiceError> {
        let draft = draft.sanitized()?;

        let profile = UserProfile {
            id: next_user_id(),
            email: draft.email,
            first_name: draft.first_name,
            last_name: draft.last_name,
            height: draft.height,
            weight: draft.weight,
            email_verified: false,
            notification_preferences: Default::default(),
        };

        let stored = self.users.insert(profile)?;

        if let Err(error) = self.mailer.send(verification_email(&stored)) {
            warn!(user = %stored.id.0, %error, "verification e-mail not dispatched");
        }

        Ok(stored)
    }

    pub fn profile(&self, user: &UserId) -> Result<UserProfile, KitServiceError> {
        self.users
            .fetch(user)?
            .ok_or(KitServiceError::UserNotFound)
    }

    /// Merge a partial profile edit into the stored account.
    pub fn update_profile(
        &self,
        user: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, KitServiceError> {
        let mut profile = self.profile(user)?;
        update.apply_to(&mut profile)?;
        self.users.update(profile.clone())?;
        Ok(profile)
    }

    /// Mark the account's e-mail address as verified.
    pub fn confirm_email(&self, user: &UserId) -> Result<UserProfile, KitServiceError> {
        let mut profile = self.profile(user)?;
        profile.email_verified = true;
        self.users.update(profile.clone())?;
        Ok(profile)
    }

    pub fn items(&self, user: &UserId) -> Result<Vec<Item>, KitServiceError> {
        Ok(self.items.for_user(user)?)
    }

    /// Validate and store a new item for `user`.
    pub fn create_item(&self, user: &UserId, draft: ItemDraft) -> Result<Item, KitServiceError> {
        let draft = draft.sanitized()?;
        if self.users.fetch(user)?.is_none() {
            return Err(KitServiceError::UserNotFound);
        }

        let item = Item {
            id: next_item_id(),
            user_id: user.clone(),
            name: draft.name,
            category: draft.category,
            weight: draft.weight,
            weight_unit: draft.weight_unit,
            quantity: draft.quantity,
            expiration_date: draft.expiration_date,
            notes: draft.notes,
            is_essential: draft.is_essential,
        };

        Ok(self.items.insert(item)?)
    }

    /// Fetch one of `user`'s items. Another user's item is reported as absent
    /// rather than revealing that the id exists.
    pub fn item(&self, user: &UserId, id: &ItemId) -> Result<Item, KitServiceError> {
        match self.items.fetch(id)? {
            Some(item) if item.user_id == *user => Ok(item),
            _ => Err(KitServiceError::ItemNotFound),
        }
    }

    /// Merge a partial edit into one of `user`'s items.
    pub fn update_item(
        &self,
        user: &UserId,
        id: &ItemId,
        update: ItemUpdate,
    ) -> Result<Item, KitServiceError> {
        let mut item = self
            .items
            .fetch(id)?
            .ok_or(KitServiceError::ItemNotFound)?;
        if item.user_id != *user {
            return Err(KitServiceError::ForeignItem);
        }

        update.apply_to(&mut item)?;
        self.items.update(item.clone())?;
        Ok(item)
    }

    pub fn delete_item(&self, user: &UserId, id: &ItemId) -> Result<(), KitServiceError> {
        let item = self
            .items
            .fetch(id)?
            .ok_or(KitServiceError::ItemNotFound)?;
        if item.user_id != *user {
            return Err(KitServiceError::ForeignItem);
        }

        Ok(self.items.delete(id)?)
    }

    /// Items expiring inside the look-ahead window starting at `today`,
    /// ascending by expiration date. Already expired items are excluded.
    pub fn expiration_alerts(
        &self,
        user: &UserId,
        today: NaiveDate,
    ) -> Result<Vec<Item>, KitServiceError> {
        let until = today + Duration::days(expiration::EXPIRING_SOON_WINDOW_DAYS);
        Ok(self.items.expiring_within(user, today, until)?)
    }

    /// Aggregate the user's bag into the dashboard summary. The safety
    /// assessment always runs in kilograms regardless of the display unit.
    pub fn kit_summary(
        &self,
        user: &UserId,
        unit: WeightUnit,
        today: NaiveDate,
    ) -> Result<KitSummary, KitServiceError> {
        let profile = self.profile(user)?;
        let items = self.items.for_user(user)?;

        let total_weight = units::total_kit_weight(&items, unit);
        let total_in_kilograms =
            units::convert_weight(total_weight, unit, WeightUnit::Kilograms);
        let safety = safety::weight_safety(total_in_kilograms, profile.weight);

        let item_views: Vec<ItemStatusView> = items
            .iter()
            .map(|item| ItemStatusView::for_item(item, today))
            .collect();
        let expiring_soon = item_views
            .iter()
            .filter(|view| {
                matches!(
                    view.expiration.band,
                    ExpirationBand::Critical | ExpirationBand::Warning
                )
            })
            .count();

        Ok(KitSummary {
            unit,
            total_weight,
            total_weight_display: units::format_weight(total_weight, unit),
            item_count: items.len(),
            expiring_soon,
            safety,
            items: item_views,
        })
    }
}

fn verification_email(profile: &UserProfile) -> EmailMessage {
    let html_body = format!(
        "<h1>Welcome to Emergency Bag Tracker</h1>\
         <p>Hello {},</p>\
         <p>Please verify your e-mail address to activate expiration alerts for your emergency bag.</p>\
         <p>Stay prepared,</p>\
         <p>The Emergency Bag Tracker Team</p>",
        profile.first_name
    );
    EmailMessage {
        to: profile.email.clone(),
        subject: "Verify your Emergency Bag Tracker e-mail".to_string(),
        html_body,
    }
}

/// Error raised by the kit service.
#[derive(Debug, thiserror::Error)]
pub enum KitServiceError {
    #[error(transparent)]
    InvalidItem(#[from] ItemValidationError),
    #[error(transparent)]
    InvalidUser(#[from] UserValidationError),
    #[error("item not found")]
    ItemNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("cannot modify another user's item")]
    ForeignItem,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
