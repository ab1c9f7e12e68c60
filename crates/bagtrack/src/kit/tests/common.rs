use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::kit::domain::{
    Item, ItemCategory, ItemDraft, ItemId, UserDraft, UserId, UserProfile, WeightUnit,
};
use crate::kit::repository::{
    EmailMessage, ItemRepository, MailError, Mailer, RepositoryError, UserRepository,
};
use crate::kit::service::KitService;

/// Fixed reference date so band assertions never depend on the wall clock.
pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date")
}

pub(super) fn in_days(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub(super) fn user_draft(email: &str) -> UserDraft {
    UserDraft {
        email: email.to_string(),
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        height: Some(175.0),
        weight: Some(70.0),
    }
}

pub(super) fn item_draft(name: &str, weight: f64, unit: WeightUnit) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        category: ItemCategory::Other,
        weight,
        weight_unit: unit,
        quantity: 1,
        expiration_date: None,
        notes: None,
        is_essential: false,
    }
}

pub(super) fn stored_item(
    id: &str,
    user: &UserId,
    name: &str,
    weight: f64,
    unit: WeightUnit,
    quantity: u32,
    expiration_date: Option<NaiveDate>,
) -> Item {
    Item {
        id: ItemId(id.to_string()),
        user_id: user.clone(),
        name: name.to_string(),
        category: ItemCategory::Other,
        weight,
        weight_unit: unit,
        quantity,
        expiration_date,
        notes: None,
        is_essential: false,
    }
}

pub(super) fn subscriber(id: &str, email: &str) -> UserProfile {
    UserProfile {
        id: UserId(id.to_string()),
        email: email.to_string(),
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        height: Some(175.0),
        weight: Some(70.0),
        email_verified: true,
        notification_preferences: Default::default(),
    }
}

pub(super) fn build_service() -> (
    KitService<MemoryItems, MemoryUsers, MemoryMailer>,
    Arc<MemoryItems>,
    Arc<MemoryUsers>,
    Arc<MemoryMailer>,
) {
    let items = Arc::new(MemoryItems::default());
    let users = Arc::new(MemoryUsers::default());
    let mailer = Arc::new(MemoryMailer::default());
    let service = KitService::new(items.clone(), users.clone(), mailer.clone());
    (service, items, users, mailer)
}

#[derive(Default, Clone)]
pub(super) struct MemoryItems {
    pub(super) records: Arc<Mutex<HashMap<ItemId, Item>>>,
}

impl ItemRepository for MemoryItems {
    fn insert(&self, item: Item) -> Result<Item, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&item.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    fn update(&self, item: Item) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&item.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(item.id.clone(), item);
        Ok(())
    }

    fn fetch(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Item>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut items: Vec<Item> = guard
            .values()
            .filter(|item| item.user_id == *user)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    fn expiring_within(
        &self,
        user: &UserId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Item>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut items: Vec<Item> = guard
            .values()
            .filter(|item| item.user_id == *user)
            .filter(|item| {
                item.expiration_date
                    .is_some_and(|date| date >= from && date <= until)
            })
            .cloned()
            .collect();
        items.sort_by_key(|item| item.expiration_date);
        Ok(items)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryUsers {
    pub(super) records: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl UserRepository for MemoryUsers {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard
            .values()
            .any(|existing| existing.id == profile.id || existing.email == profile.email);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: UserProfile) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&profile.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn alert_subscribers(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut subscribers: Vec<UserProfile> = guard
            .values()
            .filter(|profile| {
                profile.notification_preferences.expiration_alerts && profile.email_verified
            })
            .cloned()
            .collect();
        subscribers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(subscribers)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Mailer that rejects one recipient and records the rest.
#[derive(Clone)]
pub(super) struct FlakyMailer {
    reject: String,
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl FlakyMailer {
    pub(super) fn rejecting(address: &str) -> Self {
        Self {
            reject: address.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for FlakyMailer {
    fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if message.to == self.reject {
            return Err(MailError::Transport("mailbox unavailable".to_string()));
        }
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) struct UnavailableItems;

impl ItemRepository for UnavailableItems {
    fn insert(&self, _item: Item) -> Result<Item, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _item: Item) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ItemId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_user(&self, _user: &UserId) -> Result<Vec<Item>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn expiring_within(
        &self,
        _user: &UserId,
        _from: NaiveDate,
        _until: NaiveDate,
    ) -> Result<Vec<Item>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
