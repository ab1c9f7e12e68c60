use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use bagtrack::kit::{
    EmailMessage, Item, ItemId, ItemRepository, MailError, Mailer, RepositoryError, UserId,
    UserProfile, UserRepository,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryItemRepository {
    records: Arc<Mutex<HashMap<ItemId, Item>>>,
}

impl ItemRepository for InMemoryItemRepository {
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
        if guard.contains_key(&item.id) {
            guard.insert(item.id.clone(), item);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryUserRepository {
    records: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.contains_key(&profile.id)
            || guard.values().any(|existing| existing.email == profile.email);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: UserProfile) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&profile.id) {
            guard.insert(profile.id.clone(), profile);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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

/// Mail hook for deployments without an SMTP relay. Every message is logged
/// and retained so the demo can show what would have gone out.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMailOutbox {
    messages: Arc<Mutex<Vec<EmailMessage>>>,
}

impl Mailer for InMemoryMailOutbox {
    fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "e-mail recorded in outbox");
        let mut guard = self.messages.lock().expect("outbox mutex poisoned");
        guard.push(message);
        Ok(())
    }
}

impl InMemoryMailOutbox {
    pub(crate) fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().expect("outbox mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
