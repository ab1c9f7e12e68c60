use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};

use bagtrack::kit::{
    EmailMessage, ExpirationBand, ExpirationSweep, Item, ItemDraft, ItemId, ItemRepository,
    ItemUpdate, KitService, MailError, Mailer, ProfileUpdate, RepositoryError, SafetyBand,
    UserDraft, UserId, UserProfile, UserRepository, WeightUnit,
};

#[derive(Default)]
struct ItemStore {
    rows: Mutex<HashMap<ItemId, Item>>,
}

impl ItemRepository for ItemStore {
    fn insert(&self, item: Item) -> Result<Item, RepositoryError> {
        let mut rows = self.rows.lock().expect("item store poisoned");
        if rows.contains_key(&item.id) {
            return Err(RepositoryError::Conflict);
        }
        rows.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    fn update(&self, item: Item) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("item store poisoned");
        if !rows.contains_key(&item.id) {
            return Err(RepositoryError::NotFound);
        }
        rows.insert(item.id.clone(), item);
        Ok(())
    }

    fn fetch(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        let rows = self.rows.lock().expect("item store poisoned");
        Ok(rows.get(id).cloned())
    }

    fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("item store poisoned");
        rows.remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Item>, RepositoryError> {
        let rows = self.rows.lock().expect("item store poisoned");
        let mut items: Vec<Item> = rows
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
        let rows = self.rows.lock().expect("item store poisoned");
        let mut items: Vec<Item> = rows
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

#[derive(Default)]
struct UserStore {
    rows: Mutex<HashMap<UserId, UserProfile>>,
}

impl UserRepository for UserStore {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut rows = self.rows.lock().expect("user store poisoned");
        let duplicate = rows.contains_key(&profile.id)
            || rows.values().any(|existing| existing.email == profile.email);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        rows.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: UserProfile) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("user store poisoned");
        if !rows.contains_key(&profile.id) {
            return Err(RepositoryError::NotFound);
        }
        rows.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let rows = self.rows.lock().expect("user store poisoned");
        Ok(rows.get(id).cloned())
    }

    fn alert_subscribers(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = self.rows.lock().expect("user store poisoned");
        let mut subscribers: Vec<UserProfile> = rows
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

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<EmailMessage>>,
}

impl Outbox {
    fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("outbox poisoned").clone()
    }
}

impl Mailer for Outbox {
    fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.sent.lock().expect("outbox poisoned").push(message);
        Ok(())
    }
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid reference date")
}

fn build_stack() -> (
    KitService<ItemStore, UserStore, Outbox>,
    Arc<ItemStore>,
    Arc<UserStore>,
    Arc<Outbox>,
) {
    let items = Arc::new(ItemStore::default());
    let users = Arc::new(UserStore::default());
    let outbox = Arc::new(Outbox::default());
    let service = KitService::new(
        Arc::clone(&items),
        Arc::clone(&users),
        Arc::clone(&outbox),
    );
    (service, items, users, outbox)
}

fn registration() -> UserDraft {
    UserDraft {
        email: "Avery.Quinn@Example.com".to_string(),
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        height: Some(175.0),
        weight: Some(70.0),
    }
}

fn draft(name: &str, weight: f64, unit: WeightUnit) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        category: Default::default(),
        weight,
        weight_unit: unit,
        quantity: 1,
        expiration_date: None,
        notes: None,
        is_essential: false,
    }
}

#[test]
fn household_journey_from_registration_to_summary() {
    let (service, _, _, outbox) = build_stack();
    let today = reference_date();

    let profile = service
        .register_user(registration())
        .expect("registration succeeds");
    assert_eq!(profile.email, "avery.quinn@example.com");
    assert!(!profile.email_verified);
    assert!(
        outbox.sent().iter().any(|mail| mail.subject.contains("Verify")),
        "registration should dispatch a verification e-mail"
    );

    let profile = service
        .confirm_email(&profile.id)
        .expect("verification succeeds");
    assert!(profile.email_verified);

    let mut water = draft("Water Pouches", 500.0, WeightUnit::Grams);
    water.quantity = 2;
    water.expiration_date = Some(today + Duration::days(10));
    service
        .create_item(&profile.id, water)
        .expect("water stores");

    let mut kit = draft("First Aid Kit", 250.0, WeightUnit::Grams);
    kit.is_essential = true;
    let kit = service.create_item(&profile.id, kit).expect("kit stores");

    let mut meds = draft("Allergy Medication", 0.1, WeightUnit::Kilograms);
    meds.expiration_date = Some(today + Duration::days(3));
    service.create_item(&profile.id, meds).expect("meds store");

    let renamed = service
        .update_item(
            &profile.id,
            &kit.id,
            ItemUpdate {
                name: Some("Travel First Aid Kit".to_string()),
                ..Default::default()
            },
        )
        .expect("rename succeeds");
    assert_eq!(renamed.name, "Travel First Aid Kit");
    assert!(renamed.is_essential, "unrelated fields must survive the edit");

    let alerts = service
        .expiration_alerts(&profile.id, today)
        .expect("alerts resolve");
    let alert_names: Vec<&str> = alerts.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        alert_names,
        vec!["Allergy Medication", "Water Pouches"],
        "alerts should come back soonest first"
    );

    let summary = service
        .kit_summary(&profile.id, WeightUnit::Kilograms, today)
        .expect("summary resolves");
    assert_eq!(summary.item_count, 3);
    assert!((summary.total_weight - 1.35).abs() < 1e-9);
    assert_eq!(summary.total_weight_display, "1.35 kg");
    assert_eq!(summary.expiring_soon, 2);

    let safety = summary.safety.expect("body weight is on file");
    assert_eq!(safety.band, SafetyBand::Safe);
    assert!(safety.percentage < 50.0);

    let critical = summary
        .items
        .iter()
        .find(|view| view.name == "Allergy Medication")
        .expect("medication appears in the summary");
    assert_eq!(critical.expiration.band, ExpirationBand::Critical);
}

#[test]
fn profile_edits_merge_without_clobbering() {
    let (service, _, _, _) = build_stack();

    let profile = service
        .register_user(registration())
        .expect("registration succeeds");

    let updated = service
        .update_profile(
            &profile.id,
            ProfileUpdate {
                weight: Some(82.5),
                ..Default::default()
            },
        )
        .expect("profile update succeeds");

    assert_eq!(updated.weight, Some(82.5));
    assert_eq!(updated.first_name, "Avery", "untouched fields must remain");
    assert_eq!(updated.height, Some(175.0));
}

#[test]
fn sweep_notifies_the_verified_household() {
    let (service, items, users, outbox) = build_stack();
    let today = reference_date();

    let verified = service
        .register_user(registration())
        .expect("registration succeeds");
    service
        .confirm_email(&verified.id)
        .expect("verification succeeds");

    let mut unverified_draft = registration();
    unverified_draft.email = "casey@example.com".to_string();
    unverified_draft.first_name = "Casey".to_string();
    service
        .register_user(unverified_draft)
        .expect("registration succeeds");

    let mut bandages = draft("Sterile Bandages", 80.0, WeightUnit::Grams);
    bandages.expiration_date = Some(today + Duration::days(6));
    service
        .create_item(&verified.id, bandages)
        .expect("bandages store");

    let mail_count_before = outbox.sent().len();
    let sweep = ExpirationSweep::new(items, users, outbox.clone());
    let report = sweep.run(today).expect("sweep completes");

    assert_eq!(report.subscribers, 1, "only the verified user subscribes");
    assert_eq!(report.notified, 1);
    assert_eq!(report.failures, 0);

    let sent = outbox.sent();
    assert_eq!(sent.len(), mail_count_before + 1);
    let notice = sent.last().expect("notice was recorded");
    assert_eq!(notice.to, "avery.quinn@example.com");
    assert_eq!(notice.subject, "Items in your Emergency Bag are expiring soon");
    assert!(notice.html_body.contains("Sterile Bandages"));
    assert!(notice.html_body.contains("March 21, 2026"));
}
