use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use super::domain::{Item, UserProfile};
use super::expiration::EXPIRING_SOON_WINDOW_DAYS;
use super::repository::{EmailMessage, ItemRepository, Mailer, RepositoryError, UserRepository};

/// Daily batch scan notifying subscribed users of items expiring inside the
/// look-ahead window. Runs are independent: a user with the same expiring
/// items is notified again on the next run.
pub struct ExpirationSweep<I, U, M> {
    items: Arc<I>,
    users: Arc<U>,
    mailer: Arc<M>,
}

/// Tally of one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub subscribers: usize,
    pub notified: usize,
    pub without_matches: usize,
    pub failures: usize,
}

impl<I, U, M> ExpirationSweep<I, U, M>
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

    /// Scan every alert subscriber once for `today`. A failure for one user
    /// is logged and counted without interrupting the rest of the run.
    pub fn run(&self, today: NaiveDate) -> Result<SweepReport, RepositoryError> {
        let subscribers = self.users.alert_subscribers()?;
        let mut report = SweepReport {
            subscribers: subscribers.len(),
            ..SweepReport::default()
        };

        let until = today + Duration::days(EXPIRING_SOON_WINDOW_DAYS);

        for user in &subscribers {
            let expiring = match self.items.expiring_within(&user.id, today, until) {
                Ok(items) => items,
                Err(error) => {
                    warn!(user = %user.id.0, %error, "expiring item lookup failed");
                    report.failures += 1;
                    continue;
                }
            };

            if expiring.is_empty() {
                report.without_matches += 1;
                continue;
            }

            match self.mailer.send(expiration_notice(user, &expiring)) {
                Ok(()) => report.notified += 1,
                Err(error) => {
                    warn!(user = %user.id.0, %error, "expiration notice not dispatched");
                    report.failures += 1;
                }
            }
        }

        info!(
            subscribers = report.subscribers,
            notified = report.notified,
            failures = report.failures,
            "expiration sweep finished"
        );
        Ok(report)
    }
}

/// Render the notification e-mail for one user's expiring items. Dates are
/// written out long-form, e.g. `March 15, 2026`.
pub fn expiration_notice(user: &UserProfile, expiring: &[Item]) -> EmailMessage {
    let mut items_list = String::new();
    for item in expiring {
        let expires = item
            .expiration_date
            .map(|date| date.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| "an unknown date".to_string());
        let _ = write!(
            items_list,
            "<li><strong>{}</strong> - Expires on {}</li>",
            item.name, expires
        );
    }

    let html_body = format!(
        "<h1>Emergency Bag Item Expiration Alert</h1>\
         <p>Hello {},</p>\
         <p>The following items in your emergency bag are expiring within the next {} days:</p>\
         <ul>{}</ul>\
         <p>Please consider replacing these items to ensure your emergency kit remains up-to-date.</p>\
         <p>Stay prepared,</p>\
         <p>The Emergency Bag Tracker Team</p>",
        user.first_name, EXPIRING_SOON_WINDOW_DAYS, items_list
    );

    EmailMessage {
        to: user.email.clone(),
        subject: "Items in your Emergency Bag are expiring soon".to_string(),
        html_body,
    }
}
