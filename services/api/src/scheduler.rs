use std::time::Duration;

use bagtrack::kit::{ExpirationSweep, ItemRepository, Mailer, UserRepository};
use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

/// Run the expiration sweep once per day at the configured local hour. The
/// task runs for the life of the process.
pub(crate) fn spawn_daily_sweep<I, U, M>(
    sweep: ExpirationSweep<I, U, M>,
    hour: u32,
) -> tokio::task::JoinHandle<()>
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_run(Local::now().naive_local(), hour);
            info!(seconds = wait.as_secs(), hour, "next expiration sweep scheduled");
            tokio::time::sleep(wait).await;

            match sweep.run(Local::now().date_naive()) {
                Ok(report) => info!(
                    subscribers = report.subscribers,
                    notified = report.notified,
                    without_matches = report.without_matches,
                    failures = report.failures,
                    "scheduled expiration sweep finished"
                ),
                Err(error) => warn!(%error, "scheduled expiration sweep aborted"),
            }
        }
    })
}

/// Time left until the next occurrence of `hour:00:00` after `now`. A run
/// scheduled exactly at `now` waits for the following day.
fn duration_until_next_run(now: NaiveDateTime, hour: u32) -> Duration {
    let run_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let today_run = now.date().and_time(run_time);
    let next_run = if now < today_run {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };

    (next_run - now).to_std().unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 15)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
    }

    #[test]
    fn waits_until_the_same_day_when_the_hour_is_ahead() {
        let wait = duration_until_next_run(at(6, 0), 8);
        assert_eq!(wait, Duration::from_secs(2 * 60 * 60));
    }

    #[test]
    fn rolls_over_to_tomorrow_when_the_hour_has_passed() {
        let wait = duration_until_next_run(at(9, 30), 8);
        assert_eq!(wait, Duration::from_secs(22 * 60 * 60 + 30 * 60));
    }

    #[test]
    fn a_run_at_the_exact_hour_waits_a_full_day() {
        let wait = duration_until_next_run(at(8, 0), 8);
        assert_eq!(wait, Duration::from_secs(24 * 60 * 60));
    }
}
