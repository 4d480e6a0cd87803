use crate::config::parse_hhmm;
use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use std::future::Future;
use tokio::time::{Duration, sleep};
use tracing::{error, info};

const RESCHEDULE_POLL_SECONDS: u64 = 30;

/// Parsed, sorted and de-duplicated reminder times.
pub fn reminder_schedule(times: &[String]) -> Result<Vec<NaiveTime>> {
    let mut parsed = times
        .iter()
        .map(|time| parse_hhmm(time.trim()))
        .collect::<Result<Vec<_>>>()?;
    parsed.sort();
    parsed.dedup();

    Ok(parsed)
}

/// Next reminder strictly after `now`, as `(fire_at, delay)`.
pub fn next_reminder(times: &[NaiveTime], now: NaiveDateTime) -> Option<(NaiveDateTime, Duration)> {
    let today = now.date();
    let tomorrow = today + ChronoDuration::days(1);

    let fire_at = times
        .iter()
        .map(|time| today.and_time(*time))
        .find(|candidate| *candidate > now)
        .or_else(|| times.first().map(|time| tomorrow.and_time(*time)))?;

    (fire_at - now).to_std().ok().map(|delay| (fire_at, delay))
}

/// Sleeps until each reminder time and hands its date to `task`.
///
/// The schedule and clock are re-read every poll so preference edits apply
/// without a restart.
pub async fn run_reminder_scheduler<S, N, F, Fut>(
    mut schedule_provider: S,
    mut now_provider: N,
    mut task: F,
) -> Result<()>
where
    S: FnMut() -> Result<Vec<NaiveTime>>,
    N: FnMut() -> NaiveDateTime,
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut last_logged: Option<NaiveDateTime> = None;

    loop {
        let times = match schedule_provider() {
            Ok(value) => value,
            Err(error) => {
                error!(error = %error, "failed to load reminder schedule");
                sleep(Duration::from_secs(RESCHEDULE_POLL_SECONDS)).await;
                continue;
            }
        };

        let Some((fire_at, delay)) = next_reminder(&times, now_provider()) else {
            sleep(Duration::from_secs(RESCHEDULE_POLL_SECONDS)).await;
            continue;
        };

        if last_logged != Some(fire_at) {
            info!(seconds = delay.as_secs(), at = %fire_at, "next reminder scheduled");
            last_logged = Some(fire_at);
        }

        if delay > Duration::from_secs(RESCHEDULE_POLL_SECONDS) {
            sleep(Duration::from_secs(RESCHEDULE_POLL_SECONDS)).await;
            continue;
        }

        sleep(delay).await;

        let date = fire_at.date();
        if let Err(error) = task(date).await {
            error!(error = %error, date = %date, "reminder delivery failed");
        }

        sleep(Duration::from_secs(1)).await;
    }
}

pub fn describe_schedule(times: &[NaiveTime]) -> Result<String> {
    let rendered = times
        .iter()
        .map(|time| time.format("%H:%M").to_string())
        .collect::<Vec<_>>();

    Some(rendered.join(", "))
        .filter(|value| !value.is_empty())
        .context("No reminder times configured")
}

#[cfg(test)]
mod tests {
    use super::{describe_schedule, next_reminder, reminder_schedule};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").expect("datetime")
    }

    #[test]
    fn schedule_is_sorted_and_deduplicated() {
        let times = reminder_schedule(&[
            "21:00".to_string(),
            "09:00".to_string(),
            "21:00".to_string(),
        ])
        .expect("schedule");

        assert_eq!(describe_schedule(&times).expect("describe"), "09:00, 21:00");
        assert!(reminder_schedule(&["9pm".to_string()]).is_err());
        assert!(describe_schedule(&[]).is_err());
    }

    #[test]
    fn picks_next_time_today() {
        let times = reminder_schedule(&["09:00".to_string(), "21:00".to_string()]).expect("times");
        let (fire_at, delay) = next_reminder(&times, at("2026-03-15 10:30")).expect("next");

        assert_eq!(fire_at, at("2026-03-15 21:00"));
        assert_eq!(delay.as_secs(), 10 * 3600 + 30 * 60);
    }

    #[test]
    fn rolls_over_to_tomorrow() {
        let times = reminder_schedule(&["09:00".to_string()]).expect("times");
        let (fire_at, _) = next_reminder(&times, at("2026-03-15 09:00")).expect("next");

        assert_eq!(
            fire_at.date(),
            NaiveDate::from_ymd_opt(2026, 3, 16).expect("date")
        );
    }

    #[test]
    fn empty_schedule_never_fires() {
        assert!(next_reminder(&[], at("2026-03-15 09:00")).is_none());
    }
}
