//! # Poll Schedule
//!
//! When the next tick fires: either a fixed interval or a cron expression
//! evaluated in UTC.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Schedule construction errors.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The cron expression did not parse.
    #[error("invalid cron expression {expression:?}: {source}")]
    InvalidCron {
        expression: String,
        #[source]
        source: cron::error::Error,
    },
}

/// When reconciliation ticks fire.
#[derive(Debug, Clone)]
pub enum PollSchedule {
    /// A fixed delay between the end of one tick and the start of the next.
    Every(Duration),
    /// A cron expression evaluated in UTC (seconds field included, the
    /// `cron` crate's 7-field form).
    Cron(Box<cron::Schedule>),
}

impl PollSchedule {
    /// Parse a cron expression into a schedule.
    pub fn cron(expression: &str) -> Result<Self, ScheduleError> {
        let parsed = expression
            .parse::<cron::Schedule>()
            .map_err(|source| ScheduleError::InvalidCron {
                expression: expression.to_string(),
                source,
            })?;
        Ok(PollSchedule::Cron(Box::new(parsed)))
    }

    /// Delay from `now` until the next tick.
    ///
    /// A cron schedule with no future firing (possible with fully pinned
    /// date fields) falls back to one hour so the loop never spins.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Duration {
        match self {
            PollSchedule::Every(interval) => *interval,
            PollSchedule::Cron(schedule) => schedule
                .after(&now)
                .next()
                .and_then(|next| (next - now).to_std().ok())
                .unwrap_or(Duration::from_secs(3600)),
        }
    }
}
