//! Reporting-window classification of pull requests.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::PipelineError;

/// The date range a run reports on.
///
/// `start` is the upper (most recent) bound and `end` the lower bound: a pull
/// request qualifies when `end <= created_at < start`. The listing is
/// consumed newest-first, so once an item drops below `end` no later page can
/// contain a qualifying item and pagination may stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Parses the configured `YYYY-MM-DD` bounds into midnight-UTC instants.
    pub fn parse(start: &str, end: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }

    /// Items created at or after `start` are too recent to report on.
    pub fn too_recent(&self, created_at: DateTime<Utc>) -> bool {
        created_at >= self.start
    }

    /// Items created before `end` predate the window entirely.
    pub fn crossed(&self, created_at: DateTime<Utc>) -> bool {
        created_at < self.end
    }

    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        !self.too_recent(created_at) && !self.crossed(created_at)
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, PipelineError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| PipelineError::Config(format!("invalid window date {value:?}: {e}")))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
