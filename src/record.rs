//! The JSON record emitted to the sink, one per pull request.

use serde::Serialize;

use crate::github::PrSummary;
use crate::metrics::Durations;

/// One emitted measurement for a single pull request.
///
/// Field declaration order is the serialization order, so repeated
/// serialization of the same record is byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    #[serde(rename = "prID")]
    pub pr_id: u64,
    #[serde(rename = "commentDurationDays")]
    pub comment_duration_days: i64,
    #[serde(rename = "submitDurationDays")]
    pub submit_duration_days: i64,
    pub status: String,
    /// Assignee login, or the literal string "null" when unassigned.
    pub assignee: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    /// Creation date truncated to `YYYY-MM-DD`.
    #[serde(rename = "createdOnDate")]
    pub created_on_date: String,
}

impl MetricRecord {
    pub fn new(pr: &PrSummary, durations: Durations) -> Self {
        Self {
            pr_id: pr.number,
            comment_duration_days: durations.comment_days,
            submit_duration_days: durations.submit_days,
            status: pr.state.clone(),
            assignee: login_or_null(pr.assignee.as_deref()),
            created_by: login_or_null(pr.author.as_deref()),
            created_on_date: pr.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

// Downstream consumers of historical exports filter on the literal string
// "null", so a missing login must not become a JSON null.
fn login_or_null(login: Option<&str>) -> String {
    match login {
        Some(login) => login.to_string(),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary() -> PrSummary {
        PrSummary {
            number: 1347,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 15, 30, 0).unwrap(),
            closed_at: None,
            merged_at: None,
            author: Some("alice".to_string()),
            assignee: None,
            state: "open".to_string(),
        }
    }

    fn durations() -> Durations {
        Durations {
            comment_days: 2,
            submit_days: 7,
        }
    }

    #[test]
    fn test_record_field_contract() {
        // Guards the emitted key set; downstream dashboards index by these
        // exact names.
        let json = serde_json::to_value(MetricRecord::new(&summary(), durations())).unwrap();

        assert_eq!(json["prID"], 1347);
        assert_eq!(json["commentDurationDays"], 2);
        assert_eq!(json["submitDurationDays"], 7);
        assert_eq!(json["status"], "open");
        assert_eq!(json["assignee"], "null");
        assert_eq!(json["createdBy"], "alice");
        assert_eq!(json["createdOnDate"], "2024-01-01");

        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 7);
    }

    #[test]
    fn test_missing_logins_serialize_as_the_string_null() {
        let mut pr = summary();
        pr.author = None;
        pr.assignee = None;

        let json = serde_json::to_value(MetricRecord::new(&pr, durations())).unwrap();

        assert_eq!(json["createdBy"], "null");
        assert_eq!(json["assignee"], "null");
        assert!(!json["createdBy"].is_null());
        assert!(!json["assignee"].is_null());
    }

    #[test]
    fn test_created_on_date_drops_time_of_day() {
        let record = MetricRecord::new(&summary(), durations());
        assert_eq!(record.created_on_date, "2024-01-01");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let record = MetricRecord::new(&summary(), durations());

        let first = serde_json::to_string(&record).unwrap();
        let second = serde_json::to_string(&record).unwrap();

        assert_eq!(first, second);
    }
}
