use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;
use crate::names::{SERVICE_STATUS_ACTIVE, SERVICE_STATUS_INTENT_TO_SUSPEND};

/// A service (certification scheme) held by a client, with its status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientService {
    pub id: i64,
    pub client_id: i64,
    pub service_id: i64,
    pub service_status_id: Option<i64>,
    pub status: Option<String>,
}

impl Default for ClientService {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            client_id: UNSET_ID,
            service_id: UNSET_ID,
            service_status_id: None,
            status: None,
        }
    }
}

/// One status change on a client service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientServiceHistory {
    pub id: i64,
    pub client_service_id: i64,
    pub status: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl ClientServiceHistory {
    /// Whether this entry put the service in a certified state.
    #[must_use]
    pub fn is_active_status(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some(SERVICE_STATUS_ACTIVE | SERVICE_STATUS_INTENT_TO_SUSPEND)
        )
    }
}

/// Whether a service was certified at any point in `[start, end]`.
///
/// `history` is the service's status changes in any order. Each active
/// entry opens a certified stretch that lasts until the next entry with
/// another status, or is still open. Entries without a timestamp are
/// ignored.
#[must_use]
pub fn active_during_period(
    history: &[ClientServiceHistory],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    let mut entries: Vec<(NaiveDateTime, bool)> = history
        .iter()
        .filter_map(|entry| entry.created_at.map(|at| (at, entry.is_active_status())))
        .collect();
    entries.sort_by_key(|(at, _)| *at);

    let mut stretch_start: Option<NaiveDateTime> = None;
    for (at, active) in entries {
        match (active, stretch_start) {
            (true, None) => stretch_start = Some(at),
            (false, Some(from)) => {
                if from <= end && at >= start {
                    return true;
                }
                stretch_start = None;
            }
            _ => {}
        }
    }
    stretch_start.is_some_and(|from| from <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn day(month: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn entry(status: &str, at: NaiveDateTime) -> ClientServiceHistory {
        ClientServiceHistory {
            id: UNSET_ID,
            client_service_id: 1,
            status: Some(status.into()),
            user_id: None,
            created_at: Some(at),
        }
    }

    fn suspended_in_march() -> Vec<ClientServiceHistory> {
        vec![
            entry("Applied", day(1, 5)),
            entry(SERVICE_STATUS_ACTIVE, day(2, 1)),
            entry(SERVICE_STATUS_INTENT_TO_SUSPEND, day(3, 1)),
            entry("Suspended", day(3, 20)),
        ]
    }

    #[rstest]
    #[case(day(1, 1), day(1, 31), false)]
    #[case(day(1, 1), day(2, 1), true)]
    #[case(day(2, 10), day(2, 20), true)]
    #[case(day(3, 15), day(4, 30), true)]
    #[case(day(3, 21), day(12, 31), false)]
    fn suspended_service(
        #[case] start: NaiveDateTime,
        #[case] end: NaiveDateTime,
        #[case] expected: bool,
    ) {
        assert_eq!(active_during_period(&suspended_in_march(), start, end), expected);
    }

    #[test]
    fn still_active_counts_any_later_period() {
        let history = vec![entry(SERVICE_STATUS_ACTIVE, day(6, 1))];
        assert!(active_during_period(&history, day(11, 1), day(11, 30)));
        assert!(!active_during_period(&history, day(1, 1), day(5, 31)));
    }

    #[test]
    fn reinstated_service_covers_both_stretches() {
        let history = vec![
            entry(SERVICE_STATUS_ACTIVE, day(1, 1)),
            entry("Suspended", day(2, 1)),
            entry(SERVICE_STATUS_ACTIVE, day(5, 1)),
        ];
        assert!(!active_during_period(&history, day(3, 1), day(4, 30)));
        assert!(active_during_period(&history, day(4, 1), day(5, 1)));
    }

    #[test]
    fn empty_history_was_never_active() {
        assert!(!active_during_period(&[], day(1, 1), day(12, 31)));
    }
}
