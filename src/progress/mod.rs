//! Per-user solve progress
//!
//! One `ProgressRecord` is stored per question id under the session's
//! progress collection. The in-memory mirror is replaced wholesale whenever
//! the progress subscription delivers a snapshot.

pub mod stats;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use stats::{DayCount, ProgressStats, TopicProgress, topic_breakdown, weekly_series};

/// Solve status of a question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Status {
    /// Not started. Unknown stored labels also decode here.
    #[default]
    #[serde(rename = "To-Do")]
    ToDo,
    Attempting,
    Solved,
}

impl Status {
    /// Label as stored and displayed
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToDo => "To-Do",
            Self::Attempting => "Attempting",
            Self::Solved => "Solved",
        }
    }

    /// Parse user input (case-insensitive, a few aliases)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "to-do" | "todo" | "t" => Some(Self::ToDo),
            "attempting" | "attempt" | "a" => Some(Self::Attempting),
            "solved" | "done" | "s" => Some(Self::Solved),
            _ => None,
        }
    }

    /// All statuses in selector order
    pub fn all() -> &'static [Status] {
        &[Self::ToDo, Self::Attempting, Self::Solved]
    }
}

impl From<String> for Status {
    /// Decode a stored label; anything but the exact labels is To-Do
    fn from(label: String) -> Self {
        match label.as_str() {
            "Attempting" => Self::Attempting,
            "Solved" => Self::Solved,
            _ => Self::ToDo,
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| format!("Unknown status: {}. Options: todo, attempting, solved", s))
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted progress for one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub status: Status,
    pub updated_at: DateTime<Utc>,
    /// First time the question was solved. Set once, never cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Compute the record to write when a question moves to `status`
    ///
    /// `updated_at` is always `now`. An existing `solved_at` is carried
    /// forward untouched whatever the new status is. When there is none, it
    /// is stamped with `now` only on a transition into `Solved` from another
    /// status.
    pub fn transition(prior: Option<&ProgressRecord>, status: Status, now: DateTime<Utc>) -> Self {
        let prior_status = prior.map(|p| p.status).unwrap_or_default();
        let solved_at = match prior.and_then(|p| p.solved_at) {
            Some(at) => Some(at),
            None if status == Status::Solved && prior_status != Status::Solved => Some(now),
            None => None,
        };

        Self { status, updated_at: now, solved_at }
    }
}

/// In-memory copy of the session's progress, keyed by question id
pub type ProgressMirror = HashMap<String, ProgressRecord>;

/// Status of a question in the mirror, defaulting to To-Do when absent
pub fn status_of(mirror: &ProgressMirror, question_id: &str) -> Status {
    mirror.get(question_id).map(|r| r.status).unwrap_or_default()
}

/// Build a mirror from progress documents, skipping malformed ones
pub fn decode_mirror<'a>(
    documents: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> ProgressMirror {
    let mut mirror = ProgressMirror::new();
    for (id, value) in documents {
        match serde_json::from_value::<ProgressRecord>(value.clone()) {
            Ok(record) => {
                mirror.insert(id.clone(), record);
            }
            Err(e) => {
                tracing::warn!("Skipping malformed progress record {}: {}", id, e);
            }
        }
    }
    mirror
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn status_labels_round_trip_through_serde() {
        for status in Status::all() {
            let value = serde_json::to_value(status).unwrap();
            assert_eq!(value, json!(status.label()));
            let back: Status = serde_json::from_value(value).unwrap();
            assert_eq!(back, *status);
        }
    }

    #[test]
    fn unknown_status_label_decodes_as_todo() {
        let status: Status = serde_json::from_value(json!("Abandoned")).unwrap();
        assert_eq!(status, Status::ToDo);
        let status: Status = serde_json::from_value(json!("solved")).unwrap();
        assert_eq!(status, Status::ToDo);
    }

    #[test]
    fn record_with_unknown_or_missing_status_is_todo() {
        let record: ProgressRecord = serde_json::from_value(
            json!({"status": "Abandoned", "updatedAt": "2025-03-01T10:00:00Z"}),
        )
        .unwrap();
        assert_eq!(record.status, Status::ToDo);

        let record: ProgressRecord =
            serde_json::from_value(json!({"updatedAt": "2025-03-01T10:00:00Z"})).unwrap();
        assert_eq!(record.status, Status::ToDo);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(Status::parse("TODO"), Some(Status::ToDo));
        assert_eq!(Status::parse("to-do"), Some(Status::ToDo));
        assert_eq!(Status::parse(" attempting "), Some(Status::Attempting));
        assert_eq!(Status::parse("solved"), Some(Status::Solved));
        assert_eq!(Status::parse("maybe"), None);
        assert!("maybe".parse::<Status>().is_err());
    }

    #[test]
    fn record_layout_uses_camel_case_and_omits_missing_solved_at() {
        let record = ProgressRecord::transition(None, Status::Attempting, at(0));
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["status"], "Attempting");
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("solvedAt").is_none());
    }

    #[test]
    fn status_cycle_keeps_first_solve_time() {
        let t1 = at(0);
        let t2 = at(60);
        let t3 = at(120);
        let t4 = at(180);

        let attempting = ProgressRecord::transition(None, Status::Attempting, t1);
        assert_eq!(
            attempting,
            ProgressRecord { status: Status::Attempting, updated_at: t1, solved_at: None }
        );

        let solved = ProgressRecord::transition(Some(&attempting), Status::Solved, t2);
        assert_eq!(
            solved,
            ProgressRecord { status: Status::Solved, updated_at: t2, solved_at: Some(t2) }
        );

        let reset = ProgressRecord::transition(Some(&solved), Status::ToDo, t3);
        assert_eq!(reset.solved_at, Some(t2));

        let resolved = ProgressRecord::transition(Some(&reset), Status::Solved, t4);
        assert_eq!(
            resolved,
            ProgressRecord { status: Status::Solved, updated_at: t4, solved_at: Some(t2) }
        );
    }

    #[test]
    fn solved_to_solved_without_history_adds_nothing() {
        let legacy = ProgressRecord { status: Status::Solved, updated_at: at(0), solved_at: None };
        let again = ProgressRecord::transition(Some(&legacy), Status::Solved, at(10));
        assert_eq!(again.solved_at, None);
        assert_eq!(again.updated_at, at(10));
    }

    #[test]
    fn decode_mirror_skips_malformed_records() {
        let docs = [
            (
                "cses_1068".to_string(),
                json!({
                    "status": "Solved",
                    "updatedAt": "2024-01-02T03:04:05Z",
                    "solvedAt": "2024-01-02T03:04:05Z"
                }),
            ),
            ("cses_1083".to_string(), json!({"status": "Attempting"})),
            ("cses_1621".to_string(), json!({"updatedAt": "2024-01-02T03:04:05Z"})),
        ];
        let mirror = decode_mirror(docs.iter().map(|(k, v)| (k, v)));

        assert_eq!(mirror.len(), 2);
        assert_eq!(status_of(&mirror, "cses_1068"), Status::Solved);
        assert_eq!(status_of(&mirror, "cses_1621"), Status::ToDo);
        assert_eq!(status_of(&mirror, "cses_1083"), Status::ToDo);
    }

    fn status_strategy() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::ToDo), Just(Status::Attempting), Just(Status::Solved)]
    }

    fn prior_strategy() -> impl Strategy<Value = Option<ProgressRecord>> {
        proptest::option::of((status_strategy(), 0i64..10_000, proptest::option::of(0i64..10_000)))
            .prop_map(|prior| {
                prior.map(|(status, updated, solved)| ProgressRecord {
                    status,
                    updated_at: at(updated),
                    solved_at: solved.map(at),
                })
            })
    }

    proptest! {
        #[test]
        fn transition_into_solved_always_has_solve_time(
            prior in prior_strategy(),
            offset in 10_000i64..20_000,
        ) {
            prop_assume!(prior.map(|p| p.status) != Some(Status::Solved));
            let now = at(offset);
            let next = ProgressRecord::transition(prior.as_ref(), Status::Solved, now);

            prop_assert!(next.solved_at.is_some());
            if prior.and_then(|p| p.solved_at).is_none() {
                prop_assert_eq!(next.solved_at, Some(now));
            }
        }

        #[test]
        fn existing_solve_time_is_carried_forward(
            prior in prior_strategy(),
            status in status_strategy(),
            offset in 10_000i64..20_000,
        ) {
            let now = at(offset);
            let next = ProgressRecord::transition(prior.as_ref(), status, now);

            prop_assert_eq!(next.updated_at, now);
            prop_assert_eq!(next.status, status);
            if let Some(solved_at) = prior.and_then(|p| p.solved_at) {
                prop_assert_eq!(next.solved_at, Some(solved_at));
            }
            if next.solved_at == Some(now) {
                prop_assert_eq!(status, Status::Solved);
            }
        }
    }
}
