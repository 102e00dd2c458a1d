//! Dashboard aggregates derived from the catalog and progress mirrors

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

use super::{ProgressMirror, Status, status_of};
use crate::catalog::{Topic, question_count};

/// Number of days shown in the consistency chart
pub const WEEK_DAYS: i64 = 7;

/// Solved/attempting/to-do totals for the dashboard cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub solved: usize,
    pub attempting: usize,
    pub todo: usize,
    pub total: usize,
}

impl ProgressStats {
    /// Count statuses over every question in the catalog
    ///
    /// Records for questions the catalog does not contain are ignored, so
    /// `solved + attempting + todo == total` holds even while the two
    /// mirrors disagree.
    pub fn compute(catalog: &[Topic], progress: &ProgressMirror) -> Self {
        let mut stats = Self { total: question_count(catalog), ..Self::default() };

        for question in catalog.iter().flat_map(|t| t.questions.iter()) {
            match status_of(progress, &question.id) {
                Status::Solved => stats.solved += 1,
                Status::Attempting => stats.attempting += 1,
                Status::ToDo => stats.todo += 1,
            }
        }

        stats
    }

    /// Solved share of the catalog (0.0 to 1.0)
    pub fn completion(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.solved as f64 / self.total as f64 }
    }
}

/// Solved count for one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Short weekday name ("Mon")
    pub label: String,
    pub solved: u64,
}

/// Solves per calendar day for the week ending at `now`
///
/// Always returns exactly seven entries, oldest first, with the last one
/// on `now`'s date. Days are bucketed in `now`'s time zone.
pub fn weekly_series<Tz: TimeZone>(progress: &ProgressMirror, now: &DateTime<Tz>) -> Vec<DayCount> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for record in progress.values().filter(|r| r.status == Status::Solved) {
        if let Some(solved_at) = record.solved_at {
            *per_day.entry(solved_at.with_timezone(&tz).date_naive()).or_default() += 1;
        }
    }

    (0..WEEK_DAYS)
        .rev()
        .map(|days_back| {
            let date = today - Duration::days(days_back);
            DayCount {
                date,
                label: date.format("%a").to_string(),
                solved: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Per-topic completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicProgress {
    pub name: String,
    pub solved: usize,
    pub total: usize,
}

/// Solved counts for each topic, in catalog order
pub fn topic_breakdown(catalog: &[Topic], progress: &ProgressMirror) -> Vec<TopicProgress> {
    catalog
        .iter()
        .map(|topic| TopicProgress {
            name: topic.name.clone(),
            solved: topic
                .questions
                .iter()
                .filter(|q| status_of(progress, &q.id) == Status::Solved)
                .count(),
            total: topic.questions.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::cses_problem_set;
    use crate::progress::ProgressRecord;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn solved(at: DateTime<Utc>) -> ProgressRecord {
        ProgressRecord { status: Status::Solved, updated_at: at, solved_at: Some(at) }
    }

    #[test]
    fn stats_over_seed_catalog() {
        let catalog = cses_problem_set();
        let mut progress = ProgressMirror::new();
        let now = utc(2024, 5, 10, 12, 0);
        progress.insert("cses_1068".into(), solved(now));
        progress.insert(
            "cses_1083".into(),
            ProgressRecord { status: Status::Attempting, updated_at: now, solved_at: None },
        );

        let stats = ProgressStats::compute(&catalog, &progress);
        assert_eq!(stats, ProgressStats { solved: 1, attempting: 1, todo: 2, total: 4 });
        assert!((stats.completion() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_ignore_records_missing_from_catalog() {
        let catalog = cses_problem_set();
        let mut progress = ProgressMirror::new();
        progress.insert("cses_9999".into(), solved(utc(2024, 5, 10, 12, 0)));

        let stats = ProgressStats::compute(&catalog, &progress);
        assert_eq!(stats.solved, 0);
        assert_eq!(stats.todo, 4);
    }

    #[test]
    fn empty_catalog_has_zero_completion() {
        let stats = ProgressStats::compute(&[], &ProgressMirror::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion(), 0.0);
    }

    #[test]
    fn weekly_series_zero_fills_and_ends_today() {
        let now = utc(2024, 5, 10, 12, 0); // a Friday
        let mut progress = ProgressMirror::new();
        progress.insert("a".into(), solved(utc(2024, 5, 10, 8, 0)));
        progress.insert("b".into(), solved(utc(2024, 5, 10, 9, 0)));
        progress.insert("c".into(), solved(utc(2024, 5, 7, 9, 0)));
        progress.insert("d".into(), solved(utc(2024, 4, 1, 9, 0)));
        progress.insert(
            "e".into(),
            ProgressRecord {
                status: Status::ToDo,
                updated_at: now,
                solved_at: Some(utc(2024, 5, 9, 9, 0)),
            },
        );

        let series = weekly_series(&progress, &now);
        let counts: Vec<u64> = series.iter().map(|d| d.solved).collect();
        assert_eq!(counts, vec![0, 0, 0, 1, 0, 0, 2]);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
        assert_eq!(series[6].label, "Fri");
    }

    #[test]
    fn weekly_series_buckets_in_local_time_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = utc(2024, 5, 10, 12, 0).with_timezone(&plus_two);
        let mut progress = ProgressMirror::new();
        // 23:30 UTC on the 9th is already the 10th at +02:00
        progress.insert("late".into(), solved(utc(2024, 5, 9, 23, 30)));

        let series = weekly_series(&progress, &now);
        assert_eq!(series[6].solved, 1);
        assert_eq!(series[5].solved, 0);
    }

    #[test]
    fn topic_breakdown_follows_catalog_order() {
        let catalog = cses_problem_set();
        let mut progress = ProgressMirror::new();
        progress.insert("cses_1621".into(), solved(utc(2024, 5, 10, 12, 0)));

        let breakdown = topic_breakdown(&catalog, &progress);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].solved, 0);
        assert_eq!(breakdown[1], TopicProgress {
            name: "Sorting and Searching".into(),
            solved: 1,
            total: 2
        });
    }

    fn status_strategy() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::ToDo), Just(Status::Attempting), Just(Status::Solved)]
    }

    proptest! {
        #[test]
        fn counts_always_partition_the_catalog(
            statuses in proptest::collection::vec(proptest::option::of(status_strategy()), 4),
            stray in proptest::collection::vec(status_strategy(), 0..5),
        ) {
            let catalog = cses_problem_set();
            let now = utc(2024, 5, 10, 12, 0);
            let ids: Vec<String> = catalog
                .iter()
                .flat_map(|t| t.questions.iter().map(|q| q.id.clone()))
                .collect();

            let mut progress = ProgressMirror::new();
            for (id, status) in ids.iter().zip(statuses) {
                if let Some(status) = status {
                    progress.insert(id.clone(), ProgressRecord::transition(None, status, now));
                }
            }
            for (i, status) in stray.into_iter().enumerate() {
                progress.insert(format!("stray_{i}"), ProgressRecord::transition(None, status, now));
            }

            let stats = ProgressStats::compute(&catalog, &progress);
            prop_assert_eq!(stats.total, 4);
            prop_assert_eq!(stats.solved + stats.attempting + stats.todo, stats.total);
        }

        #[test]
        fn weekly_series_is_always_seven_consecutive_days(
            offsets in proptest::collection::vec(-20i64..2, 0..20),
            hour in 0u32..24,
        ) {
            let now = utc(2024, 5, 10, hour, 0);
            let mut progress = ProgressMirror::new();
            for (i, offset) in offsets.iter().enumerate() {
                progress.insert(format!("q{i}"), solved(now + Duration::days(*offset)));
            }

            let series = weekly_series(&progress, &now);
            prop_assert_eq!(series.len(), 7);
            prop_assert_eq!(series[6].date, now.date_naive());
            for pair in series.windows(2) {
                prop_assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
        }
    }
}
