//! Calendar event instances and query-side filtering.
//!
//! The decision engine consumes already-filtered [`EventInstance`] values; the
//! [`CalendarSource`] trait is the contract a calendar provider implements,
//! and [`apply_filters`] is the filtering it must perform before handing
//! instances to the engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single occurrence of a calendar event, with a half-open `[begin, end)`
/// time interval. Recurring events produce one instance per occurrence; all
/// instances of a series share `event_id` but differ in `begin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInstance {
    pub event_id: i64,
    /// Recurrence instance identifier (0 for non-recurring events).
    #[serde(default)]
    pub instance_id: i64,
    pub calendar_id: i64,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default = "default_busy")]
    pub busy: bool,
}

fn default_busy() -> bool {
    true
}

impl EventInstance {
    /// Duration of this instance.
    pub fn duration(&self) -> Duration {
        self.end - self.begin
    }

    /// Whether `now` falls inside `[begin, end)`.
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        self.begin <= now && now < self.end
    }

    /// Strict overlap with `[begin, end)`.
    pub fn overlaps(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.begin < end && self.end > begin
    }

    /// Overlap-or-touch with `[begin, end)`; back-to-back intervals count.
    pub fn touches(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.begin <= end && self.end >= begin
    }
}

/// How the title keyword list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TitleMatchMode {
    /// Keep only instances whose title contains at least one keyword.
    #[default]
    Include,
    /// Drop instances whose title contains any keyword.
    Exclude,
}

/// Criteria a calendar provider applies before returning instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterCriteria {
    /// Calendars to consider; empty means all calendars.
    #[serde(default)]
    pub calendar_ids: Vec<i64>,
    /// Only consider instances marked busy.
    #[serde(default)]
    pub busy_only: bool,
    /// Drop all-day instances.
    #[serde(default)]
    pub ignore_all_day: bool,
    /// Drop instances shorter than this many minutes (0 disables).
    #[serde(default)]
    pub min_duration_minutes: u32,
    /// Title keywords, matched case-insensitively as substrings.
    #[serde(default)]
    pub title_keywords: Vec<String>,
    #[serde(default)]
    pub title_match_mode: TitleMatchMode,
}

impl FilterCriteria {
    /// Whether a single instance passes all criteria.
    pub fn matches(&self, instance: &EventInstance) -> bool {
        if !self.calendar_ids.is_empty() && !self.calendar_ids.contains(&instance.calendar_id) {
            return false;
        }
        if self.busy_only && !instance.busy {
            return false;
        }
        if self.ignore_all_day && instance.all_day {
            return false;
        }
        if self.min_duration_minutes > 0
            && instance.duration() < Duration::minutes(i64::from(self.min_duration_minutes))
        {
            return false;
        }
        if !self.title_keywords.is_empty() {
            let title = instance.title.to_lowercase();
            let hit = self
                .title_keywords
                .iter()
                .any(|kw| !kw.is_empty() && title.contains(&kw.to_lowercase()));
            match self.title_match_mode {
                TitleMatchMode::Include => {
                    if !hit {
                        return false;
                    }
                }
                TitleMatchMode::Exclude => {
                    if hit {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Apply [`FilterCriteria`] to a batch of instances, preserving order.
pub fn apply_filters(instances: Vec<EventInstance>, criteria: &FilterCriteria) -> Vec<EventInstance> {
    instances
        .into_iter()
        .filter(|i| criteria.matches(i))
        .collect()
}

/// Contract a calendar provider implements for the engine's caller.
///
/// Implementations must resolve to plain values before the engine is invoked;
/// the engine itself never calls out.
pub trait CalendarSource {
    /// All instances intersecting `[begin, end)`, already filtered.
    fn instances_in_range(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<EventInstance>>;

    /// The earliest instance beginning strictly after `now`, already filtered.
    fn next_instance_after(
        &self,
        now: DateTime<Utc>,
        criteria: &FilterCriteria,
    ) -> Result<Option<EventInstance>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn instance(id: i64, begin: i64, end: i64) -> EventInstance {
        EventInstance {
            event_id: id,
            instance_id: 0,
            calendar_id: 1,
            title: format!("event {id}"),
            location: None,
            begin: ts(begin),
            end: ts(end),
            all_day: false,
            busy: true,
        }
    }

    #[test]
    fn test_busy_only_filter() {
        let mut free = instance(1, 0, 60_000);
        free.busy = false;
        let busy = instance(2, 0, 60_000);
        let criteria = FilterCriteria {
            busy_only: true,
            ..Default::default()
        };
        let out = apply_filters(vec![free, busy.clone()], &criteria);
        assert_eq!(out, vec![busy]);
    }

    #[test]
    fn test_min_duration_filter() {
        let short = instance(1, 0, 4 * 60_000);
        let long = instance(2, 0, 30 * 60_000);
        let criteria = FilterCriteria {
            min_duration_minutes: 5,
            ..Default::default()
        };
        let out = apply_filters(vec![short, long.clone()], &criteria);
        assert_eq!(out, vec![long]);
    }

    #[test]
    fn test_title_include_and_exclude() {
        let mut standup = instance(1, 0, 60_000);
        standup.title = "Daily Standup".into();
        let mut lunch = instance(2, 0, 60_000);
        lunch.title = "Lunch".into();

        let include = FilterCriteria {
            title_keywords: vec!["standup".into()],
            title_match_mode: TitleMatchMode::Include,
            ..Default::default()
        };
        assert!(include.matches(&standup));
        assert!(!include.matches(&lunch));

        let exclude = FilterCriteria {
            title_keywords: vec!["standup".into()],
            title_match_mode: TitleMatchMode::Exclude,
            ..Default::default()
        };
        assert!(!exclude.matches(&standup));
        assert!(exclude.matches(&lunch));
    }

    #[test]
    fn test_calendar_selection_empty_means_all() {
        let ev = instance(1, 0, 60_000);
        assert!(FilterCriteria::default().matches(&ev));
        let other = FilterCriteria {
            calendar_ids: vec![7],
            ..Default::default()
        };
        assert!(!other.matches(&ev));
    }

    /// Fixed in-memory source, the shape a provider adapter takes.
    struct FixedSource(Vec<EventInstance>);

    impl CalendarSource for FixedSource {
        fn instances_in_range(
            &self,
            begin: DateTime<Utc>,
            end: DateTime<Utc>,
            criteria: &FilterCriteria,
        ) -> crate::error::Result<Vec<EventInstance>> {
            let hits = self.0.iter().filter(|i| i.overlaps(begin, end)).cloned();
            Ok(apply_filters(hits.collect(), criteria))
        }

        fn next_instance_after(
            &self,
            now: DateTime<Utc>,
            criteria: &FilterCriteria,
        ) -> crate::error::Result<Option<EventInstance>> {
            Ok(self
                .0
                .iter()
                .filter(|i| i.begin > now && criteria.matches(i))
                .min_by_key(|i| i.begin)
                .cloned())
        }
    }

    #[test]
    fn test_source_contract_filters_before_returning() {
        let mut free = instance(1, 1000, 30 * 60_000);
        free.busy = false;
        let busy = instance(2, 2000, 30 * 60_000);
        let later = instance(3, 90 * 60_000, 120 * 60_000);
        let source = FixedSource(vec![free, busy.clone(), later.clone()]);
        let criteria = FilterCriteria {
            busy_only: true,
            ..Default::default()
        };

        let in_range = source
            .instances_in_range(ts(0), ts(60 * 60_000), &criteria)
            .unwrap();
        assert_eq!(in_range, vec![busy]);

        let next = source.next_instance_after(ts(60 * 60_000), &criteria).unwrap();
        assert_eq!(next, Some(later));
    }
}
