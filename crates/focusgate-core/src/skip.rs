//! One-time event skips.
//!
//! The user can exempt a single event occurrence from automation. A skip
//! matches on exact identity (event id plus begin time, which disambiguates
//! recurrence instances) and expires on its own once the occurrence ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::EventInstance;

/// Persisted identity of a skipped event occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEvent {
    pub event_id: i64,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Set once the user has been told about a new event starting before the
    /// skipped one, so the notice fires at most once per skip.
    #[serde(default)]
    pub notified_new_event: bool,
}

impl SkippedEvent {
    /// A skip stops matching once its occurrence has ended.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }

    /// Exact-identity match: same event id and same begin timestamp.
    pub fn matches(&self, instance: &EventInstance, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
            && self.event_id == instance.event_id
            && self.begin == instance.begin
    }
}

/// Whether `instance` is currently exempted by `skip`.
pub fn is_skipped(
    instance: &EventInstance,
    skip: Option<&SkippedEvent>,
    now: DateTime<Utc>,
) -> bool {
    skip.is_some_and(|s| s.matches(instance, now))
}

/// Drop currently-skipped instances, preserving order.
pub fn filter_out_skipped(
    instances: &[EventInstance],
    skip: Option<&SkippedEvent>,
    now: DateTime<Utc>,
) -> Vec<EventInstance> {
    instances
        .iter()
        .filter(|i| !is_skipped(i, skip, now))
        .cloned()
        .collect()
}

/// Whether the persisted skip has expired and should be dropped.
pub fn should_clear_skip(skip: Option<&SkippedEvent>, now: DateTime<Utc>) -> bool {
    skip.is_some_and(|s| s.is_expired(now))
}

/// Whether a new instance has appeared that begins after `now` but strictly
/// before the skipped event. The user skipped one specific occurrence; a new
/// earlier meeting deserves a one-time heads-up.
pub fn new_event_before_skip(
    next_instance: Option<&EventInstance>,
    skip: Option<&SkippedEvent>,
    now: DateTime<Utc>,
) -> bool {
    let (Some(next), Some(skip)) = (next_instance, skip) else {
        return false;
    };
    if skip.notified_new_event || skip.is_expired(now) {
        return false;
    }
    now < next.begin && next.begin < skip.begin
}
