//! Wake-up scheduling.
//!
//! Computes when the engine must run next: the end of the active window, or
//! the start of the upcoming one. When the platform cannot provide exact
//! alarms, a near-term boundary additionally gets a pair of coarse "guard"
//! wake-ups bracketing it, bounding the drift of inexact timer mechanisms.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::resolver::EffectiveWindow;

/// Boundaries further out than this never get guards; a later invocation
/// will re-plan once the boundary comes near.
pub const NEAR_TERM_HORIZON_MS: i64 = 60 * 60 * 1000;
/// Distance of each guard wake-up from the boundary.
pub const GUARD_SPREAD_MS: i64 = 2 * 60 * 1000;
/// A guard never fires sooner than this after planning.
pub const MIN_GUARD_LEAD_MS: i64 = 10 * 1000;

/// When the engine should be invoked next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SchedulePlan {
    pub next_boundary: Option<DateTime<Utc>>,
    pub needs_near_term_guards: bool,
    pub guard_before: Option<DateTime<Utc>>,
    pub guard_after: Option<DateTime<Utc>>,
}

impl SchedulePlan {
    /// No boundary, nothing to schedule.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Plan the next wake-up for the given effective window.
pub fn plan_next_schedule(
    now: DateTime<Utc>,
    window: &EffectiveWindow,
    has_precise_timers: bool,
) -> SchedulePlan {
    let boundary = if window.is_active {
        window.end
    } else {
        window.next_start
    };
    let Some(boundary) = boundary else {
        return SchedulePlan::empty();
    };

    let until = (boundary - now).num_milliseconds();
    let near_term = (1..=NEAR_TERM_HORIZON_MS).contains(&until);

    if has_precise_timers || !near_term {
        return SchedulePlan {
            next_boundary: Some(boundary),
            ..SchedulePlan::empty()
        };
    }

    let earliest = now + Duration::milliseconds(MIN_GUARD_LEAD_MS);
    let before = boundary - Duration::milliseconds(GUARD_SPREAD_MS);
    SchedulePlan {
        next_boundary: Some(boundary),
        needs_near_term_guards: true,
        guard_before: Some(earliest.max(before)),
        guard_after: Some(boundary + Duration::milliseconds(GUARD_SPREAD_MS)),
    }
}
