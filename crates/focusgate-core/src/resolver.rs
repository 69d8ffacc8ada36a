//! Effective automation window resolution.
//!
//! Turns meeting boundaries into the window the automation actually honors:
//! the configured start offset is applied to the meeting start, and a manual
//! override window always wins over calendar data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::EventInstance;
use crate::window::MeetingWindow;

/// The window the automation acts on. `start`/`end` are both present or both
/// absent; an absent pair means there is nothing to automate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EffectiveWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// When the window will become active, if it has not yet.
    pub next_start: Option<DateTime<Utc>>,
}

impl EffectiveWindow {
    /// A window with nothing to automate.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Resolve the effective automation window at `now`.
///
/// Precedence: a manual override still in the future produces `[now,
/// manual_until)`, active, regardless of calendar state. Otherwise boundaries
/// come from the active merged window, falling back to the nearest future
/// instance. An offset that pushes the start past the meeting end makes the
/// window degenerate and it is dropped.
pub fn resolve_window(
    now: DateTime<Utc>,
    active: Option<&MeetingWindow>,
    next_instance: Option<&EventInstance>,
    offset_minutes: i64,
    manual_until: Option<DateTime<Utc>>,
) -> EffectiveWindow {
    if let Some(until) = manual_until {
        if until > now {
            return EffectiveWindow {
                start: Some(now),
                end: Some(until),
                is_active: true,
                next_start: None,
            };
        }
    }

    let (meeting_begin, meeting_end) = match (active, next_instance) {
        (Some(window), _) => (window.begin, window.end),
        (None, Some(instance)) => (instance.begin, instance.end),
        (None, None) => return EffectiveWindow::empty(),
    };

    let dnd_start = meeting_begin + Duration::minutes(offset_minutes);
    if dnd_start >= meeting_end {
        return EffectiveWindow::empty();
    }

    let is_active = dnd_start <= now && now < meeting_end;
    EffectiveWindow {
        start: Some(dnd_start),
        end: Some(meeting_end),
        is_active,
        next_start: if !is_active && dnd_start > now {
            Some(dnd_start)
        } else {
            None
        },
    }
}
