//! Meeting window geometry.
//!
//! Merges event instances into contiguous busy windows. Two instances belong
//! to the same window when their intervals overlap or touch; merging is
//! transitive, so a chain of back-to-back meetings forms one window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::EventInstance;

/// A merged busy interval `[begin, end)` plus the instances inside it,
/// ordered by begin time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub instances: Vec<EventInstance>,
}

impl MeetingWindow {
    /// Whether `now` falls inside `[begin, end)`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.begin <= now && now < self.end
    }
}

/// Find the merged window covering `now`, if any instance is running.
///
/// Starts from the instances running at `now` and grows the interval to a
/// fixed point, absorbing any instance that overlaps or touches it. The loop
/// is bounded: each pass either grows the interval past another instance
/// boundary or terminates, so it runs at most `instances.len()` passes.
pub fn find_active_window(instances: &[EventInstance], now: DateTime<Utc>) -> Option<MeetingWindow> {
    let mut begin: Option<DateTime<Utc>> = None;
    let mut end: Option<DateTime<Utc>> = None;
    for instance in instances.iter().filter(|i| i.is_running_at(now)) {
        begin = Some(match begin {
            Some(b) => b.min(instance.begin),
            None => instance.begin,
        });
        end = Some(match end {
            Some(e) => e.max(instance.end),
            None => instance.end,
        });
    }
    let (mut begin, mut end) = (begin?, end?);

    loop {
        let mut grew = false;
        for instance in instances {
            if instance.touches(begin, end) {
                if instance.begin < begin {
                    begin = instance.begin;
                    grew = true;
                }
                if instance.end > end {
                    end = instance.end;
                    grew = true;
                }
            }
        }
        if !grew {
            break;
        }
    }

    let mut contributing: Vec<EventInstance> = instances
        .iter()
        .filter(|i| i.overlaps(begin, end))
        .cloned()
        .collect();
    contributing.sort_by_key(|i| (i.begin, i.end));

    Some(MeetingWindow {
        begin,
        end,
        instances: contributing,
    })
}

/// Partition all instances into disjoint, chronologically ordered windows.
///
/// Sort by begin, then sweep: an instance beginning at or before the current
/// window's end extends it; anything later closes the window and opens a new
/// one. Back-to-back instances merge.
pub fn merge_into_windows(instances: &[EventInstance]) -> Vec<MeetingWindow> {
    let mut sorted: Vec<EventInstance> = instances.to_vec();
    sorted.sort_by_key(|i| (i.begin, i.end));

    let mut windows: Vec<MeetingWindow> = Vec::new();
    for instance in sorted {
        match windows.last_mut() {
            Some(current) if instance.begin <= current.end => {
                current.end = current.end.max(instance.end);
                current.instances.push(instance);
            }
            _ => windows.push(MeetingWindow {
                begin: instance.begin,
                end: instance.end,
                instances: vec![instance],
            }),
        }
    }
    windows
}
