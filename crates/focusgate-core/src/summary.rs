//! Per-invocation diagnostic summary.
//!
//! One line per engine run: trigger, resolved window, decision, next
//! boundary. Event titles never appear in the clear; only a short
//! non-reversible fingerprint, so calendar content cannot leak through logs.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::engine::Decision;
use crate::engine::TriggerReason;
use crate::planner::SchedulePlan;
use crate::resolver::EffectiveWindow;
use crate::window::MeetingWindow;

/// Short non-reversible fingerprint of an event title.
pub fn title_fingerprint(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    hex::encode(&digest[..4])
}

fn fmt_instant(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.to_rfc3339(),
        None => "-".into(),
    }
}

/// Build the one-line summary for a completed invocation.
pub fn summary_line(
    trigger: TriggerReason,
    now: DateTime<Utc>,
    meeting: Option<&MeetingWindow>,
    window: &EffectiveWindow,
    decision: &Decision,
    plan: &SchedulePlan,
) -> String {
    let action = if decision.enable_dnd {
        "enable"
    } else if decision.disable_dnd {
        "disable"
    } else {
        "hold"
    };
    let notify = decision
        .notification
        .map(|n| n.to_string())
        .unwrap_or_else(|| "none".into());
    let events = meeting
        .map(|m| {
            m.instances
                .iter()
                .map(|i| title_fingerprint(&i.title))
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default();

    format!(
        "invocation={} trigger={} now={} window={}..{} active={} action={} notify={} boundary={} events=[{}]",
        Uuid::new_v4(),
        trigger,
        now.to_rfc3339(),
        fmt_instant(window.start),
        fmt_instant(window.end),
        window.is_active,
        action,
        notify,
        fmt_instant(plan.next_boundary),
        events,
    )
}
