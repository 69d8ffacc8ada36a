//! Property tests for the window merger.

use chrono::{DateTime, Utc};
use focusgate_core::{find_active_window, merge_into_windows, EventInstance};
use proptest::prelude::*;

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

fn arb_instances() -> impl Strategy<Value = Vec<EventInstance>> {
    prop::collection::vec((0i64..10_000, 1i64..2_000), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (begin, len))| instance(i as i64, begin, begin + len))
            .collect()
    })
}

proptest! {
    #[test]
    fn merged_windows_are_disjoint_ordered_and_cover_everything(instances in arb_instances()) {
        let windows = merge_into_windows(&instances);

        // Chronological and strictly disjoint (a gap between windows).
        for pair in windows.windows(2) {
            prop_assert!(pair[0].end < pair[1].begin);
        }

        // Every instance lands in exactly one window, inside its bounds.
        let total: usize = windows.iter().map(|w| w.instances.len()).sum();
        prop_assert_eq!(total, instances.len());
        for window in &windows {
            prop_assert!(!window.instances.is_empty());
            for i in &window.instances {
                prop_assert!(i.begin >= window.begin && i.end <= window.end);
            }
            prop_assert_eq!(window.begin, window.instances.iter().map(|i| i.begin).min().unwrap());
            prop_assert_eq!(window.end, window.instances.iter().map(|i| i.end).max().unwrap());
        }
    }

    #[test]
    fn active_window_contains_now_and_matches_partition(
        instances in arb_instances(),
        now in 0i64..12_000,
    ) {
        let now = ts(now);
        let active = find_active_window(&instances, now);
        let any_running = instances.iter().any(|i| i.is_running_at(now));
        prop_assert_eq!(active.is_some(), any_running);

        if let Some(window) = active {
            prop_assert!(window.contains(now));
            // The fixed-point merge agrees with the sweep partition.
            let windows = merge_into_windows(&instances);
            let hosting = windows.iter().find(|w| w.contains(now)).unwrap();
            prop_assert_eq!(window.begin, hosting.begin);
            prop_assert_eq!(window.end, hosting.end);
        }
    }
}
