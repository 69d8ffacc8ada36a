//! Manual override detection.
//!
//! The engine owns the do-not-disturb actuator only as long as the user
//! leaves it alone. Observing the actuator off, or in a different filter mode
//! than the engine last set, while a window is active means the user defeated
//! the automation and the engine must back off.

use serde::{Deserialize, Serialize};

/// Do-not-disturb filter level of the platform actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DndMode {
    Off,
    #[default]
    PriorityOnly,
    AlarmsOnly,
    TotalSilence,
}

impl std::fmt::Display for DndMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DndMode::Off => write!(f, "off"),
            DndMode::PriorityOnly => write!(f, "priority_only"),
            DndMode::AlarmsOnly => write!(f, "alarms_only"),
            DndMode::TotalSilence => write!(f, "total_silence"),
        }
    }
}

/// Decide whether the user manually defeated the automation.
///
/// Only possible while the engine owns the actuator inside an active window.
/// Two signals count: the actuator observed off, or the mode changed away
/// from the expected one after the engine had set it there.
pub fn detect_override(
    owns_actuator: bool,
    window_active: bool,
    actuator_on: bool,
    expected_mode: DndMode,
    last_known_mode: Option<DndMode>,
    current_mode: DndMode,
) -> bool {
    if !owns_actuator || !window_active {
        return false;
    }
    if !actuator_on {
        return true;
    }
    last_known_mode == Some(expected_mode) && current_mode != expected_mode
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_override_without_ownership() {
        assert!(!detect_override(
            false,
            true,
            false,
            DndMode::PriorityOnly,
            Some(DndMode::PriorityOnly),
            DndMode::Off,
        ));
    }

    #[test]
    fn test_no_override_outside_active_window() {
        assert!(!detect_override(
            true,
            false,
            false,
            DndMode::PriorityOnly,
            Some(DndMode::PriorityOnly),
            DndMode::Off,
        ));
    }

    #[test]
    fn test_actuator_turned_off_is_override() {
        assert!(detect_override(
            true,
            true,
            false,
            DndMode::PriorityOnly,
            Some(DndMode::PriorityOnly),
            DndMode::PriorityOnly,
        ));
    }

    #[test]
    fn test_mode_change_is_override() {
        assert!(detect_override(
            true,
            true,
            true,
            DndMode::PriorityOnly,
            Some(DndMode::PriorityOnly),
            DndMode::AlarmsOnly,
        ));
    }

    #[test]
    fn test_mode_change_not_ours_is_not_override() {
        // Engine never recorded setting the expected mode, so a differing
        // observation proves nothing about the user.
        assert!(!detect_override(
            true,
            true,
            true,
            DndMode::PriorityOnly,
            None,
            DndMode::AlarmsOnly,
        ));
    }

    #[test]
    fn test_expected_mode_observed_is_not_override() {
        assert!(!detect_override(
            true,
            true,
            true,
            DndMode::PriorityOnly,
            Some(DndMode::PriorityOnly),
            DndMode::PriorityOnly,
        ));
    }
}
