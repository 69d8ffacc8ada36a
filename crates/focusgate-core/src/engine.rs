//! The automation decision engine.
//!
//! A pure function from one snapshot of calendar data, persisted runtime
//! state, and system capabilities to: the actuator action to take, the state
//! mutations to persist, the next wake-up plan, and the notification to show.
//! The engine performs no I/O; the caller reads the snapshot, invokes
//! [`evaluate`], applies the actuator directive exactly once, and persists
//! every mutation, ideally in one transaction.
//!
//! Rules are evaluated in a fixed order, first match wins:
//! 1. automation disabled (with the manual one-off event as the exception)
//! 2. missing permissions
//! 3. active window, not suppressed
//! 4. active window, suppressed
//! 5. no active window

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{EventInstance, FilterCriteria};
use crate::override_watch::{detect_override, DndMode};
use crate::planner::{plan_next_schedule, SchedulePlan};
use crate::resolver::{resolve_window, EffectiveWindow};
use crate::skip::{filter_out_skipped, is_skipped, new_event_before_skip, should_clear_skip, SkippedEvent};
use crate::summary::summary_line;
use crate::window::find_active_window;

/// How long after a recorded window end (plus offset) the overrun prompt may
/// still fire. Policy constant, not derived from data.
pub const OVERRUN_PROMPT_WINDOW_MS: i64 = 5 * 60 * 1000;
/// Minimum gap to the next meeting for an overrun prompt to make sense; if
/// another meeting starts sooner, the prompt is noise.
pub const OVERRUN_MIN_GAP_MS: i64 = 15 * 60 * 1000;

/// Why the engine was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    /// A previously planned boundary alarm fired.
    Alarm,
    /// The calendar store reported a change.
    CalendarChanged,
    /// Device or service boot.
    Boot,
    /// The user toggled automation or changed settings.
    UserToggle,
    /// Periodic sanity check.
    PeriodicCheck,
    /// Configuration was edited.
    SettingsChanged,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TriggerReason::Alarm => "alarm",
            TriggerReason::CalendarChanged => "calendar_changed",
            TriggerReason::Boot => "boot",
            TriggerReason::UserToggle => "user_toggle",
            TriggerReason::PeriodicCheck => "periodic_check",
            TriggerReason::SettingsChanged => "settings_changed",
        };
        write!(f, "{s}")
    }
}

/// User configuration consumed by the engine. All of it arrives as explicit
/// input; the engine never reads ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_true")]
    pub automation_enabled: bool,
    /// Signed offset applied to the meeting start, in minutes. Negative
    /// activates do-not-disturb before the meeting begins.
    #[serde(default)]
    pub start_offset_minutes: i64,
    /// Filter mode the automation sets on the actuator.
    #[serde(default)]
    pub target_mode: DndMode,
    #[serde(default = "default_true")]
    pub notify_degraded: bool,
    #[serde(default = "default_true")]
    pub notify_overrun: bool,
    #[serde(default = "default_true")]
    pub notify_new_event: bool,
    // Kept last so TOML emits scalars before the nested table.
    #[serde(default)]
    pub filter: FilterCriteria,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            automation_enabled: true,
            start_offset_minutes: 0,
            target_mode: DndMode::default(),
            notify_degraded: true,
            notify_overrun: true,
            notify_new_event: true,
            filter: FilterCriteria::default(),
        }
    }
}

/// A user-entered one-off event window, honored even while calendar
/// automation is switched off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEvent {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Runtime state persisted between invocations. This is the engine's only
/// memory; every invocation recomputes everything else from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuntimeState {
    /// The engine believes it currently owns the actuator.
    #[serde(default)]
    pub owns_actuator: bool,
    /// End of the window the engine last enabled for; kept briefly after the
    /// window closes so the overrun prompt can still fire.
    #[serde(default)]
    pub active_window_end: Option<DateTime<Utc>>,
    /// User suppression: automation keeps its hands off until this instant.
    #[serde(default)]
    pub suppressed_until: Option<DateTime<Utc>>,
    /// Manual override: treat `[now, until)` as an active window.
    #[serde(default)]
    pub manual_override_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manual_event: Option<ManualEvent>,
    /// Mode the engine last set on the actuator.
    #[serde(default)]
    pub last_set_mode: Option<DndMode>,
    #[serde(default)]
    pub skipped_event: Option<SkippedEvent>,
    #[serde(default)]
    pub notified_degraded: bool,
    #[serde(default)]
    pub notified_setup: bool,
}

/// Observed system capabilities and actuator state at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub calendar_access: bool,
    pub actuator_access: bool,
    pub precise_timers: bool,
    pub actuator_on: bool,
    pub actuator_mode: DndMode,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            calendar_access: true,
            actuator_access: true,
            precise_timers: true,
            actuator_on: false,
            actuator_mode: DndMode::Off,
        }
    }
}

/// Calendar data for this invocation, already filtered by the provider
/// (see [`crate::calendar::apply_filters`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarSnapshot {
    #[serde(default)]
    pub instances: Vec<EventInstance>,
    /// Earliest instance beginning strictly after `now`.
    #[serde(default)]
    pub next_instance: Option<EventInstance>,
}

/// Immutable input snapshot for one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInput {
    pub trigger: TriggerReason,
    pub now: DateTime<Utc>,
    pub config: EngineConfig,
    pub state: RuntimeState,
    pub system: Capabilities,
    pub calendar: CalendarSnapshot,
}

/// User notification the caller must surface, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// Calendar read or actuator control permission is missing.
    SetupRequired,
    /// Automation works but only with imprecise timers.
    DegradedMode,
    /// A meeting appears to have run over its scheduled end.
    MeetingOverrun,
    /// A new event now begins before the occurrence the user skipped.
    NewEventBeforeSkip,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Notification::SetupRequired => "setup_required",
            Notification::DegradedMode => "degraded_mode",
            Notification::MeetingOverrun => "meeting_overrun",
            Notification::NewEventBeforeSkip => "new_event_before_skip",
        };
        write!(f, "{s}")
    }
}

/// A single optional state mutation: leave the field alone, set it, or clear
/// it. Never conflated with a sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T: Clone> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Apply this patch to an optional slot.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = Some(value.clone()),
            Patch::Clear => *slot = None,
        }
    }
}

/// The set of runtime-state mutations a decision asks the caller to persist.
/// `None` / `Patch::Keep` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateMutations {
    pub owns_actuator: Option<bool>,
    pub active_window_end: Patch<DateTime<Utc>>,
    pub suppressed_until: Patch<DateTime<Utc>>,
    pub manual_override_until: Patch<DateTime<Utc>>,
    pub manual_event: Patch<ManualEvent>,
    pub last_set_mode: Patch<DndMode>,
    pub skipped_event: Patch<SkippedEvent>,
    pub notified_degraded: Option<bool>,
    pub notified_setup: Option<bool>,
}

impl StateMutations {
    pub fn is_empty(&self) -> bool {
        self.owns_actuator.is_none()
            && self.active_window_end.is_keep()
            && self.suppressed_until.is_keep()
            && self.manual_override_until.is_keep()
            && self.manual_event.is_keep()
            && self.last_set_mode.is_keep()
            && self.skipped_event.is_keep()
            && self.notified_degraded.is_none()
            && self.notified_setup.is_none()
    }

    /// Apply every non-keep field to `state`.
    pub fn apply(&self, state: &mut RuntimeState) {
        if let Some(owns) = self.owns_actuator {
            state.owns_actuator = owns;
        }
        self.active_window_end.apply_to(&mut state.active_window_end);
        self.suppressed_until.apply_to(&mut state.suppressed_until);
        self.manual_override_until
            .apply_to(&mut state.manual_override_until);
        self.manual_event.apply_to(&mut state.manual_event);
        self.last_set_mode.apply_to(&mut state.last_set_mode);
        self.skipped_event.apply_to(&mut state.skipped_event);
        if let Some(v) = self.notified_degraded {
            state.notified_degraded = v;
        }
        if let Some(v) = self.notified_setup {
            state.notified_setup = v;
        }
    }
}

/// The engine's output contract for the actuator and the state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Decision {
    /// Turn the actuator on in the configured mode. Never set together with
    /// `disable_dnd`.
    pub enable_dnd: bool,
    pub disable_dnd: bool,
    pub mutations: StateMutations,
    pub notification: Option<Notification>,
}

/// Everything one invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub schedule: SchedulePlan,
    /// One diagnostic line; event titles appear only as fingerprints.
    pub summary: String,
}

/// Run the decision engine over one input snapshot.
pub fn evaluate(input: &EngineInput) -> Evaluation {
    let now = input.now;
    let state = &input.state;
    let cfg = &input.config;
    let sys = &input.system;

    let mut decision = Decision::default();

    let skip = state.skipped_event.as_ref();
    let visible = filter_out_skipped(&input.calendar.instances, skip, now);
    let next_instance = input
        .calendar
        .next_instance
        .as_ref()
        .filter(|i| !is_skipped(i, skip, now));

    let active_meeting = find_active_window(&visible, now);
    let mut window = resolve_window(
        now,
        active_meeting.as_ref(),
        next_instance,
        cfg.start_offset_minutes,
        state.manual_override_until,
    );

    if !cfg.automation_enabled {
        window = rule_automation_off(input, &mut decision, next_instance);
    } else if !sys.calendar_access || !sys.actuator_access {
        rule_missing_permissions(input, &mut decision);
        // Leave stored boundary scheduling untouched until setup is fixed.
        window = EffectiveWindow::empty();
    } else if window.is_active {
        let override_detected = detect_override(
            state.owns_actuator,
            window.is_active,
            sys.actuator_on,
            cfg.target_mode,
            state.last_set_mode,
            sys.actuator_mode,
        );
        let explicitly_suppressed = state.suppressed_until.is_some_and(|until| now < until);

        if explicitly_suppressed || override_detected {
            rule_active_suppressed(input, &window, next_instance, override_detected, &mut decision);
        } else {
            rule_active(input, &window, next_instance, &mut decision);
        }
    } else {
        rule_inactive(input, &window, next_instance, &mut decision);
    }

    finish_housekeeping(input, &mut decision);

    let schedule = plan_next_schedule(now, &window, sys.precise_timers);
    let summary = summary_line(
        input.trigger,
        now,
        active_meeting.as_ref(),
        &window,
        &decision,
        &schedule,
    );
    debug!(target: "focusgate::engine", "{summary}");

    Evaluation {
        decision,
        schedule,
        summary,
    }
}

/// Rule 1: automation disabled. A manual one-off event is the exception and
/// runs through the normal active/inactive handling with its own window.
fn rule_automation_off(
    input: &EngineInput,
    decision: &mut Decision,
    next_instance: Option<&EventInstance>,
) -> EffectiveWindow {
    let now = input.now;
    match &input.state.manual_event {
        Some(event) if now < event.end => {
            let is_active = event.begin <= now;
            let window = EffectiveWindow {
                start: Some(event.begin),
                end: Some(event.end),
                is_active,
                next_start: if is_active { None } else { Some(event.begin) },
            };
            if is_active {
                rule_active(input, &window, next_instance, decision);
            } else {
                rule_inactive(input, &window, next_instance, decision);
            }
            window
        }
        Some(_) => {
            decision.mutations.manual_event = Patch::Clear;
            relinquish(&input.state, decision);
            EffectiveWindow::empty()
        }
        None => {
            relinquish(&input.state, decision);
            EffectiveWindow::empty()
        }
    }
}

/// Rule 2: missing permissions. Never touch the actuator; tell the user once.
fn rule_missing_permissions(input: &EngineInput, decision: &mut Decision) {
    if !input.state.notified_setup {
        decision.notification = Some(Notification::SetupRequired);
        decision.mutations.notified_setup = Some(true);
    }
}

/// Rule 3: active window, not suppressed. Take (or keep) ownership.
fn rule_active(
    input: &EngineInput,
    window: &EffectiveWindow,
    next_instance: Option<&EventInstance>,
    decision: &mut Decision,
) {
    let now = input.now;
    let state = &input.state;
    let cfg = &input.config;
    let sys = &input.system;

    let in_expected_state = sys.actuator_on && sys.actuator_mode == cfg.target_mode;
    if !in_expected_state {
        decision.enable_dnd = true;
    }
    if !state.owns_actuator {
        decision.mutations.owns_actuator = Some(true);
    }
    if state.last_set_mode != Some(cfg.target_mode) {
        decision.mutations.last_set_mode = Patch::Set(cfg.target_mode);
    }
    if let Some(end) = window.end {
        if state.active_window_end != Some(end) {
            decision.mutations.active_window_end = Patch::Set(end);
        }
    }
    if state.manual_override_until.is_some_and(|until| until <= now) {
        decision.mutations.manual_override_until = Patch::Clear;
    }

    if overrun_due(input, next_instance) {
        decision.notification = Some(Notification::MeetingOverrun);
    } else if !sys.precise_timers && cfg.notify_degraded && !state.notified_degraded {
        decision.notification = Some(Notification::DegradedMode);
        decision.mutations.notified_degraded = Some(true);
    }
}

/// Rule 4: active window, suppressed. Hands off; a freshly detected override
/// installs a suppression through the window's end and drops ownership.
fn rule_active_suppressed(
    input: &EngineInput,
    window: &EffectiveWindow,
    next_instance: Option<&EventInstance>,
    override_detected: bool,
    decision: &mut Decision,
) {
    if override_detected {
        if let Some(end) = window.end {
            decision.mutations.suppressed_until = Patch::Set(end);
        }
        if input.state.owns_actuator {
            decision.mutations.owns_actuator = Some(false);
        }
        decision.mutations.last_set_mode = Patch::Clear;
    }
    if overrun_due(input, next_instance) {
        decision.notification = Some(Notification::MeetingOverrun);
    }
}

/// Rule 5: no active window. Relinquish, keep the recorded window end just
/// long enough for overrun detection, and pick the highest-priority
/// notification.
fn rule_inactive(
    input: &EngineInput,
    window: &EffectiveWindow,
    next_instance: Option<&EventInstance>,
    decision: &mut Decision,
) {
    let now = input.now;
    let state = &input.state;
    let cfg = &input.config;
    let sys = &input.system;

    relinquish(state, decision);

    if let Some(end) = state.active_window_end {
        let boundary = end + Duration::minutes(cfg.start_offset_minutes);
        if now >= boundary + Duration::milliseconds(OVERRUN_PROMPT_WINDOW_MS) {
            decision.mutations.active_window_end = Patch::Clear;
        }
    }

    let suppression_active = state.suppressed_until.is_some_and(|until| now < until)
        || state
            .skipped_event
            .as_ref()
            .is_some_and(|s| !s.is_expired(now));

    if cfg.notify_new_event
        && suppression_active
        && new_event_before_skip(next_instance, state.skipped_event.as_ref(), now)
    {
        decision.notification = Some(Notification::NewEventBeforeSkip);
        if let Some(skip) = &state.skipped_event {
            let mut marked = skip.clone();
            marked.notified_new_event = true;
            decision.mutations.skipped_event = Patch::Set(marked);
        }
    } else if overrun_due(input, next_instance) {
        decision.notification = Some(Notification::MeetingOverrun);
    } else if window.next_start.is_some()
        && !sys.precise_timers
        && cfg.notify_degraded
        && !state.notified_degraded
    {
        decision.notification = Some(Notification::DegradedMode);
        decision.mutations.notified_degraded = Some(true);
    }
}

/// Give the actuator back: disable only if we previously owned it.
fn relinquish(state: &RuntimeState, decision: &mut Decision) {
    if state.owns_actuator {
        decision.disable_dnd = true;
        decision.mutations.owns_actuator = Some(false);
        decision.mutations.last_set_mode = Patch::Clear;
    }
}

/// Whether the meeting-overrun prompt is due: shortly after the recorded
/// window end (plus offset), with no other meeting about to start.
fn overrun_due(input: &EngineInput, next_instance: Option<&EventInstance>) -> bool {
    let cfg = &input.config;
    if !cfg.notify_overrun {
        return false;
    }
    let Some(end) = input.state.active_window_end else {
        return false;
    };
    let now = input.now;
    let boundary = end + Duration::minutes(cfg.start_offset_minutes);
    if now < boundary || now >= boundary + Duration::milliseconds(OVERRUN_PROMPT_WINDOW_MS) {
        return false;
    }
    match next_instance {
        Some(next) => next.begin - now > Duration::milliseconds(OVERRUN_MIN_GAP_MS),
        None => true,
    }
}

/// Unconditional cleanup, regardless of which rule fired: expired
/// suppressions and skips cannot outlive their own deadlines, and one-shot
/// notification flags reset once their cause is gone.
fn finish_housekeeping(input: &EngineInput, decision: &mut Decision) {
    let now = input.now;
    let state = &input.state;
    let sys = &input.system;

    if state.suppressed_until.is_some_and(|until| until <= now) {
        decision.mutations.suppressed_until = Patch::Clear;
        decision.mutations.skipped_event = Patch::Clear;
    }
    if should_clear_skip(state.skipped_event.as_ref(), now) {
        decision.mutations.skipped_event = Patch::Clear;
    }
    if state.notified_setup && sys.calendar_access && sys.actuator_access {
        decision.mutations.notified_setup = Some(false);
    }
    if state.notified_degraded && sys.precise_timers {
        decision.mutations.notified_degraded = Some(false);
    }
}
