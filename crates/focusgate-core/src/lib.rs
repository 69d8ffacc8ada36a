//! # FocusGate Core Library
//!
//! This library provides the core business logic for FocusGate, a
//! calendar-driven do-not-disturb automation service. The heart of the crate
//! is a pure decision engine: given one snapshot of calendar data, persisted
//! runtime state, and system capabilities, it produces the actuator action,
//! the state mutations to persist, the next wake-up plan, and the user
//! notification required, all without performing any I/O of its own.
//!
//! ## Architecture
//!
//! - **Window Merger**: coalesces overlapping or touching event instances
//!   into contiguous busy windows
//! - **Effective-Window Resolver**: applies the start offset and manual
//!   override precedence to produce the window automation acts on
//! - **Decision Engine**: a fixed-order rule evaluation producing a
//!   [`Decision`] and [`SchedulePlan`] per invocation
//! - **Plumbing**: TOML configuration and a SQLite key-value store for the
//!   persisted runtime state, used by callers around the pure core
//!
//! ## Key Components
//!
//! - [`evaluate`]: the engine entry point
//! - [`EngineInput`] / [`Decision`] / [`SchedulePlan`]: the input/output contract
//! - [`StateStore`]: persisted runtime state with transactional mutation apply
//! - [`AppConfig`]: user configuration management

pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod override_watch;
pub mod planner;
pub mod resolver;
pub mod skip;
pub mod state_store;
pub mod summary;
pub mod window;

pub use calendar::{apply_filters, CalendarSource, EventInstance, FilterCriteria, TitleMatchMode};
pub use config::AppConfig;
pub use engine::{
    evaluate, CalendarSnapshot, Capabilities, Decision, EngineConfig, EngineInput, Evaluation,
    ManualEvent, Notification, Patch, RuntimeState, StateMutations, TriggerReason,
};
pub use error::{ConfigError, CoreError, Result, StateStoreError};
pub use override_watch::{detect_override, DndMode};
pub use planner::{plan_next_schedule, SchedulePlan};
pub use resolver::{resolve_window, EffectiveWindow};
pub use skip::{filter_out_skipped, is_skipped, should_clear_skip, SkippedEvent};
pub use state_store::StateStore;
pub use summary::title_fingerprint;
pub use window::{find_active_window, merge_into_windows, MeetingWindow};
