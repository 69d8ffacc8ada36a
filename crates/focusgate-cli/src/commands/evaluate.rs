use chrono::{DateTime, Utc};
use serde::Deserialize;

use focusgate_core::engine::{CalendarSnapshot, Capabilities, EngineInput, TriggerReason};
use focusgate_core::{evaluate, AppConfig, EngineConfig, RuntimeState, StateStore};

/// Snapshot file format. Config and state default to the persisted ones but
/// can be overridden inline, which keeps snapshots self-contained for
/// debugging and replay.
#[derive(Deserialize)]
struct Snapshot {
    #[serde(default = "default_trigger")]
    trigger: TriggerReason,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
    system: Capabilities,
    #[serde(default)]
    calendar: CalendarSnapshot,
    #[serde(default)]
    config: Option<EngineConfig>,
    #[serde(default)]
    state: Option<RuntimeState>,
}

fn default_trigger() -> TriggerReason {
    TriggerReason::PeriodicCheck
}

fn read_snapshot(path: &str) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let text = if path == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

pub fn run(snapshot_path: &str, apply: bool) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = read_snapshot(snapshot_path)?;

    let mut store = StateStore::open()?;
    let config = match snapshot.config {
        Some(config) => config,
        None => AppConfig::load()?.automation,
    };
    let state = match snapshot.state {
        Some(state) => state,
        None => store.load()?,
    };

    let input = EngineInput {
        trigger: snapshot.trigger,
        now: snapshot.now.unwrap_or_else(Utc::now),
        config,
        state,
        system: snapshot.system,
        calendar: snapshot.calendar,
    };

    let evaluation = evaluate(&input);
    eprintln!("{}", evaluation.summary);

    if apply {
        store.apply(&evaluation.decision.mutations)?;
    }

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}
