use chrono::{DateTime, Utc};
use clap::Subcommand;

use focusgate_core::engine::{Patch, StateMutations};
use focusgate_core::{SkippedEvent, StateStore};

#[derive(Subcommand)]
pub enum SkipAction {
    /// Skip one event occurrence
    Set {
        /// Event id of the occurrence
        #[arg(long)]
        event_id: i64,
        /// Occurrence begin time (RFC 3339)
        #[arg(long)]
        begin: String,
        /// Occurrence end time (RFC 3339)
        #[arg(long)]
        end: String,
    },
    /// Drop the current skip
    Clear,
    /// Print the current skip as JSON
    Show,
}

pub fn run(action: SkipAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = StateStore::open()?;
    match action {
        SkipAction::Set {
            event_id,
            begin,
            end,
        } => {
            let begin: DateTime<Utc> = begin.parse()?;
            let end: DateTime<Utc> = end.parse()?;
            if end <= begin {
                return Err(format!("end ({end}) must be after begin ({begin})").into());
            }
            let skip = SkippedEvent {
                event_id,
                begin,
                end,
                notified_new_event: false,
            };
            store.apply(&StateMutations {
                skipped_event: Patch::Set(skip),
                ..Default::default()
            })?;
            eprintln!("Skip recorded for event {event_id} at {begin}");
        }
        SkipAction::Clear => {
            store.apply(&StateMutations {
                skipped_event: Patch::Clear,
                ..Default::default()
            })?;
            eprintln!("Skip cleared");
        }
        SkipAction::Show => {
            let state = store.load()?;
            println!("{}", serde_json::to_string_pretty(&state.skipped_event)?);
        }
    }
    Ok(())
}
