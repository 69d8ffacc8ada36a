use clap::Subcommand;

use focusgate_core::StateStore;

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the persisted runtime state as JSON
    Show,
    /// Drop all persisted runtime state
    Reset,
}

pub fn run(action: StateAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    match action {
        StateAction::Show => {
            let state = store.load()?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        StateAction::Reset => {
            store.reset()?;
            eprintln!("State reset");
        }
    }
    Ok(())
}
