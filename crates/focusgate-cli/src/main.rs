use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "focusgate-cli", version, about = "FocusGate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the decision engine over a snapshot
    Evaluate {
        /// Path to the snapshot JSON file, or '-' for stdin
        #[arg(long, default_value = "-")]
        snapshot: String,
        /// Persist the resulting state mutations to the state store
        #[arg(long)]
        apply: bool,
    },
    /// Merge event instances into busy windows
    Windows {
        /// Path to an event instances JSON file
        #[arg(long)]
        events: String,
        /// Also resolve the window active at this instant (RFC 3339)
        #[arg(long)]
        at: Option<String>,
    },
    /// Skipped-event management
    Skip {
        #[command(subcommand)]
        action: commands::skip::SkipAction,
    },
    /// Runtime state management
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Evaluate { snapshot, apply } => commands::evaluate::run(&snapshot, apply),
        Commands::Windows { events, at } => commands::windows::run(&events, at.as_deref()),
        Commands::Skip { action } => commands::skip::run(action),
        Commands::State { action } => commands::state::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
