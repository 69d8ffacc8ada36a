use clap::Subcommand;

use focusgate_core::override_watch::DndMode;
use focusgate_core::AppConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Set a configuration value
    Set {
        /// Key (e.g. automation_enabled, start_offset_minutes, target_mode,
        /// busy_only, ignore_all_day, min_duration_minutes)
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", AppConfig::path()?.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = AppConfig::load()?;
            let automation = &mut config.automation;
            match key.as_str() {
                "automation_enabled" => automation.automation_enabled = value.parse()?,
                "start_offset_minutes" => automation.start_offset_minutes = value.parse()?,
                "target_mode" => {
                    automation.target_mode = match value.as_str() {
                        "off" => DndMode::Off,
                        "priority_only" => DndMode::PriorityOnly,
                        "alarms_only" => DndMode::AlarmsOnly,
                        "total_silence" => DndMode::TotalSilence,
                        other => return Err(format!("unknown mode '{other}'").into()),
                    }
                }
                "busy_only" => automation.filter.busy_only = value.parse()?,
                "ignore_all_day" => automation.filter.ignore_all_day = value.parse()?,
                "min_duration_minutes" => automation.filter.min_duration_minutes = value.parse()?,
                "notify_degraded" => automation.notify_degraded = value.parse()?,
                "notify_overrun" => automation.notify_overrun = value.parse()?,
                "notify_new_event" => automation.notify_new_event = value.parse()?,
                "lookahead_hours" => config.query.lookahead_hours = value.parse()?,
                other => return Err(format!("unknown configuration key '{other}'").into()),
            }
            config.save()?;
            eprintln!("Set {key} = {value}");
        }
    }
    Ok(())
}
