use chrono::{DateTime, Utc};

use focusgate_core::{find_active_window, merge_into_windows, EventInstance};

pub fn run(events_path: &str, at: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(events_path)?;
    let instances: Vec<EventInstance> = serde_json::from_str(&text)?;

    let windows = merge_into_windows(&instances);
    println!("{}", serde_json::to_string_pretty(&windows)?);

    if let Some(at) = at {
        let now: DateTime<Utc> = at.parse()?;
        match find_active_window(&instances, now) {
            Some(window) => eprintln!(
                "active at {}: [{} .. {}) with {} instance(s)",
                now.to_rfc3339(),
                window.begin.to_rfc3339(),
                window.end.to_rfc3339(),
                window.instances.len()
            ),
            None => eprintln!("no active window at {}", now.to_rfc3339()),
        }
    }
    Ok(())
}
