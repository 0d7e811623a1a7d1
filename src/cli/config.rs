use anyhow::{anyhow, Result};

use crate::AppState;

use super::ConfigAction;

pub fn config_command(state: &AppState, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&state.settings.snapshot())?);
        }
        ConfigAction::SetDuration { minutes } => {
            let secs = minutes
                .checked_mul(60)
                .ok_or_else(|| anyhow!("{minutes} minutes is too large"))?;
            state.settings.update_default_duration(secs)?;
            println!("Default session length set to {minutes} min");
        }
    }
    Ok(())
}
