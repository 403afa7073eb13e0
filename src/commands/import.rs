use std::io::Read;
use std::path::Path;

use anyhow::Result;

use calsel_core::{CalselError, GroupDocument};

use crate::commands::{self, Session};
use crate::manager::CalendarManager;

/// Install presets from a JSON export. Invalid JSON aborts with no state
/// change; legacy exports without a version marker are migrated by the
/// save path.
pub async fn run(session: &mut Session, file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            let error = CalselError::InvalidImport(e.to_string());
            session.notify(&format!("Error importing presets: {error}"));
            return Err(error.into());
        }
    };

    let document = GroupDocument::from_value(&value);
    session.manager().set_groups(&document).await?;
    commands::persist(session).await?;

    session.notify("Presets imported successfully");
    Ok(())
}
