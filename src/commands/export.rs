use anyhow::Result;

use crate::commands::Session;
use crate::manager::CalendarManager;

/// Print the full preset document as a JSON text blob, reserved keys
/// included, so it can be re-imported elsewhere.
pub async fn run(session: &Session) -> Result<()> {
    let document = session.manager().export_groups().await?;
    println!("{}", serde_json::to_string_pretty(&document.to_value())?);
    Ok(())
}
