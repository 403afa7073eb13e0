use anyhow::Result;

use crate::commands::Session;
use crate::manager::CalendarManager;

pub async fn run(session: &Session) -> Result<()> {
    session.manager().restore_selections().await?;
    println!("Restored the last saved selection");
    Ok(())
}
