use anyhow::Result;

use crate::commands::Session;
use crate::manager::CalendarManager;

pub async fn run(session: &Session, pattern: &str) -> Result<()> {
    session.manager().enable_calendar(pattern).await?;
    println!("Enabled calendars matching '{pattern}'");
    Ok(())
}
