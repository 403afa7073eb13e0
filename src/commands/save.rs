use anyhow::Result;

use crate::commands::{self, Session};
use crate::manager::CalendarManager;

pub async fn run(session: &mut Session, name: &str) -> Result<()> {
    session.manager().save_selections(Some(name)).await?;
    commands::persist(session).await
}
