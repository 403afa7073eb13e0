use anyhow::Result;

use crate::commands::{self, Session};
use crate::manager::CalendarManager;

/// Autosave the current selection, then disable every calendar. The
/// autosave is persisted so it survives this session.
pub async fn run(session: &mut Session) -> Result<()> {
    session.manager().save_selections(None).await?;
    session.manager().disable_all().await?;
    commands::persist(session).await
}
