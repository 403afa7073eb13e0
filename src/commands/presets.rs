use anyhow::Result;
use owo_colors::OwoColorize;

use calsel_core::document::AUTOSAVE_PREFIX;

use crate::commands::{self, Session};
use crate::manager::CalendarManager;

pub async fn list(session: &Session) -> Result<()> {
    let document = session.manager().export_groups().await?;
    let names = document.preset_names();

    if names.is_empty() {
        println!("No presets available");
        return Ok(());
    }

    for name in names {
        if name.starts_with(AUTOSAVE_PREFIX) {
            println!("{}", name.dimmed());
        } else {
            println!("{name}");
        }
    }

    Ok(())
}

/// Autosave the current selection, then apply the named preset.
pub async fn select(session: &mut Session, name: &str) -> Result<()> {
    session.manager().save_selections(None).await?;
    session.manager().show_group(name).await?;
    commands::persist(session).await
}

pub async fn delete(session: &mut Session, name: &str) -> Result<()> {
    session.manager().delete_group(name).await?;
    commands::persist(session).await
}
