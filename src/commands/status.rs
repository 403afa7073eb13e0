use anyhow::Result;
use owo_colors::OwoColorize;

use calsel_core::GroupDocument;

use crate::client::GroupsTransport;
use crate::commands::Session;
use crate::manager::CalendarManager;

/// Compare the host's in-memory presets with what the service holds.
/// A mismatch usually means an unsaved change or a lost host state.
pub async fn run(session: &Session) -> Result<()> {
    let in_memory = session.manager().export_groups().await?.preset_names();
    let held = GroupDocument::from_value(&session.transport().get_groups().await?).preset_names();

    println!("Host presets:    {}", in_memory.len());
    println!("Service presets: {}", held.len());

    if in_memory == held {
        println!("{}", "In sync".green());
    } else {
        let unsaved: Vec<_> = in_memory.iter().filter(|n| !held.contains(n)).collect();
        let missing: Vec<_> = held.iter().filter(|n| !in_memory.contains(n)).collect();

        if !unsaved.is_empty() {
            println!("{} {:?}", "Only on host (unsaved):".yellow(), unsaved);
        }
        if !missing.is_empty() {
            println!("{} {:?}", "Only on service:".yellow(), missing);
        }
    }

    Ok(())
}
