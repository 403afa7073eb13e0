pub mod clear;
pub mod enable;
pub mod export;
pub mod import;
pub mod presets;
pub mod restore;
pub mod save;
pub mod status;
pub mod watch;

use anyhow::{Context, Result};

use calsel_core::config::CalselConfig;
use calsel_core::host::HostBridge;

use crate::client::ServiceClient;
use crate::notify::TerminalNotifier;
use crate::sync::SyncSession;

pub type Session = SyncSession<HostBridge, ServiceClient>;

/// Resolve the host bridge and connect to the persistence service
/// (starting it when necessary).
pub async fn open_session(config: &CalselConfig, host: Option<String>) -> Result<Session> {
    let name = host.or_else(|| config.host.clone()).context(
        "No host bridge configured.\n\n\
        Set `host` in ~/.config/calsel/config.toml or pass --host.\n\n\
        Example:\n  \
        calsel --host gcal presets list",
    )?;

    let bridge = HostBridge::from_name(&name);
    let client = ServiceClient::connect(config.port).await?;

    Ok(SyncSession::new(bridge, client, Box::new(TerminalNotifier)))
}

/// Persist the host's current groups, mapping a rejected save to a
/// non-zero exit. The session has already told the user what happened.
pub(crate) async fn persist(session: &mut Session) -> Result<()> {
    if session.store_groups().await {
        Ok(())
    } else {
        anyhow::bail!("presets were not persisted")
    }
}
