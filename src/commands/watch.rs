use anyhow::Result;
use tokio::time::sleep;
use tracing::{info, warn};

use calsel_core::config::CalselConfig;

use crate::commands;
use crate::watch::{self, Recovery};

/// Keep a sync session alive until interrupted. A lost service channel
/// tears the whole session down and rebuilds it after a short delay;
/// that rebuild is the recovery mechanism, not a failure mode.
pub async fn run(config: &CalselConfig, host: Option<String>) -> Result<()> {
    loop {
        let mut session = match commands::open_session(config, host.clone()).await {
            Ok(session) => session,
            Err(e) => {
                warn!("could not open session ({e}), retrying");
                sleep(config.watch.recovery_delay()).await;
                continue;
            }
        };

        watch::wait_for_ready(&session, &config.watch).await;

        let document = session.load_groups().await;
        info!(presets = document.preset_names().len(), "session ready");

        match watch::run(&mut session, &config.watch).await {
            Recovery::RestartSession => {
                sleep(config.watch.recovery_delay()).await;
            }
        }
    }
}
