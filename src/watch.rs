//! Periodic health checks for a running sync session.
//!
//! The host application's internal events are not observable from the
//! outside, so the session polls on fixed intervals: host readiness
//! before anything else, then preset loss, in-app navigation, and
//! service-channel liveness. The checks are independent and idempotent;
//! they interleave on one cooperative loop and can race with each other,
//! resolving as last-write-wins.

use tokio::time::{interval, sleep};
use tracing::{debug, warn};

use calsel_core::config::WatchConfig;

use crate::client::GroupsTransport;
use crate::manager::CalendarManager;
use crate::sync::SyncSession;

/// Why the watch loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The messaging channel is gone (service stopped, or replaced from
    /// under us). Tear the session down and rebuild it.
    RestartSession,
}

/// Poll the host until it reports ready. The host becomes available
/// asynchronously after it finishes its own initialization.
pub async fn wait_for_ready<M: CalendarManager, T: GroupsTransport>(
    session: &SyncSession<M, T>,
    config: &WatchConfig,
) {
    loop {
        match session.manager().is_ready().await {
            Ok(true) => return,
            Ok(false) => debug!("host not ready yet"),
            Err(e) => debug!("host not reachable yet: {e}"),
        }
        sleep(config.readiness_poll()).await;
    }
}

/// Run the periodic checks until one of them asks for recovery.
pub async fn run<M: CalendarManager, T: GroupsTransport>(
    session: &mut SyncSession<M, T>,
    config: &WatchConfig,
) -> Recovery {
    let mut liveness = interval(config.liveness());
    let mut group_loss = interval(config.group_loss());
    let mut navigation = interval(config.navigation());

    loop {
        tokio::select! {
            _ = liveness.tick() => {
                if let Err(e) = session.transport().ping().await {
                    warn!("service channel lost ({e}), scheduling session restart");
                    return Recovery::RestartSession;
                }
            }
            _ = group_loss.tick() => {
                session.check_group_loss().await;
            }
            _ = navigation.tick() => {
                session.check_navigation(config.navigation_settle()).await;
            }
        }
    }
}
