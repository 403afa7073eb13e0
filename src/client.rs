//! HTTP transport to the calsel background service.
//!
//! The service is the canonical owner of the preset document; this
//! client speaks the message protocol at `POST /message` and starts the
//! service when none is reachable. The trait exists so the sync session
//! can run against an in-process service in tests.

use std::process::Command;
use std::time::Duration;

use serde_json::Value;

use calsel_core::protocol::{Reply, Request};
use calsel_core::{CalselError, CalselResult};

const MAX_START_RETRIES: u32 = 10;
const START_RETRY_DELAY_MS: u64 = 200;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The messaging channel to the persistence service.
pub trait GroupsTransport {
    /// No-op request used to verify the channel is alive.
    async fn ping(&self) -> CalselResult<()>;

    /// Fetch the full preset document.
    async fn get_groups(&self) -> CalselResult<Value>;

    /// Replace the service-held document wholesale. Resolves once the
    /// service has acknowledged the durable write.
    async fn save_groups(&self, document: Value) -> CalselResult<()>;
}

/// HTTP client for calsel-service
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Connect to a running service, or start one and wait for it.
    pub async fn connect(port: u16) -> CalselResult<Self> {
        let client = ServiceClient {
            http: reqwest::Client::new(),
            base_url: format!("http://127.0.0.1:{port}"),
        };

        // Try to reach an existing service
        if client.ping().await.is_ok() {
            return Ok(client);
        }

        // Service not running - start it
        start_service()?;

        // Wait for the service to be ready
        for _ in 0..MAX_START_RETRIES {
            tokio::time::sleep(Duration::from_millis(START_RETRY_DELAY_MS)).await;
            if client.ping().await.is_ok() {
                return Ok(client);
            }
        }

        Err(CalselError::Transport(
            "calsel-service did not come up after starting it".into(),
        ))
    }

    async fn send(&self, request: &Request) -> CalselResult<Reply> {
        let response = self
            .http
            .post(format!("{}/message", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| CalselError::Transport(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| CalselError::Transport(format!("Malformed service reply: {e}")))
    }
}

impl GroupsTransport for ServiceClient {
    async fn ping(&self) -> CalselResult<()> {
        let reply = self.send(&Request::ping()).await?;
        if reply.success {
            Ok(())
        } else {
            Err(CalselError::Service(
                reply.error.unwrap_or_else(|| "ping rejected".into()),
            ))
        }
    }

    async fn get_groups(&self) -> CalselResult<Value> {
        let reply = self.send(&Request::get_groups()).await?;
        match (reply.success, reply.groups) {
            (true, Some(document)) => Ok(document),
            (true, None) => Err(CalselError::Service("reply carried no groups".into())),
            (false, _) => Err(CalselError::Service(
                reply.error.unwrap_or_else(|| "getGroups rejected".into()),
            )),
        }
    }

    async fn save_groups(&self, document: Value) -> CalselResult<()> {
        let reply = self.send(&Request::save_groups(document)).await?;
        if reply.success {
            Ok(())
        } else {
            Err(CalselError::Service(
                reply.error.unwrap_or_else(|| "saveGroups rejected".into()),
            ))
        }
    }
}

/// Start the calsel-service process
fn start_service() -> CalselResult<()> {
    Command::new("calsel-service")
        .spawn()
        .map_err(|e| {
            CalselError::Transport(format!(
                "Failed to start calsel-service. Is it installed? ({e})"
            ))
        })?;
    Ok(())
}
