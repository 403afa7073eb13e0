//! Host bridge subprocess protocol.
//!
//! This module handles communication with external bridge binaries
//! (e.g., `calsel-host-gcal`) using JSON over stdin/stdout.
//!
//! The protocol is designed to be language-agnostic: any executable that
//! speaks the JSON protocol can bridge calsel to a calendar application.
//!
//! Bridges own the connection to the running host application. calsel
//! passes commands through and never sees the toggling mechanics.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{CalselError, CalselResult};
use crate::host::protocol::{Command, HostCommand, Request, Response};

const HOST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostBridge(String);

impl HostBridge {
    pub fn from_name(name: &str) -> Self {
        HostBridge(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn binary_path(&self) -> CalselResult<std::path::PathBuf> {
        let binary_name = format!("calsel-host-{}", self.0);
        let binary_path = which::which(&binary_name).map_err(|_| {
            CalselError::HostNotInstalled(format!(
                "Host bridge '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })?;
        Ok(binary_path)
    }

    /// Call a typed bridge command and return the result.
    ///
    /// The response type is inferred from the command's associated type,
    /// ensuring compile-time type safety.
    pub async fn call<C: HostCommand>(&self, cmd: C) -> CalselResult<C::Response> {
        timeout(HOST_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| CalselError::HostTimeout(HOST_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes
    /// the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalselResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| CalselError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| CalselError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(?command, bridge = %self.0, "calling host bridge");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                CalselError::Host(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        // Write request to stdin (unwrap safe: we piped stdin above)
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        // Wait for process and collect output
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(CalselError::Host(format!(
                "Bridge exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.is_empty() {
            return Err(CalselError::Host("Bridge returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| CalselError::Host(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(CalselError::Host(error)),
        }
    }
}
