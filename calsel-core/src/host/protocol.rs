//! Defines the JSON protocol used for communication between the calsel
//! sync client and host-bridge binaries over stdin/stdout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::document::GroupDocument;

pub trait HostCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

/// Commands that host bridges must implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Status,
    ExportGroups,
    SetGroups,
    CalendarDirectory,
    Location,
    EnableCalendar,
    DisableAll,
    SaveSelections,
    RestoreSelections,
    DeleteGroup,
    ShowGroup,
}

/// Request sent from the sync client to a host bridge.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a host bridge to the sync client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap()
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap()
    }
}

/// Ask whether the host application has finished its own initialization.
#[derive(Debug, Serialize, Deserialize)]
pub struct Status {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub ready: bool,
}

impl HostCommand for Status {
    type Response = StatusReport;
    fn command() -> Command {
        Command::Status
    }
}

/// Export the full in-memory preset document (deep copy).
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportGroups {}

impl HostCommand for ExportGroups {
    type Response = GroupDocument;
    fn command() -> Command {
        Command::ExportGroups
    }
}

/// Install a preset document into the host application.
#[derive(Debug, Serialize, Deserialize)]
pub struct SetGroups {
    pub groups: GroupDocument,
}

impl HostCommand for SetGroups {
    type Response = ();
    fn command() -> Command {
        Command::SetGroups
    }
}

/// Fetch the calendar name → stable identifier directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDirectory {}

impl HostCommand for CalendarDirectory {
    type Response = HashMap<String, String>;
    fn command() -> Command {
        Command::CalendarDirectory
    }
}

/// Report the host application's current location. The host is a
/// single-page app that navigates without reloading, so the sync client
/// polls this to detect in-app navigation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Location {}

impl HostCommand for Location {
    type Response = String;
    fn command() -> Command {
        Command::Location
    }
}

/// Enable calendars whose name matches a case-insensitive pattern.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnableCalendar {
    pub pattern: String,
}

impl HostCommand for EnableCalendar {
    type Response = ();
    fn command() -> Command {
        Command::EnableCalendar
    }
}

/// Disable every calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct DisableAll {}

impl HostCommand for DisableAll {
    type Response = ();
    fn command() -> Command {
        Command::DisableAll
    }
}

/// Capture the currently enabled calendars as a group. Unnamed saves
/// create a timestamped `saved_*` autosave entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveSelections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl HostCommand for SaveSelections {
    type Response = String; // name of the created group
    fn command() -> Command {
        Command::SaveSelections
    }
}

/// Re-apply the most recent autosaved selection.
#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreSelections {}

impl HostCommand for RestoreSelections {
    type Response = ();
    fn command() -> Command {
        Command::RestoreSelections
    }
}

/// Delete a named group from the host application.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteGroup {
    pub name: String,
}

impl HostCommand for DeleteGroup {
    type Response = ();
    fn command() -> Command {
        Command::DeleteGroup
    }
}

/// Apply a named group's visibility selection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShowGroup {
    pub name: String,
}

impl HostCommand for ShowGroup {
    type Response = ();
    fn command() -> Command {
        Command::ShowGroup
    }
}
