//! The host-application boundary.
//!
//! `CalendarManager` is the capability surface calsel consumes from the
//! host calendar application: readiness, the in-memory preset document,
//! the calendar name directory, and the primitive visibility operations.
//! The production implementation relays every capability to a
//! `calsel-host-<name>` bridge binary; tests substitute fakes.

use std::collections::HashMap;

use calsel_core::CalselResult;
use calsel_core::document::GroupDocument;
use calsel_core::host::HostBridge;
use calsel_core::host::protocol::{
    CalendarDirectory, DeleteGroup, DisableAll, EnableCalendar, ExportGroups, Location,
    RestoreSelections, SaveSelections, SetGroups, ShowGroup, Status,
};

pub trait CalendarManager {
    /// Whether the host application has finished its own initialization.
    /// It becomes available asynchronously after the host page loads.
    async fn is_ready(&self) -> CalselResult<bool>;

    /// Deep copy of the host's current preset document.
    async fn export_groups(&self) -> CalselResult<GroupDocument>;

    /// Install a preset document into the host application.
    async fn set_groups(&self, document: &GroupDocument) -> CalselResult<()>;

    /// Calendar name → stable identifier directory.
    async fn calendar_directory(&self) -> CalselResult<HashMap<String, String>>;

    /// Current in-app location, for navigation detection.
    async fn location(&self) -> CalselResult<String>;

    /// Enable calendars matching a case-insensitive pattern.
    async fn enable_calendar(&self, pattern: &str) -> CalselResult<()>;

    /// Disable every calendar.
    async fn disable_all(&self) -> CalselResult<()>;

    /// Capture the enabled calendars as a group; an unnamed save creates
    /// a timestamped autosave entry. Returns the created group's name.
    async fn save_selections(&self, name: Option<&str>) -> CalselResult<String>;

    /// Re-apply the most recent autosaved selection.
    async fn restore_selections(&self) -> CalselResult<()>;

    /// Delete a named group.
    async fn delete_group(&self, name: &str) -> CalselResult<()>;

    /// Apply a named group's visibility selection.
    async fn show_group(&self, name: &str) -> CalselResult<()>;
}

impl CalendarManager for HostBridge {
    async fn is_ready(&self) -> CalselResult<bool> {
        let report = self.call(Status {}).await?;
        Ok(report.ready)
    }

    async fn export_groups(&self) -> CalselResult<GroupDocument> {
        self.call(ExportGroups {}).await
    }

    async fn set_groups(&self, document: &GroupDocument) -> CalselResult<()> {
        self.call(SetGroups {
            groups: document.clone(),
        })
        .await
    }

    async fn calendar_directory(&self) -> CalselResult<HashMap<String, String>> {
        self.call(CalendarDirectory {}).await
    }

    async fn location(&self) -> CalselResult<String> {
        self.call(Location {}).await
    }

    async fn enable_calendar(&self, pattern: &str) -> CalselResult<()> {
        self.call(EnableCalendar {
            pattern: pattern.to_string(),
        })
        .await
    }

    async fn disable_all(&self) -> CalselResult<()> {
        self.call(DisableAll {}).await
    }

    async fn save_selections(&self, name: Option<&str>) -> CalselResult<String> {
        self.call(SaveSelections {
            name: name.map(str::to_string),
        })
        .await
    }

    async fn restore_selections(&self) -> CalselResult<()> {
        self.call(RestoreSelections {}).await
    }

    async fn delete_group(&self, name: &str) -> CalselResult<()> {
        self.call(DeleteGroup {
            name: name.to_string(),
        })
        .await
    }

    async fn show_group(&self, name: &str) -> CalselResult<()> {
        self.call(ShowGroup {
            name: name.to_string(),
        })
        .await
    }
}
