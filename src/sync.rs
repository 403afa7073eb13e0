//! Foreground synchronization between the host application and the
//! persistence service.
//!
//! A session is cheap, holds no durable state, and is rebuilt wholesale
//! on recovery. The document flows host → retention → migration →
//! service on save, and service → repair → host on load; the service
//! side never validates, so every defensive step lives here.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use calsel_core::document::{AUTOSAVE_LIMIT, AUTOSAVE_PREFIX, GroupDocument, SCHEMA_VERSION};

use crate::client::GroupsTransport;
use crate::manager::CalendarManager;
use crate::notify::Notifier;

pub struct SyncSession<M, T> {
    manager: M,
    transport: T,
    notifier: Box<dyn Notifier>,
    last_location: Option<String>,
    seen_presets: bool,
}

impl<M: CalendarManager, T: GroupsTransport> SyncSession<M, T> {
    pub fn new(manager: M, transport: T, notifier: Box<dyn Notifier>) -> Self {
        SyncSession {
            manager,
            transport,
            notifier,
            last_location: None,
            seen_presets: false,
        }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn notify(&self, message: &str) {
        self.notifier.notify(message);
    }

    /// Fetch the canonical document from the service, repair it, and
    /// hand it to the host. Falls back to the empty shape when the
    /// service is unreachable, so the host always receives a usable
    /// group set.
    pub async fn load_groups(&mut self) -> GroupDocument {
        let mut document = match self.transport.get_groups().await {
            Ok(value) => GroupDocument::from_value(&value),
            Err(e) => {
                warn!("could not fetch groups from service: {e}");
                GroupDocument::default()
            }
        };

        if document.version.is_none() {
            // Pre-versioning documents carry calendar names. Resolve
            // them before the host sees the document, so a later save
            // stores identifiers instead of re-freezing the names.
            document = self.migrated_to_v1(document).await;
        }
        document.version = Some(SCHEMA_VERSION);

        if let Err(e) = self.manager.set_groups(&document).await {
            warn!("host rejected groups: {e}");
        }

        self.seen_presets = self.seen_presets || !document.groups.is_empty();
        document
    }

    /// Export the host's current groups, trim autosaves, migrate legacy
    /// documents, and persist through the service. Returns whether the
    /// durable save was acknowledged.
    pub async fn store_groups(&mut self) -> bool {
        let mut document = match self.manager.export_groups().await {
            Ok(document) => document,
            Err(e) => {
                self.notifier.notify(&format!("Failed to save presets: {e}"));
                return false;
            }
        };

        let removed = apply_retention(&mut document);
        if !removed.is_empty() {
            debug!(?removed, "trimmed autosave entries");
        }

        if document.version.is_none() {
            document = self.migrated_to_v1(document).await;
        }
        document.version = Some(SCHEMA_VERSION);

        let preset_names = document.preset_names();
        self.seen_presets = self.seen_presets || !preset_names.is_empty();

        match self.transport.save_groups(document.to_value()).await {
            Ok(()) => {
                self.notifier
                    .notify(&format!("Presets saved: {}", preset_names.join(", ")));
                true
            }
            Err(e) => {
                self.notifier.notify(&format!("Failed to save presets: {e}"));
                false
            }
        }
    }

    /// Reload when the host reports no presets where this session has
    /// previously observed some; the host dropping its in-memory state
    /// is indistinguishable from data loss.
    pub async fn check_group_loss(&mut self) {
        let present = match self.manager.export_groups().await {
            Ok(document) => !document.groups.is_empty(),
            Err(e) => {
                warn!("could not check groups on host: {e}");
                return;
            }
        };

        if !present && self.seen_presets {
            info!("presets disappeared from host, reloading");
            self.load_groups().await;
        }
    }

    /// Detect in-app navigation by comparing locations, and reload after
    /// a settle delay so the host has finished rebuilding its view.
    pub async fn check_navigation(&mut self, settle: Duration) {
        let location = match self.manager.location().await {
            Ok(location) => location,
            Err(e) => {
                warn!("could not read host location: {e}");
                return;
            }
        };

        match self.last_location.replace(location.clone()) {
            Some(last) if last != location => {
                info!(%location, "host navigated");
                tokio::time::sleep(settle).await;
                if matches!(self.manager.is_ready().await, Ok(true)) {
                    self.load_groups().await;
                }
            }
            _ => {}
        }
    }

    async fn migrated_to_v1(&self, document: GroupDocument) -> GroupDocument {
        let directory = match self.manager.calendar_directory().await {
            Ok(directory) => directory,
            Err(e) => {
                warn!("calendar directory unavailable, keeping names: {e}");
                HashMap::new()
            }
        };
        migrate_to_v1(document, &directory)
    }
}

/// Resolve calendar names to stable identifiers. Names without a
/// directory entry pass through unchanged: they belong to a different
/// account, or already are identifiers.
pub fn migrate_to_v1(
    mut document: GroupDocument,
    directory: &HashMap<String, String>,
) -> GroupDocument {
    for calendars in document.groups.values_mut() {
        for entry in calendars.iter_mut() {
            if let Some(id) = directory.get(entry) {
                *entry = id.clone();
            }
        }
    }
    document
}

/// Keep at most `AUTOSAVE_LIMIT` autosave entries, evicting oldest first.
/// Autosave names embed sortable timestamps, so lexicographic order is
/// chronological; `GroupDocument` keys already iterate in that order.
/// Evicted names are also dropped from the autosave history, preserving
/// the relative order of the survivors. Returns the evicted names.
pub fn apply_retention(document: &mut GroupDocument) -> Vec<String> {
    let autosaves = document.autosave_names();
    if autosaves.len() <= AUTOSAVE_LIMIT {
        return Vec::new();
    }

    let excess = autosaves.len() - AUTOSAVE_LIMIT;
    let removed: Vec<String> = autosaves.into_iter().take(excess).collect();

    for name in &removed {
        document.groups.remove(name);
        document.last_saved.retain(|entry| entry != name);
    }

    debug_assert!(removed.iter().all(|name| name.starts_with(AUTOSAVE_PREFIX)));
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsel_core::{CalselError, CalselResult};
    use calsel_service::GroupStore;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeManager {
        groups: Arc<Mutex<GroupDocument>>,
        directory: Arc<Mutex<HashMap<String, String>>>,
        location: Arc<Mutex<String>>,
    }

    impl FakeManager {
        fn with_directory(entries: &[(&str, &str)]) -> Self {
            let manager = FakeManager::default();
            *manager.directory.lock().unwrap() = entries
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .collect();
            manager
        }

        fn install(&self, document: GroupDocument) {
            *self.groups.lock().unwrap() = document;
        }

        fn current(&self) -> GroupDocument {
            self.groups.lock().unwrap().clone()
        }

        fn navigate(&self, location: &str) {
            *self.location.lock().unwrap() = location.to_string();
        }
    }

    impl CalendarManager for FakeManager {
        async fn is_ready(&self) -> CalselResult<bool> {
            Ok(true)
        }

        async fn export_groups(&self) -> CalselResult<GroupDocument> {
            Ok(self.current())
        }

        async fn set_groups(&self, document: &GroupDocument) -> CalselResult<()> {
            self.install(document.clone());
            Ok(())
        }

        async fn calendar_directory(&self) -> CalselResult<HashMap<String, String>> {
            Ok(self.directory.lock().unwrap().clone())
        }

        async fn location(&self) -> CalselResult<String> {
            Ok(self.location.lock().unwrap().clone())
        }

        async fn enable_calendar(&self, _pattern: &str) -> CalselResult<()> {
            Ok(())
        }

        async fn disable_all(&self) -> CalselResult<()> {
            Ok(())
        }

        async fn save_selections(&self, name: Option<&str>) -> CalselResult<String> {
            Ok(name.unwrap_or("saved_20240101000000").to_string())
        }

        async fn restore_selections(&self) -> CalselResult<()> {
            Ok(())
        }

        async fn delete_group(&self, _name: &str) -> CalselResult<()> {
            Ok(())
        }

        async fn show_group(&self, _name: &str) -> CalselResult<()> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        response: Arc<Mutex<Option<Value>>>,
        saved: Arc<Mutex<Vec<Value>>>,
        unreachable: bool,
    }

    impl FakeTransport {
        fn serving(document: Value) -> Self {
            let transport = FakeTransport::default();
            *transport.response.lock().unwrap() = Some(document);
            transport
        }

        fn down() -> Self {
            FakeTransport {
                unreachable: true,
                ..FakeTransport::default()
            }
        }

        fn last_saved_document(&self) -> Value {
            self.saved.lock().unwrap().last().cloned().expect("no save recorded")
        }
    }

    impl GroupsTransport for FakeTransport {
        async fn ping(&self) -> CalselResult<()> {
            if self.unreachable {
                return Err(CalselError::Transport("channel gone".into()));
            }
            Ok(())
        }

        async fn get_groups(&self) -> CalselResult<Value> {
            if self.unreachable {
                return Err(CalselError::Transport("channel gone".into()));
            }
            Ok(self
                .response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(calsel_core::document::default_shape))
        }

        async fn save_groups(&self, document: Value) -> CalselResult<()> {
            if self.unreachable {
                return Err(CalselError::Transport("channel gone".into()));
            }
            self.saved.lock().unwrap().push(document);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNotifier {
        fn last(&self) -> String {
            self.messages.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn make_session(
        manager: FakeManager,
        transport: FakeTransport,
    ) -> (SyncSession<FakeManager, FakeTransport>, RecordingNotifier) {
        make_session_with(manager, transport)
    }

    #[tokio::test]
    async fn load_groups_falls_back_to_the_empty_shape_when_unreachable() {
        let manager = FakeManager::default();
        let (mut session, _) = make_session(manager.clone(), FakeTransport::down());

        let document = session.load_groups().await;

        assert_eq!(document.version, Some(SCHEMA_VERSION));
        assert!(document.groups.is_empty());
        // The host still received a usable group set.
        assert_eq!(manager.current(), document);
    }

    #[tokio::test]
    async fn load_groups_repairs_a_malformed_payload() {
        let transport = FakeTransport::serving(json!({
            "Work": ["id-1"],
            "__last_saved": "not-a-list",
            "__v": 1,
        }));
        let (mut session, _) = make_session(FakeManager::default(), transport);

        let document = session.load_groups().await;

        assert!(document.last_saved.is_empty());
        assert_eq!(document.groups["Work"], vec!["id-1"]);
    }

    #[tokio::test]
    async fn load_groups_migrates_legacy_documents_before_installing_them() {
        let transport = FakeTransport::serving(json!({
            "Work": ["Alice's Calendar", "unknown@elsewhere"],
        }));
        let manager = FakeManager::with_directory(&[("Alice's Calendar", "alice@example.com")]);
        let (mut session, _) = make_session(manager.clone(), transport);

        let document = session.load_groups().await;

        assert_eq!(document.version, Some(1));
        assert_eq!(
            document.groups["Work"],
            vec!["alice@example.com", "unknown@elsewhere"]
        );
        assert!(document.last_saved.is_empty());
        assert_eq!(manager.current(), document);
    }

    #[tokio::test]
    async fn store_groups_trims_autosaves_beyond_the_cap() {
        let manager = FakeManager::default();
        manager.install(GroupDocument::from_value(&json!({
            "A": ["1", "2"],
            "saved_20240101": ["3"],
            "saved_20240102": ["4"],
            "saved_20240103": ["5"],
            "saved_20240104": ["6"],
            "__last_saved": ["saved_20240101", "saved_20240102", "saved_20240103", "saved_20240104"],
            "__v": 1,
        })));
        let transport = FakeTransport::default();
        let (mut session, _) = make_session(manager, transport.clone());

        assert!(session.store_groups().await);

        let saved = GroupDocument::from_value(&transport.last_saved_document());
        assert!(!saved.groups.contains_key("saved_20240101"));
        assert_eq!(
            saved.last_saved,
            vec!["saved_20240102", "saved_20240103", "saved_20240104"]
        );
        assert_eq!(saved.autosave_names().len(), AUTOSAVE_LIMIT);
        assert_eq!(saved.groups["A"], vec!["1", "2"]);
    }

    #[tokio::test]
    async fn store_groups_migrates_legacy_exports_and_stamps_the_version() {
        let manager = FakeManager::with_directory(&[("Alice's Calendar", "alice@example.com")]);
        manager.install(GroupDocument::from_value(&json!({
            "Work": ["Alice's Calendar"],
        })));
        let transport = FakeTransport::default();
        let (mut session, _) = make_session(manager, transport.clone());

        assert!(session.store_groups().await);

        let saved = transport.last_saved_document();
        assert_eq!(saved["__v"], json!(1));
        assert_eq!(saved["Work"], json!(["alice@example.com"]));
        assert_eq!(saved["__last_saved"], json!([]));
    }

    #[tokio::test]
    async fn store_groups_reports_the_saved_preset_names() {
        let manager = FakeManager::default();
        manager.install(GroupDocument::from_value(&json!({
            "Standup": ["id-1"],
            "Work": ["id-2"],
            "__last_saved": [],
            "__v": 1,
        })));
        let (mut session, notifier) = make_session(manager, FakeTransport::default());

        assert!(session.store_groups().await);
        assert_eq!(notifier.last(), "Presets saved: Standup, Work");
    }

    #[tokio::test]
    async fn store_groups_surfaces_save_failures() {
        let manager = FakeManager::default();
        manager.install(GroupDocument::from_value(&json!({
            "Work": ["id-1"],
            "__last_saved": [],
            "__v": 1,
        })));
        let (mut session, notifier) = make_session(manager, FakeTransport::down());

        assert!(!session.store_groups().await);
        assert!(notifier.last().starts_with("Failed to save presets"));
    }

    #[tokio::test]
    async fn migration_is_a_no_op_on_already_migrated_documents() {
        let directory: HashMap<String, String> =
            [("Alice's Calendar".to_string(), "alice@example.com".to_string())].into();

        let legacy = GroupDocument::from_value(&json!({ "Work": ["Alice's Calendar"] }));
        let once = migrate_to_v1(legacy, &directory);
        let twice = migrate_to_v1(once.clone(), &directory);

        assert_eq!(once, twice);
    }

    #[test]
    fn retention_keeps_documents_under_the_cap_untouched() {
        let mut document = GroupDocument::from_value(&json!({
            "saved_20240101": ["1"],
            "saved_20240102": ["2"],
            "Work": ["3"],
            "__last_saved": ["saved_20240101", "saved_20240102"],
            "__v": 1,
        }));

        assert!(apply_retention(&mut document).is_empty());
        assert_eq!(document.autosave_names().len(), 2);
    }

    #[test]
    fn retention_never_touches_named_presets() {
        let mut document = GroupDocument::from_value(&json!({
            "saved_20240101": ["1"],
            "saved_20240102": ["2"],
            "saved_20240103": ["3"],
            "saved_20240104": ["4"],
            "saved_20240105": ["5"],
            "Work": ["6"],
            "__last_saved": ["saved_20240101", "saved_20240102", "saved_20240103",
                             "saved_20240104", "saved_20240105"],
            "__v": 1,
        }));

        let removed = apply_retention(&mut document);
        assert_eq!(removed, vec!["saved_20240101", "saved_20240102"]);
        assert!(document.groups.contains_key("Work"));
        assert_eq!(
            document.last_saved,
            vec!["saved_20240103", "saved_20240104", "saved_20240105"]
        );
    }

    #[tokio::test]
    async fn group_loss_triggers_a_reload() {
        let transport = FakeTransport::serving(json!({
            "Work": ["id-1"],
            "__last_saved": [],
            "__v": 1,
        }));
        let manager = FakeManager::default();
        let (mut session, _) = make_session(manager.clone(), transport);

        session.load_groups().await;
        assert!(!manager.current().groups.is_empty());

        // The host loses its in-memory state.
        manager.install(GroupDocument::default());
        session.check_group_loss().await;

        assert!(manager.current().groups.contains_key("Work"));
    }

    /// Routes session traffic to a real `PresetService` without HTTP,
    /// exercising the same serialize-into-a-copy boundary.
    #[derive(Clone)]
    struct InProcessTransport {
        service: Arc<tokio::sync::Mutex<calsel_service::PresetService>>,
    }

    impl InProcessTransport {
        fn over(store: calsel_service::MemoryStore) -> Self {
            InProcessTransport {
                service: Arc::new(tokio::sync::Mutex::new(calsel_service::PresetService::new(
                    Box::new(store),
                ))),
            }
        }
    }

    impl GroupsTransport for InProcessTransport {
        async fn ping(&self) -> CalselResult<()> {
            Ok(())
        }

        async fn get_groups(&self) -> CalselResult<Value> {
            let mut service = self.service.lock().await;
            service.initialize();
            Ok(service.groups().clone())
        }

        async fn save_groups(&self, document: Value) -> CalselResult<()> {
            let mut service = self.service.lock().await;
            service.initialize();
            service.save_groups(document)
        }
    }

    #[tokio::test]
    async fn round_trip_survives_a_service_restart() {
        let store = calsel_service::MemoryStore::new();

        let manager = FakeManager::default();
        manager.install(GroupDocument::from_value(&json!({
            "Team": ["id-a", "id-b"],
            "Work": ["id-c"],
            "saved_20240103": ["id-d"],
            "__last_saved": ["saved_20240103"],
            "__v": 1,
        })));
        let (mut session, _) = make_session_with(manager.clone(), InProcessTransport::over(store.clone()));
        assert!(session.store_groups().await);
        let exported = manager.current();

        // A fresh service over the same store models a restart.
        let restarted = FakeManager::default();
        let (mut session, _) =
            make_session_with(restarted.clone(), InProcessTransport::over(store));
        let loaded = session.load_groups().await;

        assert_eq!(loaded, exported);
        assert_eq!(restarted.current(), exported);
    }

    #[tokio::test]
    async fn retention_applies_before_the_document_reaches_the_service() {
        let store = calsel_service::MemoryStore::new();

        let manager = FakeManager::default();
        manager.install(GroupDocument::from_value(&json!({
            "saved_20240101": ["1"],
            "saved_20240102": ["2"],
            "saved_20240103": ["3"],
            "saved_20240104": ["4"],
            "__last_saved": ["saved_20240101", "saved_20240102", "saved_20240103", "saved_20240104"],
            "__v": 1,
        })));
        let (mut session, _) = make_session_with(manager, InProcessTransport::over(store.clone()));
        assert!(session.store_groups().await);

        let held = GroupDocument::from_value(&store.load().unwrap().unwrap());
        assert_eq!(held.autosave_names().len(), AUTOSAVE_LIMIT);
        assert!(!held.groups.contains_key("saved_20240101"));
    }

    fn make_session_with<T: GroupsTransport>(
        manager: FakeManager,
        transport: T,
    ) -> (SyncSession<FakeManager, T>, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let session = SyncSession::new(manager, transport, Box::new(notifier.clone()));
        (session, notifier)
    }

    #[tokio::test]
    async fn navigation_change_reloads_after_the_settle_delay() {
        let transport = FakeTransport::serving(json!({
            "Work": ["id-1"],
            "__last_saved": [],
            "__v": 1,
        }));
        let manager = FakeManager::default();
        manager.navigate("calendar/week");
        let (mut session, _) = make_session(manager.clone(), transport);

        // First check only primes the last seen location.
        session.check_navigation(Duration::ZERO).await;
        assert!(manager.current().groups.is_empty());

        manager.navigate("calendar/month");
        session.check_navigation(Duration::ZERO).await;

        assert!(manager.current().groups.contains_key("Work"));
    }
}
