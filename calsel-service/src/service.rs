//! The persistence service: canonical in-memory preset document plus
//! write-through to durable storage.
//!
//! The service holds the document as opaque JSON and adopts whatever a
//! client saves verbatim. Shape repair is the foreground's concern; this
//! side only guarantees there is always *some* document to hand out.

use serde_json::Value;
use tracing::{error, info, warn};

use calsel_core::CalselResult;
use calsel_core::document;

use crate::store::GroupStore;

pub struct PresetService {
    store: Box<dyn GroupStore>,
    current: Value,
    ready: bool,
}

impl PresetService {
    pub fn new(store: Box<dyn GroupStore>) -> Self {
        PresetService {
            store,
            current: document::default_shape(),
            ready: false,
        }
    }

    /// Hydrate the in-memory document from durable storage. Idempotent:
    /// a ready service is left untouched. Read failures are logged and
    /// leave the service usable on the default shape rather than
    /// blocking it.
    pub fn initialize(&mut self) {
        if self.ready {
            return;
        }

        match self.store.load() {
            Ok(Some(document)) => {
                info!("loaded stored groups");
                self.current = document;
            }
            Ok(None) => {
                if let Err(e) = self.store.save(&self.current) {
                    warn!("could not persist initial document: {e}");
                }
            }
            Err(e) => {
                error!("error accessing group storage: {e}");
            }
        }

        self.ready = true;
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    /// The current in-memory document. Callers treat this as read-only;
    /// the transport boundary serializes it into a caller-owned copy.
    pub fn groups(&self) -> &Value {
        &self.current
    }

    /// Adopt `document` as the canonical copy and write it through. The
    /// in-memory copy is kept even when the durable write fails, so
    /// memory and disk may diverge until the next successful save.
    pub fn save_groups(&mut self, document: Value) -> CalselResult<()> {
        self.current = document;
        self.store.save(&self.current)
    }
}
