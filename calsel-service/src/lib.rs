//! Background persistence service for calsel presets.
//!
//! Owns the canonical preset document, hydrates it lazily from durable
//! storage on first access, and serves the client message protocol over
//! a local HTTP endpoint. The service has no outbound initiative; it
//! only reacts to requests.

pub mod routes;
pub mod service;
pub mod singleton;
pub mod store;

pub use service::PresetService;
pub use store::{FileStore, GroupStore, MemoryStore};
