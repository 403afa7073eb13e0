//! Core types for the calsel ecosystem.
//!
//! This crate provides the types shared by the calsel CLI and the
//! background persistence service:
//! - `GroupDocument` and the preset document wire shape
//! - `protocol` module for the client-service message protocol
//! - `host` module for the host-bridge subprocess protocol
//! - global configuration and error types

pub mod config;
pub mod document;
pub mod error;
pub mod host;
pub mod protocol;

pub use document::GroupDocument;
pub use error::{CalselError, CalselResult};
