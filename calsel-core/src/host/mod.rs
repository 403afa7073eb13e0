//! Host-bridge integration.
//!
//! The actual calendar toggling happens inside the host calendar
//! application. calsel reaches it through an external bridge binary that
//! speaks the JSON protocol defined in [`protocol`].

pub mod bridge;
pub mod protocol;

pub use bridge::HostBridge;
