//! User-visible notifications.
//!
//! Save outcomes are reported here rather than through return values,
//! so every surface (one-shot commands and the watch session) tells the
//! user the same thing. Tests substitute a recording implementation.

use owo_colors::OwoColorize;

pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Prints notifications to the terminal.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        println!("{} {}", "calsel".dimmed(), message);
    }
}
