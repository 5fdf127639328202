//! Observability for sampleview
//!
//! Structured JSON-line logging of view and store activity.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on query execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use sampleview::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ViewCount, &[("count", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ViewCount, &[("dataset", "quickstart"), ("count", "3")]);
    }
}
