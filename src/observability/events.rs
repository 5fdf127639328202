//! Observable events for sampleview
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Store operations
    /// Document inserted into a memory store
    StoreInsert,
    /// Aggregation request received by a memory store
    StoreAggregate,

    // View reads
    /// Pipeline submitted to the query service
    ViewExecute,
    /// Count read completed
    ViewCount,
    /// Lookup by id found nothing in the view
    ViewLookupMiss,
    /// Distinct tag read completed
    ViewDistinctTags,
    /// Summary rendered
    ViewSummary,
    /// Chain method rejected its arguments
    ViewRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::StoreInsert => "STORE_INSERT",
            Event::StoreAggregate => "STORE_AGGREGATE",

            Event::ViewExecute => "VIEW_EXECUTE",
            Event::ViewCount => "VIEW_COUNT",
            Event::ViewLookupMiss => "VIEW_LOOKUP_MISS",
            Event::ViewDistinctTags => "VIEW_DISTINCT_TAGS",
            Event::ViewSummary => "VIEW_SUMMARY",
            Event::ViewRejected => "VIEW_REJECTED",
        }
    }

    /// Default severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ViewExecute | Event::StoreAggregate | Event::StoreInsert => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
