//! Caller-supplied sinks for splice diagnostics
//!
//! The core never installs a global subscriber. Callers pass a sink to
//! [`crate::pipeline::Pipeline::insert_trivia`] and decide what to do with
//! the events: forward them to `tracing`, keep them for inspection, or drop
//! them.

use crate::span::Scope;
use serde::Serialize;

/// One step of splicing a single trivia token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SpliceEvent {
    /// The token's text was classified.
    Classified { scope: Scope, kind: &'static str },
    /// The token was anchored next to a slot of `owner`.
    Anchored {
        scope: Scope,
        owner: &'static str,
        field: &'static str,
        index: usize,
    },
    /// The node was inserted; `end_of_line` is only meaningful for comments.
    Inserted {
        scope: Scope,
        kind: &'static str,
        end_of_line: bool,
    },
}

impl SpliceEvent {
    pub fn scope(&self) -> Scope {
        match self {
            SpliceEvent::Classified { scope, .. }
            | SpliceEvent::Anchored { scope, .. }
            | SpliceEvent::Inserted { scope, .. } => *scope,
        }
    }
}

/// Receiver of splice events
pub trait DiagnosticSink {
    fn record(&mut self, event: SpliceEvent);
}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, event: SpliceEvent) {
        match event {
            SpliceEvent::Classified { scope, kind } => {
                tracing::debug!(%scope, kind, "Classified trivia");
            }
            SpliceEvent::Anchored {
                scope,
                owner,
                field,
                index,
            } => {
                tracing::debug!(%scope, owner, field, index, "Anchored trivia");
            }
            SpliceEvent::Inserted {
                scope,
                kind,
                end_of_line,
            } => {
                tracing::debug!(%scope, kind, end_of_line, "Inserted trivia");
            }
        }
    }
}

/// Keeps every event, in the order received.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Vec<SpliceEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SpliceEvent] {
        &self.events
    }

    /// Insertion events, i.e. one per spliced node.
    pub fn inserted(&self) -> impl Iterator<Item = &SpliceEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, SpliceEvent::Inserted { .. }))
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&mut self, event: SpliceEvent) {
        self.events.push(event);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: SpliceEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Location;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let scope = Scope::new(Location::new(1, 0), Location::new(1, 4));
        let mut sink = CollectingSink::new();
        sink.record(SpliceEvent::Classified {
            scope,
            kind: "Comment",
        });
        sink.record(SpliceEvent::Inserted {
            scope,
            kind: "Comment",
            end_of_line: false,
        });
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.inserted().count(), 1);
        assert_eq!(sink.events()[1].scope(), scope);

        let json = serde_json::to_string(&sink.events()[0]).unwrap();
        assert!(json.starts_with(r#"{"event":"classified""#));
    }
}
