//! In-memory audit trail recorder.

use super::AuditEvent;
use std::sync::Mutex;

/// In-memory recorder for audit events.
///
/// Shared between concurrent requests; events are kept in the order they
/// were recorded. A production deployment forwards events to a durable log
/// instead.
///
/// # Example
///
/// ```
/// use intake_core::audit::{AuditTrail, AuditEvent, AuditOutcome};
///
/// let trail = AuditTrail::new();
/// trail.record(AuditEvent::new("req-123", Some("Display Lab"), AuditOutcome::Stored));
///
/// assert_eq!(trail.events().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Creates a new empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an audit event.
    pub fn record(&self, event: AuditEvent) {
        // A poisoned lock still holds every event recorded before the panic.
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
