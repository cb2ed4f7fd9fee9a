use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::DemandStatus;

/// Creation and last-modification trail embedded in every demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl AuditInfo {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            last_modified_by: None,
            last_modified_at: None,
        }
    }

    /// Registra quem alterou a demanda por último.
    pub fn record(&mut self, actor: &str) -> DateTime<Utc> {
        let now = Utc::now();
        self.last_modified_by = Some(actor.to_string());
        self.last_modified_at = Some(now);
        now
    }
}

impl Default for AuditInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to a demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    StatusChanged {
        from: DemandStatus,
        to: DemandStatus,
    },
    /// Advisory signal for CRÍTICO demands: manager and secretary must be notified.
    CriticalNotice { description: String },
    /// The actor's municipality does not match the demand's.
    AccessDenied { actor_municipality: Option<String> },
    Modified,
}

/// Structured record emitted to an [`EventSink`] instead of printed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEvent {
    pub demand_id: String,
    pub actor: String,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Receives audit and notification events as they occur.
pub trait EventSink {
    fn emit(&mut self, event: DemandEvent);
}

impl EventSink for Vec<DemandEvent> {
    fn emit(&mut self, event: DemandEvent) {
        self.push(event);
    }
}

/// In-memory event buffer that callers poll.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<DemandEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DemandEvent] {
        &self.events
    }

    /// Removes and returns every buffered event.
    pub fn drain(&mut self) -> Vec<DemandEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn for_demand<'a>(&'a self, demand_id: &'a str) -> impl Iterator<Item = &'a DemandEvent> {
        self.events.iter().filter(move |e| e.demand_id == demand_id)
    }

    /// Status transitions as `(from, to)` pairs, in emission order.
    pub fn status_changes(&self) -> Vec<(DemandStatus, DemandStatus)> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::StatusChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: DemandEvent) {
        self.events.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: DemandEvent) {
        match &event.kind {
            EventKind::StatusChanged { from, to } => tracing::info!(
                demand = %event.demand_id,
                actor = %event.actor,
                %from,
                %to,
                "demand status changed"
            ),
            EventKind::CriticalNotice { description } => tracing::warn!(
                demand = %event.demand_id,
                %description,
                "critical demand: notifying manager and secretary"
            ),
            EventKind::AccessDenied { actor_municipality } => tracing::warn!(
                demand = %event.demand_id,
                actor = %event.actor,
                ?actor_municipality,
                "access denied"
            ),
            EventKind::Modified => {
                tracing::debug!(demand = %event.demand_id, actor = %event.actor, "demand modified")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, kind: EventKind) -> DemandEvent {
        DemandEvent {
            demand_id: id.into(),
            actor: "SISTEMA".into(),
            at: Utc::now(),
            kind,
        }
    }

    #[test]
    fn audit_record_tracks_last_modifier() {
        let mut audit = AuditInfo::new();
        assert!(audit.last_modified_by.is_none());

        let at = audit.record("Ana Souza");
        assert_eq!(audit.last_modified_by.as_deref(), Some("Ana Souza"));
        assert_eq!(audit.last_modified_at, Some(at));
        assert!(at >= audit.created_at);
    }

    #[test]
    fn event_log_filters_and_drains() {
        let mut log = EventLog::new();
        log.emit(event(
            "a",
            EventKind::StatusChanged {
                from: DemandStatus::Open,
                to: DemandStatus::Regular,
            },
        ));
        log.emit(event("b", EventKind::Modified));

        assert_eq!(log.len(), 2);
        assert_eq!(log.for_demand("a").count(), 1);
        assert_eq!(
            log.status_changes(),
            vec![(DemandStatus::Open, DemandStatus::Regular)]
        );

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn event_serializes_flat() {
        let e = event(
            "x",
            EventKind::StatusChanged {
                from: DemandStatus::Open,
                to: DemandStatus::InProgress,
            },
        );
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "status_changed");
        assert_eq!(json["to"], "EM ANDAMENTO");
        assert_eq!(json["demand_id"], "x");
    }
}
