use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::{AuditInfo, DemandEvent, EventKind, EventSink};
use super::status::{DemandStatus, Priority};
use crate::config::Config;
use crate::error::EscolaError;

/// Display name used when the engine itself acts on a demand.
pub const SYSTEM_ACTOR: &str = "SISTEMA";

/// Someone allowed to act on demands (gestor, secretário).
pub trait Actor {
    fn display_name(&self) -> &str;

    /// Município ao qual o ator pertence, se conhecido.
    fn municipality_id(&self) -> Option<&str>;
}

/// Who opened a demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Requester {
    /// Automatically generated by the engine.
    System,
    User {
        name: String,
        municipality_id: Option<String>,
    },
}

impl Requester {
    pub fn from_actor(actor: &dyn Actor) -> Self {
        Requester::User {
            name: actor.display_name().to_string(),
            municipality_id: actor.municipality_id().map(str::to_string),
        }
    }

    pub fn municipality_id(&self) -> Option<&str> {
        match self {
            Requester::System => None,
            Requester::User {
                municipality_id, ..
            } => municipality_id.as_deref(),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Requester::System)
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requester::System => f.write_str(SYSTEM_ACTOR),
            Requester::User { name, .. } => f.write_str(name),
        }
    }
}

/// Result of a single `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Transitioned(DemandStatus),
    /// Actor belongs to another municipality; nothing changed.
    Denied,
    /// Pedagogical demand with zero enrolled students; nothing changed.
    NoData,
}

/// Fields and behavior shared by every demand variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandBase {
    id: String,
    description: String,
    status: DemandStatus,
    priority: Priority,
    priority_locked: bool,
    requester: Requester,
    audit: AuditInfo,
}

impl DemandBase {
    pub(crate) fn new(description: String, priority: Priority, requester: Requester) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description,
            status: DemandStatus::Open,
            priority,
            priority_locked: false,
            requester,
            audit: AuditInfo::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> DemandStatus {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn is_priority_locked(&self) -> bool {
        self.priority_locked
    }

    /// Changes the priority unless it was locked by a cost escalation.
    pub fn set_priority(&mut self, priority: Priority) -> Result<(), EscolaError> {
        if self.priority_locked {
            return Err(EscolaError::PriorityLocked(self.priority));
        }
        self.priority = priority;
        Ok(())
    }

    /// Sets the priority and prevents any later change.
    pub(crate) fn lock_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.priority_locked = true;
    }

    /// Único ponto de mutação do status. Emite um evento de auditoria.
    pub fn update_status(&mut self, status: DemandStatus, actor: &str, sink: &mut dyn EventSink) {
        let from = self.status;
        self.status = status;
        sink.emit(DemandEvent {
            demand_id: self.id.clone(),
            actor: actor.to_string(),
            at: Utc::now(),
            kind: EventKind::StatusChanged { from, to: status },
        });
    }

    /// Emits a [`EventKind::CriticalNotice`] when priority is CRÍTICO.
    pub fn trigger_critical_notice(&self, actor: &str, sink: &mut dyn EventSink) -> bool {
        if self.priority != Priority::Critical {
            return false;
        }
        sink.emit(DemandEvent {
            demand_id: self.id.clone(),
            actor: actor.to_string(),
            at: Utc::now(),
            kind: EventKind::CriticalNotice {
                description: self.description.clone(),
            },
        });
        true
    }

    /// Stamps the audit trail with `actor` and emits [`EventKind::Modified`].
    pub fn record_modification(&mut self, actor: &str, sink: &mut dyn EventSink) {
        let at = self.audit.record(actor);
        sink.emit(DemandEvent {
            demand_id: self.id.clone(),
            actor: actor.to_string(),
            at,
            kind: EventKind::Modified,
        });
    }

    pub(crate) fn deny(&self, actor: &dyn Actor, sink: &mut dyn EventSink) {
        tracing::warn!(
            demand = %self.id,
            actor = actor.display_name(),
            "access denied: actor does not belong to this municipality"
        );
        sink.emit(DemandEvent {
            demand_id: self.id.clone(),
            actor: actor.display_name().to_string(),
            at: Utc::now(),
            kind: EventKind::AccessDenied {
                actor_municipality: actor.municipality_id().map(str::to_string),
            },
        });
    }
}

/// Capability shared by the demand variants: drive the demand through its rules.
pub trait Processable {
    fn base(&self) -> &DemandBase;

    fn base_mut(&mut self) -> &mut DemandBase;

    /// Municipality derived from the requester (or its target, for system demands).
    fn municipality_id(&self) -> Option<&str>;

    /// Applies the variant's rules once on behalf of `actor`.
    fn process(
        &mut self,
        actor: &dyn Actor,
        config: &Config,
        sink: &mut dyn EventSink,
    ) -> ProcessOutcome;

    /// `true` when `actor` may act on this demand. Emits a denial event otherwise.
    fn authorize(&self, actor: &dyn Actor, sink: &mut dyn EventSink) -> bool {
        let allowed = match (self.municipality_id(), actor.municipality_id()) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        };
        if !allowed {
            self.base().deny(actor, sink);
        }
        allowed
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Actor;

    /// Minimal actor for unit tests.
    pub struct TestActor {
        pub name: String,
        pub municipality: Option<String>,
    }

    impl TestActor {
        pub fn of(municipality: &str) -> Self {
            Self {
                name: format!("Servidor {municipality}"),
                municipality: Some(municipality.to_string()),
            }
        }
    }

    impl Actor for TestActor {
        fn display_name(&self) -> &str {
            &self.name
        }

        fn municipality_id(&self) -> Option<&str> {
            self.municipality.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TestActor;
    use super::*;
    use crate::demand::EventLog;

    #[test]
    fn new_base_starts_open_with_unique_id() {
        let a = DemandBase::new("a".into(), Priority::Normal, Requester::System);
        let b = DemandBase::new("b".into(), Priority::Normal, Requester::System);
        assert_eq!(a.status(), DemandStatus::Open);
        assert_ne!(a.id(), b.id());
        assert!(Uuid::parse_str(a.id()).is_ok());
    }

    #[test]
    fn update_status_emits_event() {
        let mut base = DemandBase::new("x".into(), Priority::Normal, Requester::System);
        let mut log = EventLog::new();
        base.update_status(DemandStatus::InProgress, "Ana", &mut log);

        assert_eq!(base.status(), DemandStatus::InProgress);
        let e = &log.events()[0];
        assert_eq!(e.actor, "Ana");
        assert_eq!(e.demand_id, base.id());
        assert_eq!(
            e.kind,
            EventKind::StatusChanged {
                from: DemandStatus::Open,
                to: DemandStatus::InProgress
            }
        );
    }

    #[test]
    fn critical_notice_only_for_critical_priority() {
        let mut log = EventLog::new();
        let normal = DemandBase::new("x".into(), Priority::Maximum, Requester::System);
        assert!(!normal.trigger_critical_notice(SYSTEM_ACTOR, &mut log));
        assert!(log.is_empty());

        let critical = DemandBase::new("telhado caiu".into(), Priority::Critical, Requester::System);
        assert!(critical.trigger_critical_notice(SYSTEM_ACTOR, &mut log));
        assert!(matches!(
            &log.events()[0].kind,
            EventKind::CriticalNotice { description } if description == "telhado caiu"
        ));
    }

    #[test]
    fn locked_priority_cannot_change() {
        let mut base = DemandBase::new("x".into(), Priority::Normal, Requester::System);
        base.set_priority(Priority::High).unwrap();
        base.lock_priority(Priority::Maximum);

        let err = base.set_priority(Priority::Normal).unwrap_err();
        assert!(matches!(err, EscolaError::PriorityLocked(Priority::Maximum)));
        assert_eq!(base.priority(), Priority::Maximum);
    }

    #[test]
    fn requester_from_actor() {
        let actor = TestActor::of("MUN-01");
        let requester = Requester::from_actor(&actor);
        assert_eq!(requester.municipality_id(), Some("MUN-01"));
        assert_eq!(requester.to_string(), "Servidor MUN-01");
        assert_eq!(Requester::System.to_string(), "SISTEMA");
        assert!(Requester::System.municipality_id().is_none());
    }
}
