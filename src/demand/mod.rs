//! Demandas governadas e a máquina de estados de status/prioridade.
//!
//! A demand is a [`DemandBase`] (id, description, status, priority, requester,
//! audit trail) composed into one of two closed variants. Every status change
//! goes through [`DemandBase::update_status`] and is reported to an
//! [`EventSink`].

mod audit;
mod base;
mod infrastructure;
mod pedagogical;
mod status;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use audit::{AuditInfo, DemandEvent, EventKind, EventLog, EventSink, TracingSink};
pub use base::{Actor, DemandBase, ProcessOutcome, Processable, Requester, SYSTEM_ACTOR};
pub use infrastructure::InfrastructureDemand;
pub use pedagogical::{APPROVAL_ATTENDANCE, APPROVAL_GAP_INDEX, ClassFigures, PedagogicalDemand};
pub use status::{DemandStatus, Priority};

#[cfg(test)]
pub(crate) use base::test_support;

use crate::config::Config;
use crate::error::EscolaError;

/// The closed set of demand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandType {
    #[serde(rename = "PEDAGOGICA")]
    Pedagogical,
    #[serde(rename = "INFRAESTRUTURA")]
    Infrastructure,
}

impl fmt::Display for DemandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandType::Pedagogical => write!(f, "PEDAGOGICA"),
            DemandType::Infrastructure => write!(f, "INFRAESTRUTURA"),
        }
    }
}

impl FromStr for DemandType {
    type Err = EscolaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PEDAGOGICA" | "PEDAGÓGICA" => Ok(DemandType::Pedagogical),
            "INFRAESTRUTURA" => Ok(DemandType::Infrastructure),
            _ => Err(EscolaError::UnknownDemandType(s.to_string())),
        }
    }
}

/// A governed demand of either variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum Demand {
    #[serde(rename = "PEDAGOGICA")]
    Pedagogical(PedagogicalDemand),
    #[serde(rename = "INFRAESTRUTURA")]
    Infrastructure(InfrastructureDemand),
}

impl Demand {
    pub fn demand_type(&self) -> DemandType {
        match self {
            Demand::Pedagogical(_) => DemandType::Pedagogical,
            Demand::Infrastructure(_) => DemandType::Infrastructure,
        }
    }

    pub fn id(&self) -> &str {
        self.base().id()
    }

    pub fn description(&self) -> &str {
        self.base().description()
    }

    pub fn status(&self) -> DemandStatus {
        self.base().status()
    }

    pub fn priority(&self) -> Priority {
        self.base().priority()
    }

    pub fn requester(&self) -> &Requester {
        self.base().requester()
    }

    pub fn update_status(&mut self, status: DemandStatus, actor: &str, sink: &mut dyn EventSink) {
        self.base_mut().update_status(status, actor, sink);
    }

    pub fn trigger_critical_notice(&self, actor: &str, sink: &mut dyn EventSink) -> bool {
        self.base().trigger_critical_notice(actor, sink)
    }

    pub fn as_pedagogical(&self) -> Option<&PedagogicalDemand> {
        match self {
            Demand::Pedagogical(d) => Some(d),
            Demand::Infrastructure(_) => None,
        }
    }

    pub fn as_infrastructure(&self) -> Option<&InfrastructureDemand> {
        match self {
            Demand::Infrastructure(d) => Some(d),
            Demand::Pedagogical(_) => None,
        }
    }
}

impl Processable for Demand {
    fn base(&self) -> &DemandBase {
        match self {
            Demand::Pedagogical(d) => d.base(),
            Demand::Infrastructure(d) => d.base(),
        }
    }

    fn base_mut(&mut self) -> &mut DemandBase {
        match self {
            Demand::Pedagogical(d) => d.base_mut(),
            Demand::Infrastructure(d) => d.base_mut(),
        }
    }

    fn municipality_id(&self) -> Option<&str> {
        match self {
            Demand::Pedagogical(d) => d.municipality_id(),
            Demand::Infrastructure(d) => d.municipality_id(),
        }
    }

    fn process(
        &mut self,
        actor: &dyn Actor,
        config: &Config,
        sink: &mut dyn EventSink,
    ) -> ProcessOutcome {
        match self {
            Demand::Pedagogical(d) => d.process(actor, config, sink),
            Demand::Infrastructure(d) => d.process(actor, config, sink),
        }
    }
}

impl From<PedagogicalDemand> for Demand {
    fn from(d: PedagogicalDemand) -> Self {
        Demand::Pedagogical(d)
    }
}

impl From<InfrastructureDemand> for Demand {
    fn from(d: InfrastructureDemand) -> Self {
        Demand::Infrastructure(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demand_type_parses_case_insensitively() {
        assert_eq!(
            "pedagogica".parse::<DemandType>().unwrap(),
            DemandType::Pedagogical
        );
        assert_eq!(
            "Infraestrutura".parse::<DemandType>().unwrap(),
            DemandType::Infrastructure
        );
        assert!(matches!(
            "transporte".parse::<DemandType>(),
            Err(EscolaError::UnknownDemandType(t)) if t == "transporte"
        ));
    }

    #[test]
    fn demand_serializes_with_type_tag() {
        let d: Demand = InfrastructureDemand::new(
            DemandBase::new("Muro".into(), Priority::High, Requester::System),
            800.0,
            "Pátio".into(),
        )
        .into();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["tipo"], "INFRAESTRUTURA");
        assert_eq!(json["status"], "ABERTO");
        assert_eq!(json["priority"], "ALTA");
        assert_eq!(json["estimated_cost"], 800.0);
    }
}
