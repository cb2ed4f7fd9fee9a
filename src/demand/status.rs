use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EscolaError;

/// Lifecycle status of a demand.
///
/// Every demand starts `Open`; the other states are terminal for this engine
/// and are only reached through [`update_status`](super::DemandBase::update_status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandStatus {
    #[serde(rename = "ABERTO")]
    Open,
    #[serde(rename = "EM ANDAMENTO")]
    InProgress,
    #[serde(rename = "EM LICITAÇÃO")]
    InProcurement,
    #[serde(rename = "AGUARDANDO LICITAÇÃO")]
    AwaitingProcurement,
    #[serde(rename = "REFORÇO APROVADO")]
    ReinforcementApproved,
    #[serde(rename = "REGULAR")]
    Regular,
}

impl DemandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DemandStatus::Open => "ABERTO",
            DemandStatus::InProgress => "EM ANDAMENTO",
            DemandStatus::InProcurement => "EM LICITAÇÃO",
            DemandStatus::AwaitingProcurement => "AGUARDANDO LICITAÇÃO",
            DemandStatus::ReinforcementApproved => "REFORÇO APROVADO",
            DemandStatus::Regular => "REGULAR",
        }
    }
}

impl fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority levels, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ALTA")]
    High,
    #[serde(rename = "MAXIMA")]
    Maximum,
    #[serde(rename = "CRÍTICO")]
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => write!(f, "NORMAL"),
            Priority::High => write!(f, "ALTA"),
            Priority::Maximum => write!(f, "MAXIMA"),
            Priority::Critical => write!(f, "CRÍTICO"),
        }
    }
}

impl FromStr for Priority {
    type Err = EscolaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NORMAL" => Ok(Priority::Normal),
            "ALTA" => Ok(Priority::High),
            "MAXIMA" | "MÁXIMA" => Ok(Priority::Maximum),
            "CRÍTICO" | "CRITICO" => Ok(Priority::Critical),
            _ => Err(EscolaError::UnknownPriority(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        assert_eq!(DemandStatus::Open.to_string(), "ABERTO");
        assert_eq!(DemandStatus::InProcurement.to_string(), "EM LICITAÇÃO");
        assert_eq!(
            DemandStatus::AwaitingProcurement.to_string(),
            "AGUARDANDO LICITAÇÃO"
        );
        assert_eq!(
            DemandStatus::ReinforcementApproved.to_string(),
            "REFORÇO APROVADO"
        );
    }

    #[test]
    fn status_serializes_with_display_name() {
        let json = serde_json::to_string(&DemandStatus::InProgress).unwrap();
        assert_eq!(json, "\"EM ANDAMENTO\"");
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("alta".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Máxima".parse::<Priority>().unwrap(), Priority::Maximum);
        assert_eq!("crítico".parse::<Priority>().unwrap(), Priority::Critical);
        assert!(matches!(
            "urgente".parse::<Priority>(),
            Err(EscolaError::UnknownPriority(_))
        ));
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::Maximum < Priority::Critical);
        assert_eq!(Priority::default(), Priority::Normal);
    }
}
