use serde::{Deserialize, Serialize};

use super::reference::{Identified, Reference};
use crate::error::EscolaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: String,
    pub name: String,
    /// Sigla da UF, sempre em maiúsculas.
    pub state: String,
    pub available_budget: f64,
}

impl Municipality {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        state: &str,
        available_budget: f64,
    ) -> Result<Self, EscolaError> {
        let municipality = Self {
            id: id.into(),
            name: name.into(),
            state: state.trim().to_uppercase(),
            available_budget,
        };
        municipality.validate()?;
        Ok(municipality)
    }

    pub fn validate(&self) -> Result<(), EscolaError> {
        if self.state.chars().count() != 2 || !self.state.chars().all(char::is_alphabetic) {
            return Err(EscolaError::Validation(format!(
                "state must be a two-letter code, got {:?}",
                self.state
            )));
        }
        if self.available_budget < 0.0 {
            return Err(EscolaError::Validation(
                "municipality budget cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Verba do município somada à verba das escolas situadas nele.
    pub fn total_investment(&self, schools: &[School]) -> f64 {
        let schools_budget: f64 = schools
            .iter()
            .filter(|s| s.municipality.id() == self.id)
            .map(|s| s.available_budget)
            .sum();
        self.available_budget + schools_budget
    }
}

impl Identified for Municipality {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    pub address: String,
    pub municipality: Reference<Municipality>,
    pub available_budget: f64,
}

impl School {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        municipality: Reference<Municipality>,
        available_budget: f64,
    ) -> Result<Self, EscolaError> {
        if available_budget < 0.0 {
            return Err(EscolaError::Validation(
                "school budget cannot be negative".into(),
            ));
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            municipality,
            available_budget,
        })
    }

    pub fn municipality_id(&self) -> &str {
        self.municipality.id()
    }
}

impl Identified for School {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_normalized_and_validated() {
        let m = Municipality::new("MUN-CE-01", "Juazeiro do Norte", "ce", 1000.0).unwrap();
        assert_eq!(m.state, "CE");

        assert!(Municipality::new("x", "x", "CEA", 0.0).is_err());
        assert!(Municipality::new("x", "x", "C1", 0.0).is_err());
        assert!(Municipality::new("x", "x", "CE", -1.0).is_err());
    }

    #[test]
    fn total_investment_counts_only_own_schools() {
        let m = Municipality::new("MUN-1", "Crato", "CE", 50_000.0).unwrap();
        let own = School::new("E1", "Escola A", "Rua 1", m.clone().into(), 10_000.0).unwrap();
        let other = School::new(
            "E2",
            "Escola B",
            "Rua 2",
            Reference::unresolved("MUN-2"),
            99_000.0,
        )
        .unwrap();

        assert_eq!(m.total_investment(&[own, other]), 60_000.0);
    }

    #[test]
    fn school_rejects_negative_budget() {
        assert!(School::new("E", "E", "R", Reference::unresolved("M"), -5.0).is_err());
    }
}
