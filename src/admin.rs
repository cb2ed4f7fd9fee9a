//! Atores administrativos: gestor escolar e secretário municipal.
//!
//! Both implement [`Actor`] and drive demands through `process`. The manager
//! also opens infrastructure demands for its school; the secretary handles the
//! municipal budget for approved works.

use crate::config::Config;
use crate::demand::{
    Actor, Demand, DemandStatus, EventSink, ProcessOutcome, Processable, Requester,
};
use crate::error::{EscolaError, Result};
use crate::factory::{DemandFactory, DemandFields, DemandRequest};
use crate::school::{Municipality, School};

/// Above this cost a work always goes to procurement, whatever the budget.
pub const PROCUREMENT_HARD_CAP: f64 = 100_000.0;

/// Gestor escolar.
#[derive(Debug, Clone, PartialEq)]
pub struct Manager {
    pub name: String,
    pub email: String,
    pub school: School,
    school_budget: f64,
}

impl Manager {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        school: School,
        school_budget: f64,
    ) -> Result<Self> {
        let school_budget = (school_budget * 100.0).round() / 100.0;
        if school_budget <= 0.0 {
            return Err(EscolaError::Validation(
                "school budget must be greater than zero".into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            email: email.into(),
            school,
            school_budget,
        })
    }

    pub fn school_budget(&self) -> f64 {
        self.school_budget
    }

    /// Abre uma demanda de infraestrutura em nome da escola.
    ///
    /// Works costing more than the school budget go straight to procurement,
    /// on top of any escalation the factory applied.
    pub fn submit_infrastructure(
        &self,
        config: &Config,
        description: &str,
        estimated_cost: f64,
        location: &str,
        sink: &mut dyn EventSink,
    ) -> Result<Demand> {
        if estimated_cost <= 0.0 {
            return Err(EscolaError::InvalidField {
                field: "estimated_cost",
                reason: "must be greater than zero".into(),
            });
        }
        let request = DemandRequest::infrastructure(Requester::from_actor(self))
            .with_description(description)
            .with_fields(DemandFields {
                estimated_cost: Some(estimated_cost),
                location: Some(location.to_string()),
                ..Default::default()
            });
        let mut demand = DemandFactory::create(config, request, sink)?;

        if estimated_cost > self.school_budget {
            tracing::info!(
                demand = %demand.id(),
                cost = estimated_cost,
                budget = self.school_budget,
                "cost above school budget"
            );
            demand.update_status(DemandStatus::InProcurement, &self.name, sink);
        }
        Ok(demand)
    }

    /// Processes every demand in the list.
    pub fn administer(
        &self,
        demands: &mut [Demand],
        config: &Config,
        sink: &mut dyn EventSink,
    ) -> Vec<ProcessOutcome> {
        if demands.is_empty() {
            tracing::info!(manager = %self.name, "no pending demands");
        }
        demands
            .iter_mut()
            .map(|d| d.process(self, config, sink))
            .collect()
    }
}

impl Actor for Manager {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn municipality_id(&self) -> Option<&str> {
        Some(self.school.municipality_id())
    }
}

/// Secretário municipal de educação.
#[derive(Debug, Clone, PartialEq)]
pub struct Secretary {
    pub name: String,
    pub email: String,
    pub municipality: Municipality,
    department: String,
    budget: f64,
}

impl Secretary {
    /// `department` must be alphabetic with at least two letters; stored uppercase.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        municipality: Municipality,
        department: &str,
        budget: f64,
    ) -> Result<Self> {
        let department = department.trim();
        if department.chars().count() < 2 || !department.chars().all(char::is_alphabetic) {
            return Err(EscolaError::Validation(format!(
                "invalid department {department:?}"
            )));
        }
        Ok(Self {
            name: name.into(),
            email: email.into(),
            municipality,
            department: department.to_uppercase(),
            budget,
        })
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Processes the demands that belong to this municipality and returns their ids.
    pub fn administer(
        &self,
        demands: &mut [Demand],
        config: &Config,
        sink: &mut dyn EventSink,
    ) -> Vec<String> {
        demands
            .iter_mut()
            .filter(|d| d.municipality_id() == Some(self.municipality.id.as_str()))
            .map(|d| {
                d.process(self, config, sink);
                d.id().to_string()
            })
            .collect()
    }

    /// Aprova a obra com a verba municipal ou a envia para licitação.
    ///
    /// Pedagogical demands are left untouched. Returns the remaining budget.
    pub fn manage_budget(&mut self, demand: &mut Demand, sink: &mut dyn EventSink) -> f64 {
        let Some(cost) = demand.as_infrastructure().map(|d| d.estimated_cost()) else {
            return self.budget;
        };

        if cost > PROCUREMENT_HARD_CAP || cost > self.budget {
            demand.update_status(DemandStatus::InProcurement, &self.name, sink);
        } else {
            self.budget -= cost;
            tracing::info!(demand = %demand.id(), cost, remaining = self.budget, "work funded");
            demand.update_status(DemandStatus::InProgress, &self.name, sink);
        }
        self.budget
    }
}

impl Actor for Secretary {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn municipality_id(&self) -> Option<&str> {
        Some(self.municipality.id.as_str())
    }
}
