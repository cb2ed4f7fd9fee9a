//! Fábrica de demandas: único caminho de criação.
//!
//! [`DemandFactory::create`] applies the creation-time business rules: system
//! generated pedagogical demands (RN02) and forced escalation of infrastructure
//! demands whose cost exceeds the configured ceiling (RN04).

use crate::config::Config;
use crate::demand::{
    ClassFigures, Demand, DemandBase, DemandStatus, DemandType, EventSink, InfrastructureDemand,
    PedagogicalDemand, Priority, Processable, Requester, SYSTEM_ACTOR,
};
use crate::error::{EscolaError, Result};
use crate::school::{ClassSummary, Reference};

/// Note appended to infrastructure demands escalated at creation.
pub const ESCALATION_NOTE: &str = "[AVISO DO SISTEMA] Custo estimado acima do limite permitido. \
     Requer autorização do Secretário Municipal de Educação.";

/// Type-specific inputs. Which ones are required depends on the demand type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandFields {
    pub target_class: Option<Reference<ClassSummary>>,
    pub total_students: u32,
    pub students_below_average: u32,
    pub students_present: u32,
    pub attendance_ratio: f64,
    /// Média mensal de presença da turma, usada no texto das demandas automáticas.
    pub monthly_average: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub location: Option<String>,
}

/// Everything the factory needs to build a demand.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandRequest {
    pub demand_type: DemandType,
    pub requester: Requester,
    pub description: Option<String>,
    pub priority: Priority,
    pub fields: DemandFields,
}

impl DemandRequest {
    pub fn new(demand_type: DemandType, requester: Requester) -> Self {
        Self {
            demand_type,
            requester,
            description: None,
            priority: Priority::Normal,
            fields: DemandFields::default(),
        }
    }

    pub fn pedagogical(requester: Requester) -> Self {
        Self::new(DemandType::Pedagogical, requester)
    }

    pub fn infrastructure(requester: Requester) -> Self {
        Self::new(DemandType::Infrastructure, requester)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_fields(mut self, fields: DemandFields) -> Self {
        self.fields = fields;
        self
    }
}

pub struct DemandFactory;

impl DemandFactory {
    /// Builds a demand with a fresh id, applying the creation rules of its type.
    ///
    /// The factory keeps no reference to the returned demand.
    pub fn create(config: &Config, request: DemandRequest, sink: &mut dyn EventSink) -> Result<Demand> {
        match request.demand_type {
            DemandType::Pedagogical => Self::create_pedagogical(request).map(Demand::from),
            DemandType::Infrastructure => {
                Self::create_infrastructure(config, request, sink).map(Demand::from)
            }
        }
    }

    /// Same as [`create`](Self::create) with the type given as text (`"pedagogica"`, `"INFRAESTRUTURA"`).
    pub fn create_tagged(
        config: &Config,
        type_tag: &str,
        requester: Requester,
        description: Option<String>,
        priority: Priority,
        fields: DemandFields,
        sink: &mut dyn EventSink,
    ) -> Result<Demand> {
        let request = DemandRequest {
            demand_type: type_tag.parse()?,
            requester,
            description,
            priority,
            fields,
        };
        Self::create(config, request, sink)
    }

    fn create_pedagogical(request: DemandRequest) -> Result<PedagogicalDemand> {
        let DemandRequest {
            requester,
            description,
            priority,
            fields,
            ..
        } = request;

        let target_class = fields
            .target_class
            .ok_or(EscolaError::MissingRequiredField("target_class"))?;

        for (field, count) in [
            ("students_below_average", fields.students_below_average),
            ("students_present", fields.students_present),
        ] {
            if count > fields.total_students {
                return Err(EscolaError::InvalidField {
                    field,
                    reason: format!(
                        "{count} exceeds total_students ({})",
                        fields.total_students
                    ),
                });
            }
        }

        let (requester, priority, description) = match description {
            Some(text) if !text.trim().is_empty() => (requester, priority, text),
            _ => {
                let average = fields
                    .monthly_average
                    .ok_or(EscolaError::MissingRequiredField("monthly_average"))?;
                let evasion = (1.0 - average) * 100.0;
                let class_name = match &target_class {
                    Reference::Resolved(summary) => summary.name.as_str(),
                    Reference::Unresolved(id) => id.as_str(),
                };
                let text = format!(
                    "[ALERTA DE EVASÃO] A turma {class_name} registrou {evasion:.0}% de ausência \
                     média no mês, abaixo da frequência mínima exigida. Demanda gerada \
                     automaticamente pelo sistema."
                );
                tracing::info!(class = %target_class.id(), evasion, "generating system pedagogical demand");
                (Requester::System, Priority::High, text)
            }
        };

        let figures = ClassFigures {
            total_students: fields.total_students,
            students_below_average: fields.students_below_average,
            students_present: fields.students_present,
            attendance_ratio: fields.attendance_ratio,
        };
        Ok(PedagogicalDemand::new(
            DemandBase::new(description, priority, requester),
            figures,
            target_class,
        ))
    }

    fn create_infrastructure(
        config: &Config,
        request: DemandRequest,
        sink: &mut dyn EventSink,
    ) -> Result<InfrastructureDemand> {
        let DemandRequest {
            requester,
            description,
            priority,
            fields,
            ..
        } = request;

        let cost = fields
            .estimated_cost
            .ok_or(EscolaError::MissingRequiredField("estimated_cost"))?;
        if !cost.is_finite() {
            return Err(EscolaError::InvalidField {
                field: "estimated_cost",
                reason: format!("{cost} is not a finite amount"),
            });
        }
        let location = fields
            .location
            .ok_or(EscolaError::MissingRequiredField("location"))?;

        let escalate = cost > config.max_demand_cost;
        let description = match (description, escalate) {
            (Some(text), true) if !text.trim().is_empty() => format!("{text}\n{ESCALATION_NOTE}"),
            (_, true) => ESCALATION_NOTE.to_string(),
            (Some(text), false) => text,
            (None, false) => String::new(),
        };

        let mut base = DemandBase::new(description, priority, requester);
        if escalate {
            tracing::warn!(
                cost,
                ceiling = config.max_demand_cost,
                "infrastructure cost above ceiling, priority forced to MAXIMA"
            );
            base.lock_priority(Priority::Maximum);
        }

        let mut demand = InfrastructureDemand::new(base, cost, location);
        if demand.base().priority() == Priority::Maximum {
            demand
                .base_mut()
                .update_status(DemandStatus::AwaitingProcurement, SYSTEM_ACTOR, sink);
        }
        Ok(demand)
    }
}
