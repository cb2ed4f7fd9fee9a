use serde::{Deserialize, Serialize};

use super::audit::EventSink;
use super::base::{Actor, DemandBase, ProcessOutcome, Processable};
use super::status::DemandStatus;
use crate::config::Config;

/// Demanda de infraestrutura: obra ou reparo com custo estimado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureDemand {
    #[serde(flatten)]
    base: DemandBase,
    estimated_cost: f64,
    location: String,
}

impl InfrastructureDemand {
    pub(crate) fn new(base: DemandBase, estimated_cost: f64, location: String) -> Self {
        Self {
            base,
            estimated_cost,
            location,
        }
    }

    pub fn estimated_cost(&self) -> f64 {
        self.estimated_cost
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn exceeds(&self, ceiling: f64) -> bool {
        self.estimated_cost > ceiling
    }
}

impl Processable for InfrastructureDemand {
    fn base(&self) -> &DemandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DemandBase {
        &mut self.base
    }

    fn municipality_id(&self) -> Option<&str> {
        self.base.requester().municipality_id()
    }

    /// Re-evaluates the cost against the current ceiling, independently of
    /// any escalation done at creation time.
    fn process(
        &mut self,
        actor: &dyn Actor,
        config: &Config,
        sink: &mut dyn EventSink,
    ) -> ProcessOutcome {
        if !self.authorize(actor, sink) {
            return ProcessOutcome::Denied;
        }

        let status = if self.exceeds(config.max_demand_cost) {
            tracing::info!(
                demand = %self.base.id(),
                cost = self.estimated_cost,
                ceiling = config.max_demand_cost,
                "cost above ceiling, sending to procurement"
            );
            DemandStatus::InProcurement
        } else {
            DemandStatus::InProgress
        };
        let name = actor.display_name();
        self.base.update_status(status, name, sink);
        self.base.trigger_critical_notice(name, sink);
        self.base.record_modification(name, sink);
        ProcessOutcome::Transitioned(status)
    }
}
