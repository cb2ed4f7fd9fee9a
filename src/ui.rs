//! Saída colorida no terminal com a crate `console`.
//!
//! The engine never prints; this module formats demands and the events
//! collected in an [`EventLog`] for the CLI.

use anyhow::{Context, Result};
use console::Style;

use escola_demandas::Config;
use escola_demandas::demand::{Demand, DemandEvent, DemandStatus, EventKind, Priority};

pub struct Reporter {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
        }
    }

    fn status_style(&self, status: DemandStatus) -> &Style {
        match status {
            DemandStatus::Open => &self.cyan,
            DemandStatus::InProgress | DemandStatus::ReinforcementApproved | DemandStatus::Regular => {
                &self.green
            }
            DemandStatus::InProcurement | DemandStatus::AwaitingProcurement => &self.yellow,
        }
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.cyan.apply_to(format!("─── {title} ───")));
    }

    pub fn demand(&self, demand: &Demand) {
        let priority = match demand.priority() {
            p @ (Priority::Maximum | Priority::Critical) => self.red.apply_to(p.to_string()),
            p => self.yellow.apply_to(p.to_string()),
        };
        println!("  {} {}", self.green.apply_to("●"), demand.demand_type());
        println!("    id:          {}", demand.id());
        println!("    solicitante: {}", demand.requester());
        println!("    prioridade:  {priority}");
        println!(
            "    status:      {}",
            self.status_style(demand.status()).apply_to(demand.status())
        );
        println!("    descrição:   {}", demand.description());
        if let Some(infra) = demand.as_infrastructure() {
            println!("    custo:       R$ {:.2} ({})", infra.estimated_cost(), infra.location());
        }
        if let Some(p) = demand.as_pedagogical() {
            println!(
                "    turma:       {} ({} alunos, {} abaixo da média)",
                p.target_class().id(),
                p.total_students(),
                p.students_below_average()
            );
        }
    }

    pub fn events(&self, events: &[DemandEvent]) {
        for event in events {
            let at = event.at.format("%d/%m/%Y %H:%M:%S");
            let line = match &event.kind {
                EventKind::StatusChanged { from, to } => format!(
                    "{} → {}",
                    from,
                    self.status_style(*to).apply_to(to)
                ),
                EventKind::CriticalNotice { description } => {
                    format!("{} {description}", self.red.apply_to("ALERTA CRÍTICO:"))
                }
                EventKind::AccessDenied { .. } => self.red.apply_to("acesso negado").to_string(),
                EventKind::Modified => "alteração registrada".to_string(),
            };
            println!("  [{at}] {}: {line}", event.actor);
        }
    }

    pub fn no_demand(&self, average: f64) {
        println!(
            "  {} Frequência média de {:.1}%: nenhuma demanda gerada",
            self.green.apply_to("✓"),
            average * 100.0
        );
    }

    pub fn config(&self, config: &Config) -> Result<()> {
        let rendered = serde_json::to_string_pretty(config)
            .context("failed to render configuration")?;
        println!("{rendered}");
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
