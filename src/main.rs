mod cli;
mod ui;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{Month, NaiveDate};
use clap::Parser;

use cli::{Cli, Command};
use escola_demandas::Config;
use escola_demandas::admin::{Manager, Secretary};
use escola_demandas::attendance::AttendanceEvaluator;
use escola_demandas::demand::EventLog;
use escola_demandas::logging;
use escola_demandas::school::{Class, Municipality, School, Student};
use ui::Reporter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Demo => run_demo(&config),
        Command::Avaliar { arquivo, mes } => run_evaluation(&config, &arquivo, mes),
        Command::Config => Reporter::new().config(&config),
    }
}

fn month(number: u8) -> Result<Month> {
    Month::try_from(number).map_err(|_| anyhow!("invalid month: {number}"))
}

fn run_evaluation(config: &Config, path: &Path, mes: u8) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let class: Class = serde_json::from_str(&contents)
        .with_context(|| format!("invalid class file {}", path.display()))?;
    class.validate()?;

    let month = month(mes)?;
    let evaluator = AttendanceEvaluator::new(config);
    let reporter = Reporter::new();
    let mut log = EventLog::new();

    reporter.section(&format!("Turma {} · {}", class.name, month.name()));
    match evaluator.evaluate_month(&class, month, &mut log)? {
        Some(demand) => {
            reporter.demand(&demand);
            reporter.events(log.events());
        }
        None => reporter.no_demand(evaluator.class_monthly_average(&class, month)?),
    }
    Ok(())
}

fn run_demo(config: &Config) -> Result<()> {
    let reporter = Reporter::new();
    let mut log = EventLog::new();

    let municipio = Municipality::new("MUN-CE-01", "Juazeiro do Norte", "CE", 250_000.0)?;
    let escola = School::new(
        "ESC-UFCA-01",
        "UFCA",
        "Av. Tenente Raimundo Rocha",
        municipio.clone().into(),
        30_000.0,
    )?;
    let mut turma = Class::new(
        "T-POO-2026",
        "Programação Orientada a Objetos",
        2026,
        escola.clone().into(),
    )?;
    turma.enroll(Student::new("MAT-2026-0001", "Levi Farias")?);

    // Quatro aulas em fevereiro; o aluno só comparece à primeira.
    let aulas = [2, 4, 9, 11];
    for (i, dia) in aulas.into_iter().enumerate() {
        let data = NaiveDate::from_ymd_opt(2026, 2, dia).ok_or_else(|| anyhow!("invalid date"))?;
        turma.record_lesson(data, "Conteúdo programático", &[("MAT-2026-0001", i == 0)])?;
    }

    let evaluator = AttendanceEvaluator::new(config);
    let fevereiro = Month::February;
    let media = evaluator.class_monthly_average(&turma, fevereiro)?;
    reporter.section(&format!("RN02 · média da turma em fevereiro: {:.0}%", media * 100.0));

    let mut demandas = Vec::new();
    match evaluator.evaluate_month(&turma, fevereiro, &mut log)? {
        Some(demanda) => {
            reporter.demand(&demanda);
            demandas.push(demanda);
        }
        None => reporter.no_demand(media),
    }

    reporter.section("RN04 · obra acima do limite de custo");
    let gestor = Manager::new("Claudio Oliveira", "claudio@ufca.edu.br", escola, 30_000.0)?;
    let obra = gestor.submit_infrastructure(config, "Reforma do laboratório", 20_000.0, "Bloco B", &mut log)?;
    reporter.demand(&obra);
    demandas.push(obra);

    reporter.section("Processamento pela Secretaria");
    let secretario = Secretary::new("Ana Ribeiro", "ana@sme.juazeiro.ce.gov.br", municipio, "educacao", 250_000.0)?;
    let processadas = secretario.administer(&mut demandas, config, &mut log);
    tracing::info!(count = processadas.len(), "demands processed by the secretary");
    for demanda in &demandas {
        println!("  {} → {}", demanda.id(), demanda.status());
    }

    reporter.section("Eventos de auditoria");
    reporter.events(log.events());
    Ok(())
}
