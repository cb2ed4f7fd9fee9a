//! Interface de linha de comando baseada em clap.
//!
//! Subcomandos `demo`, `avaliar` e `config`, com flags globais
//! `--config` e `--verbose`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Motor de regras de demandas escolares municipais.
#[derive(Debug, Parser)]
#[command(name = "escola-demandas", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./demandas.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita logs detalhados.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa o fluxo de integração da RN02 com dados em memória.
    Demo,

    /// Avalia a frequência mensal de uma turma carregada de um arquivo JSON.
    Avaliar {
        /// Arquivo JSON com a turma (aulas e alunos matriculados).
        ///
        /// If `school` is only an id, the generated demand has no municipality
        /// and no manager or secretary can process it.
        #[arg(long)]
        arquivo: PathBuf,

        /// Mês a avaliar (1-12).
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        mes: u8,
    },

    /// Mostra a configuração efetiva.
    Config,
}
