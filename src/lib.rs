//! Motor de regras de escalonamento de demandas escolares municipais.
//!
//! Turns attendance and cost data into governed demands:
//!
//! - [`config::Config`] holds the tunable thresholds.
//! - [`demand`] defines the pedagogical and infrastructure demands and their
//!   status/priority state machine.
//! - [`factory::DemandFactory`] is the only way to create a demand.
//! - [`attendance::AttendanceEvaluator`] aggregates monthly attendance and
//!   opens a pedagogical demand when a class falls below the threshold.
//! - [`admin`] has the manager and secretary actors that process demands.

pub mod admin;
pub mod attendance;
pub mod config;
pub mod demand;
pub mod error;
pub mod factory;
pub mod logging;
pub mod school;

pub use config::Config;
pub use error::{EscolaError, Result};
