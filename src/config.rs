//! Configuração dos limites das regras de negócio, carregada de `demandas.toml`.
//!
//! A struct [`Config`] contém os três parâmetros ajustáveis usados pelo motor.
//! Não existe instância global: o valor é passado por referência para a fábrica,
//! para as demandas e para o avaliador de frequência. Valores ausentes no arquivo
//! usam os padrões compilados. Variáveis de ambiente `DEMANDAS_*` têm precedência
//! sobre o arquivo.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::EscolaError;

/// Arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "demandas.toml";

/// Parâmetros de regra de negócio ajustáveis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Percentual mínimo de presença mensal (RN02).
    #[serde(rename = "frequencia_minima", default = "default_min_attendance")]
    pub min_attendance: f64,

    /// Limite inferior para detecção de lacunas de aprendizado (RN03).
    #[serde(rename = "indice_lacuna_minimo", default = "default_min_gap_index")]
    pub min_gap_index: f64,

    /// Teto orçamentário de uma demanda antes de exigir licitação (RN04).
    #[serde(rename = "limite_custo_demanda", default = "default_max_demand_cost")]
    pub max_demand_cost: f64,
}

fn default_min_attendance() -> f64 {
    0.75
}

fn default_min_gap_index() -> f64 {
    0.30
}

fn default_max_demand_cost() -> f64 {
    15000.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_attendance: default_min_attendance(),
            min_gap_index: default_min_gap_index(),
            max_demand_cost: default_max_demand_cost(),
        }
    }
}

/// The three recognized parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    MinAttendance,
    MinGapIndex,
    MaxDemandCost,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [
        Parameter::MinAttendance,
        Parameter::MinGapIndex,
        Parameter::MaxDemandCost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::MinAttendance => "FREQUENCIA_MINIMA",
            Parameter::MinGapIndex => "INDICE_LACUNA_MINIMO",
            Parameter::MaxDemandCost => "LIMITE_CUSTO_DEMANDA",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            Parameter::MinAttendance => "DEMANDAS_FREQUENCIA_MINIMA",
            Parameter::MinGapIndex => "DEMANDAS_INDICE_LACUNA_MINIMO",
            Parameter::MaxDemandCost => "DEMANDAS_LIMITE_CUSTO",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = EscolaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| EscolaError::UnknownParameter(s.to_string()))
    }
}

/// A value handed to [`Config::set_parameter`].
///
/// Only the numeric variants are accepted; the others exist so callers feeding
/// untyped input (env vars, forms) get a `TypeMismatch` instead of a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Integer(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
            ParamValue::Bool(_) => "bool",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(_) | ParamValue::Bool(_) => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl Config {
    /// Carrega a configuração de `demandas.toml` no diretório atual.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração do caminho informado.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config = toml::from_str::<Config>(&contents).map_err(EscolaError::from)?;
            for param in Parameter::ALL {
                check_finite(param, *config.slot(param))?;
            }
            config
        } else {
            Self::default()
        };

        // Variáveis de ambiente têm precedência sobre o arquivo.
        config.apply_overrides(|name| std::env::var(name).ok())?;

        tracing::debug!(?config, path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Aplica substituições vindas de uma fonte chave/valor (normalmente o ambiente).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EscolaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for param in Parameter::ALL {
            let Some(raw) = lookup(param.env_var()) else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let value = match raw.parse::<f64>() {
                Ok(v) => ParamValue::Float(v),
                Err(_) => ParamValue::Text(raw.to_string()),
            };
            self.set_parameter(param.name(), value)?;
        }
        Ok(())
    }

    /// Atualiza um parâmetro pelo nome (sem distinção de maiúsculas).
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<(), EscolaError> {
        let param: Parameter = name.parse()?;
        let value = value.into();
        let number = value.as_number().ok_or(EscolaError::TypeMismatch {
            parameter: param.name(),
            found: value.kind(),
        })?;
        check_finite(param, number)?;

        *self.slot_mut(param) = number;
        tracing::info!(parameter = %param, value = number, "parameter updated");
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Result<f64, EscolaError> {
        let param: Parameter = name.parse()?;
        Ok(*self.slot(param))
    }

    /// Restaura os padrões compilados.
    pub fn reset_defaults(&mut self) {
        *self = Self::default();
    }

    fn slot(&self, param: Parameter) -> &f64 {
        match param {
            Parameter::MinAttendance => &self.min_attendance,
            Parameter::MinGapIndex => &self.min_gap_index,
            Parameter::MaxDemandCost => &self.max_demand_cost,
        }
    }

    fn slot_mut(&mut self, param: Parameter) -> &mut f64 {
        match param {
            Parameter::MinAttendance => &mut self.min_attendance,
            Parameter::MinGapIndex => &mut self.min_gap_index,
            Parameter::MaxDemandCost => &mut self.max_demand_cost,
        }
    }
}

/// NaN or infinite thresholds would make every comparison against them false.
fn check_finite(param: Parameter, value: f64) -> Result<(), EscolaError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EscolaError::InvalidField {
            field: param.name(),
            reason: format!("{value} is not a finite number"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.min_attendance, 0.75);
        assert_eq!(config.min_gap_index, 0.30);
        assert_eq!(config.max_demand_cost, 15000.0);
    }

    #[test]
    fn set_parameter_is_case_insensitive_and_accepts_integers() {
        let mut config = Config::default();
        config.set_parameter("limite_custo_demanda", 20000).unwrap();
        assert_eq!(config.max_demand_cost, 20000.0);

        config.set_parameter("Frequencia_Minima", 0.6).unwrap();
        assert_eq!(config.min_attendance, 0.6);
    }

    #[test]
    fn set_parameter_rejects_unknown_names() {
        let mut config = Config::default();
        for name in ["unknown", "", "_instancia", "LIMITE", "frequencia"] {
            let err = config.set_parameter(name, 1).unwrap_err();
            assert!(matches!(err, EscolaError::UnknownParameter(_)), "{name}");
        }
        assert_eq!(config, Config::default());
    }

    #[test]
    fn set_parameter_rejects_non_numeric_values() {
        let mut config = Config::default();
        let err = config.set_parameter("FREQUENCIA_MINIMA", "alto").unwrap_err();
        assert!(matches!(
            err,
            EscolaError::TypeMismatch {
                parameter: "FREQUENCIA_MINIMA",
                found: "text"
            }
        ));
        let err = config.set_parameter("INDICE_LACUNA_MINIMO", true).unwrap_err();
        assert!(matches!(err, EscolaError::TypeMismatch { found: "bool", .. }));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reset_defaults_restores_everything() {
        let mut config = Config::default();
        config.set_parameter("FREQUENCIA_MINIMA", 0.1).unwrap();
        config.set_parameter("INDICE_LACUNA_MINIMO", 0.9).unwrap();
        config.set_parameter("LIMITE_CUSTO_DEMANDA", 1).unwrap();

        config.reset_defaults();
        assert_eq!(config, Config::default());
        config.reset_defaults();
        assert_eq!(config.min_attendance, 0.75);
        assert_eq!(config.min_gap_index, 0.30);
        assert_eq!(config.max_demand_cost, 15000.0);
    }

    #[test]
    fn parameter_reads_by_name() {
        let config = Config::default();
        assert_eq!(config.parameter("limite_custo_demanda").unwrap(), 15000.0);
        assert!(config.parameter("nope").is_err());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            limite_custo_demanda = 30000.0
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_demand_cost, 30000.0);
        assert_eq!(config.min_attendance, 0.75);
        assert_eq!(config.min_gap_index, 0.30);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandas.toml");
        std::fs::write(&path, "frequencia_minima = 0.8\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.min_attendance, 0.8);
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.max_demand_cost, 15000.0);
    }

    #[test]
    fn overrides_take_precedence() {
        let env: HashMap<&str, &str> = [("DEMANDAS_LIMITE_CUSTO", "5000")].into();
        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.max_demand_cost, 5000.0);
        assert_eq!(config.min_attendance, 0.75);
    }

    #[test]
    fn malformed_override_is_a_type_mismatch() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == "DEMANDAS_FREQUENCIA_MINIMA").then(|| "muito".to_string()))
            .unwrap_err();
        assert!(matches!(err, EscolaError::TypeMismatch { .. }));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut config = Config::default();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = config.set_parameter("LIMITE_CUSTO_DEMANDA", value).unwrap_err();
            assert!(
                matches!(err, EscolaError::InvalidField { field: "LIMITE_CUSTO_DEMANDA", .. }),
                "{value}"
            );
        }
        for raw in ["NaN", "inf", "-infinity"] {
            let err = config
                .apply_overrides(|k| (k == "DEMANDAS_LIMITE_CUSTO").then(|| raw.to_string()))
                .unwrap_err();
            assert!(matches!(err, EscolaError::InvalidField { .. }), "{raw}");
        }
        assert_eq!(config, Config::default());
    }

    #[test]
    fn non_finite_value_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandas.toml");
        std::fs::write(&path, "limite_custo_demanda = nan\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
