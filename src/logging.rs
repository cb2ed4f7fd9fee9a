//! Inicialização do sistema de logs (`tracing` + `tracing-subscriber`).
//!
//! `RUST_LOG` controls the filter; without it the level is `info`, or `debug`
//! when `--verbose` is passed.

use tracing_subscriber::{EnvFilter, fmt};

pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs vão para stderr; a saída do relatório fica no stdout.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Detailed logging captured by the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
