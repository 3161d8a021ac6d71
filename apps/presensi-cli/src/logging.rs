//! Log output on stderr

use tracing_subscriber::EnvFilter;

/// Filter for a `-v` count. `RUST_LOG` overrides it.
pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "info,presensi_query=debug,presensi_cli=debug",
        _ => "trace",
    }
}

/// Initialize compact logging on stderr. Safe to call more than once.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(verbose)));

    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .with_env_filter(filter)
        .try_init();
}
