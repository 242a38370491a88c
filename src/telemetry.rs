use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Default log filter for a `-v` count: warnings only, then info, then debug.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global fmt subscriber. `RUST_LOG`, when set and valid, wins over `-v`.
pub fn init(verbose: u8) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = level_for_verbosity(verbose);
            EnvFilter::try_new(level).map_err(|err| anyhow!("invalid log filter '{level}': {err}"))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}
