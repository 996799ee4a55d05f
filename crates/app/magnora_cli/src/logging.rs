use magnora_core::Environment;
use tracing_subscriber::EnvFilter;

use crate::Error;

fn default_filter(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "info,magnora_core=info",
        Environment::Development => "debug",
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries JSON output.
pub fn init(environment: Environment) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Custom(format!("failed to initialise logging: {e}")))
}
