use std::process::ExitCode;

use cooc_svd::Run;
use tracing::error;
use tracing_subscriber::EnvFilter;

// usage: cooc_svd <path to json config>

fn main() -> ExitCode {

    tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

    match Run::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
