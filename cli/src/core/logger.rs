use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static LOGGER: OnceLock<Logger> = OnceLock::new();

pub struct Logger {
    debug: bool,
}

impl Logger {
    /// Installs the global tracing subscriber. `RUST_LOG` wins over the flag.
    pub fn init(debug: bool) {
        let _ = LOGGER.get_or_init(|| {
            let default_level = if debug { "debug" } else { "warn" };
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
            Logger { debug }
        });
    }

    pub fn is_debug() -> bool {
        LOGGER.get().map(|logger| logger.debug).unwrap_or(false)
    }
}
