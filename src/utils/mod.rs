pub mod persistence;

use std::{env, path::PathBuf, sync::Once};

use dirs::home_dir;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIR_NAME: &str = ".finance_core";
const HOME_ENV_VAR: &str = "FINANCE_CORE_HOME";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

        let directive = "finance_core=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into());
        let filter = EnvFilter::from_default_env().add_directive(directive);

        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.finance_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV_VAR) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
