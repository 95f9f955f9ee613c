//! Logging initialization.

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,reqwest=warn";

/// Initialize `env_logger`, honoring `RUST_LOG`
///
/// # Example
///
/// ```no_run
/// use wager_cli::logging;
///
/// logging::init();
/// log::info!("Driver starting");
/// ```
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format_target(false)
        .init();
}
