use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger. `RUST_LOG` overrides the level picked from
/// `verbose`.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    // Already-set loggers are fine; tests may call this repeatedly.
    let _ = builder.try_init();
}
