use log::LevelFilter;

/// Initialize logging for the command-line tool.
///
/// Logs go to stderr at `Info` level, or `Debug` when `debug_enabled` is set. An explicit
/// `RUST_LOG` takes precedence over both (e.g. `RUST_LOG=crossfill_core=trace` to watch every
/// search step).
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    // Ignore the error from a second initialization so tests and embedders can call this freely.
    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}
