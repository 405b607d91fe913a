use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Maps `-q` and the `-v` count onto a level filter.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber: compact stderr output plus an optional plain-text log file.
///
/// `RUST_LOG`, when set, takes precedence over the command-line verbosity.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let level = level_for(verbosity, quiet);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(&path).map_err(CliError::Io)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(3, true), LevelFilter::OFF);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("Solver diverged");
        warn!(retry = 1, "Coarse step overshot, retrying");
        info!(atoms = 1289, "Shape carved");
        debug!(distance = 4.21, "Fine step");
        trace!("Cell grid built");
    }

    #[test]
    #[serial]
    fn file_layer_writes_structured_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nanogeom.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!(atoms = 42, "Carved structure.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Carved structure."));
        assert!(content.contains("atoms=42"));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
