// logtriage - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr. Never logs file contents at info level or above —
// boot logs may contain serial numbers and other machine identifiers.

use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = match directive(debug_flag, config_level) {
        Some(d) => EnvFilter::new(d),
        None => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}

/// Select the filter directive. `None` means defer to `RUST_LOG`.
fn directive(debug_flag: bool, config_level: Option<&str>) -> Option<String> {
    if std::env::var("RUST_LOG").is_ok() {
        None
    } else if debug_flag {
        Some("debug".to_string())
    } else if let Some(level) = config_level {
        Some(level.to_string())
    } else {
        Some(super::constants::DEFAULT_LOG_LEVEL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because the cases share RUST_LOG, which is
    // process-global state.
    #[test]
    fn directive_priority_order() {
        std::env::remove_var("RUST_LOG");

        // CLI --debug outranks the config level.
        assert_eq!(directive(true, Some("warn")), Some("debug".to_string()));
        // Config level outranks the default.
        assert_eq!(directive(false, Some("warn")), Some("warn".to_string()));
        // Default when nothing else is set.
        assert_eq!(
            directive(false, None),
            Some(super::super::constants::DEFAULT_LOG_LEVEL.to_string())
        );

        // RUST_LOG outranks everything: defer to the environment.
        std::env::set_var("RUST_LOG", "trace");
        assert_eq!(directive(true, Some("warn")), None);
        std::env::remove_var("RUST_LOG");
    }
}
