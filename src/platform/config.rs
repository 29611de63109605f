// logtriage - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::junk::JunkPolicy;
use crate::core::split::NamingMode;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for logtriage configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logtriage/ or %APPDATA%\logtriage\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[junk]` section.
    pub junk: JunkSection,
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[junk]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct JunkSection {
    /// NUL fraction above which a line is junk (0.0-1.0).
    pub max_nul_fraction: Option<f64>,
    /// Minimum line length for the visible-density check.
    pub density_min_len: Option<usize>,
    /// Visible fraction below which a long line is junk (0.0-1.0).
    pub min_visible_fraction: Option<f64>,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Poll interval in milliseconds.
    pub poll_interval_ms: Option<u64>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Naming mode: "extended" or "legacy".
    pub mode: Option<String>,
    /// Legacy mode only: fold info/debug/platform-info into other.txt.
    pub fold_extra: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Junk detection thresholds.
    pub junk: JunkPolicy,

    /// Tail poll interval in milliseconds.
    pub tail_poll_interval_ms: u64,

    /// Default output naming mode (the CLI can override per run).
    pub naming_mode: NamingMode,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            junk: JunkPolicy::default(),
            tail_poll_interval_ms: constants::TAIL_POLL_INTERVAL_MS,
            naming_mode: NamingMode::Extended,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no
/// warnings (first-run). If the file is unparseable, returns defaults
/// with an error warning -- the application still starts but the user
/// is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, mut validation_warnings) = validate(raw);
    warnings.append(&mut validation_warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all errors.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Junk: max_nul_fraction --
    if let Some(fraction) = raw.junk.max_nul_fraction {
        if (0.0..=1.0).contains(&fraction) {
            config.junk.max_nul_fraction = fraction;
        } else {
            warnings.push(format!(
                "[junk] max_nul_fraction = {fraction} is out of range (0.0-1.0). Using default ({}).",
                constants::JUNK_MAX_NUL_FRACTION,
            ));
        }
    }

    // -- Junk: density_min_len --
    if let Some(len) = raw.junk.density_min_len {
        // Any positive length is acceptable; 0 would junk every line
        // that fails the density test regardless of length.
        if len > 0 {
            config.junk.density_min_len = len;
        } else {
            warnings.push(format!(
                "[junk] density_min_len = 0 is not allowed. Using default ({}).",
                constants::JUNK_DENSITY_MIN_LEN,
            ));
        }
    }

    // -- Junk: min_visible_fraction --
    if let Some(fraction) = raw.junk.min_visible_fraction {
        if (0.0..=1.0).contains(&fraction) {
            config.junk.min_visible_fraction = fraction;
        } else {
            warnings.push(format!(
                "[junk] min_visible_fraction = {fraction} is out of range (0.0-1.0). Using default ({}).",
                constants::JUNK_MIN_VISIBLE_FRACTION,
            ));
        }
    }

    // -- Tail: poll_interval_ms --
    if let Some(interval) = raw.tail.poll_interval_ms {
        if (constants::MIN_TAIL_POLL_INTERVAL_MS..=constants::MAX_TAIL_POLL_INTERVAL_MS)
            .contains(&interval)
        {
            config.tail_poll_interval_ms = interval;
        } else {
            warnings.push(format!(
                "[tail] poll_interval_ms = {interval} is out of range ({}-{}). Using default ({}).",
                constants::MIN_TAIL_POLL_INTERVAL_MS,
                constants::MAX_TAIL_POLL_INTERVAL_MS,
                constants::TAIL_POLL_INTERVAL_MS,
            ));
        }
    }

    // -- Output: mode / fold_extra --
    let fold_extra = raw.output.fold_extra.unwrap_or(false);
    if let Some(ref mode) = raw.output.mode {
        match mode.to_lowercase().as_str() {
            "extended" => config.naming_mode = NamingMode::Extended,
            "legacy" => config.naming_mode = NamingMode::Legacy { fold_extra },
            other => {
                warnings.push(format!(
                    "[output] mode = \"{other}\" is not recognised. \
                     Expected \"extended\" or \"legacy\". Using default (extended).",
                ));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).unwrap())
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.tail_poll_interval_ms, constants::TAIL_POLL_INTERVAL_MS);
        assert_eq!(config.naming_mode, NamingMode::Extended);
    }

    #[test]
    fn valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [junk]
            max_nul_fraction = 0.7
            [tail]
            poll_interval_ms = 250
            [output]
            mode = "legacy"
            fold_extra = true
            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty());
        assert_eq!(config.junk.max_nul_fraction, 0.7);
        assert_eq!(config.tail_poll_interval_ms, 250);
        assert_eq!(config.naming_mode, NamingMode::Legacy { fold_extra: true });
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            r#"
            [junk]
            max_nul_fraction = 1.5
            [tail]
            poll_interval_ms = 5
            [output]
            mode = "fancy"
            "#,
        );
        assert_eq!(warnings.len(), 3);
        assert_eq!(config.junk.max_nul_fraction, constants::JUNK_MAX_NUL_FRACTION);
        assert_eq!(config.tail_poll_interval_ms, constants::TAIL_POLL_INTERVAL_MS);
        assert_eq!(config.naming_mode, NamingMode::Extended);
    }
}
