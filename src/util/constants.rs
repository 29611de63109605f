// logtriage - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logtriage";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "logtriage";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Junk detection thresholds
// =============================================================================

/// A line whose NUL-character fraction strictly exceeds this is junk.
pub const JUNK_MAX_NUL_FRACTION: f64 = 0.5;

/// Minimum line length before the visible-character density check applies.
/// Short lines are never junked on density alone.
pub const JUNK_DENSITY_MIN_LEN: usize = 20;

/// A line longer than `JUNK_DENSITY_MIN_LEN` whose visible-character
/// fraction falls below this is junk ("long but mostly invisible").
pub const JUNK_MIN_VISIBLE_FRACTION: f64 = 0.1;

// =============================================================================
// Live tail limits
// =============================================================================

/// How often the tail watcher polls the file for new content (ms).
pub const TAIL_POLL_INTERVAL_MS: u64 = 500;

/// How often the cancel flag is checked within each poll sleep interval (ms).
/// The background thread wakes every this many ms to check for cancellation.
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 100;

/// Minimum user-configurable tail poll interval (ms).
pub const MIN_TAIL_POLL_INTERVAL_MS: u64 = 100;

/// Maximum user-configurable tail poll interval (ms).
pub const MAX_TAIL_POLL_INTERVAL_MS: u64 = 10_000; // 10 s

/// Maximum bytes read from the tailed file in one poll tick.
/// Prevents a large burst of new content from stalling the poll loop;
/// the remainder is picked up on subsequent ticks.
pub const MAX_TAIL_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Maximum accumulated size of the partial (in-progress) line buffer.
/// Bounds memory when a tailed file produces no newlines at all, e.g.
/// binary content or a single extremely long line. Lines up to four
/// read caps survive intact; beyond that the fragment is discarded
/// with a warning.
pub const MAX_TAIL_PARTIAL_BYTES: usize = MAX_TAIL_READ_BYTES_PER_TICK * 4; // 2 MiB

// =============================================================================
// Output naming
// =============================================================================

/// File extension used by extended-mode category files.
pub const EXTENDED_OUTPUT_EXT: &str = "log";

/// File extension used by legacy-mode category files.
pub const LEGACY_OUTPUT_EXT: &str = "txt";

/// Suffix appended to the input stem when cleaning to a copy.
pub const CLEANED_COPY_SUFFIX: &str = "_cleaned";

/// Maximum numeric suffix tried when de-duplicating an output path
/// before falling back to a process-unique name.
pub const MAX_UNIQUE_PATH_ATTEMPTS: u32 = 1_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
