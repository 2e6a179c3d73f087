//! Named debug loggers for the engine, the VM and the meta compiler.
//!
//! Loggers are switched on through the environment:
//! - `TOPDOWN_DEBUG=*` (or `1`, `true`) - every logger
//! - `TOPDOWN_DEBUG=engine` - a single logger
//! - `TOPDOWN_DEBUG=engine,meta` - several loggers
//!
//! `TOPDOWN_DEBUG_LEVEL` selects the verbosity (0-3, default 1).
//!
//! Debug output always goes to stderr. It is unrelated to the user visible
//! trace and timing modes of a session.

use std::cell::Cell;
use std::env;
use std::sync::OnceLock;

use hashbrown::HashSet;

// ============================================================================
// Configuration
// ============================================================================

const ENV_LOGGERS: &str = "TOPDOWN_DEBUG";
const ENV_LEVEL: &str = "TOPDOWN_DEBUG_LEVEL";

enum Selection {
    Nothing,
    Everything,
    Named(HashSet<String>),
}

struct DebugConfig {
    selection: Selection,
    level: u8,
}

static CONFIG: OnceLock<DebugConfig> = OnceLock::new();

fn config() -> &'static DebugConfig {
    CONFIG.get_or_init(|| {
        let selection = match env::var(ENV_LOGGERS).ok().as_deref() {
            None | Some("") | Some("0") => Selection::Nothing,
            Some("*") | Some("1") | Some("true") => Selection::Everything,
            Some(list) => {
                let names: HashSet<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    Selection::Nothing
                } else {
                    Selection::Named(names)
                }
            }
        };
        let level = env::var(ENV_LEVEL)
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok())
            .map_or(1, |v| v.min(3));
        DebugConfig { selection, level }
    })
}

fn selected(name: &str) -> bool {
    match &config().selection {
        Selection::Nothing => false,
        Selection::Everything => true,
        Selection::Named(names) => names.contains(name),
    }
}

// ============================================================================
// Logger
// ============================================================================

/// A named stderr logger with a nesting indent.
///
/// Loggers belong to single threaded owners (a session, one parse run), so
/// the indent is a plain `Cell`.
pub struct Logger {
    name: &'static str,
    enabled: bool,
    depth: Cell<usize>,
}

impl Logger {
    /// A logger that never prints.
    pub const fn disabled() -> Self {
        Self { name: "", enabled: false, depth: Cell::new(0) }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn write(&self, level: u8, marker: &str, msg: &str) {
        if self.enabled && config().level >= level {
            let pad = "  ".repeat(self.depth.get());
            eprintln!("{}[{}] {}{}", pad, self.name, marker, msg);
        }
    }

    #[inline]
    pub fn log(&self, msg: &str) {
        self.write(1, "", msg);
    }

    #[inline]
    pub fn detail(&self, msg: &str) {
        self.write(2, "", msg);
    }

    #[inline]
    pub fn success(&self, msg: &str) {
        self.write(1, "ok: ", msg);
    }

    #[inline]
    pub fn fail(&self, msg: &str) {
        self.write(1, "fail: ", msg);
    }

    #[inline]
    pub fn push_indent(&self) {
        if self.enabled {
            self.depth.set(self.depth.get() + 1);
        }
    }

    #[inline]
    pub fn pop_indent(&self) {
        if self.enabled {
            self.depth.set(self.depth.get().saturating_sub(1));
        }
    }
}

/// Create the logger called `name`; it is active only if selected by
/// `TOPDOWN_DEBUG`.
pub fn create_logger(name: &'static str) -> Logger {
    Logger {
        name,
        enabled: selected(name),
        depth: Cell::new(0),
    }
}

// ============================================================================
// Macros - the message is only formatted when the logger is active
// ============================================================================

#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.log(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_detail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.detail(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.success(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_fail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.fail(&format!($($arg)*));
        }
    };
}
