//! Logging setup driven by the `verbose` and `trace` agent options.
//!
//! Output goes through the `log` facade with `env_logger` as the backend.
//! `RUST_LOG` still wins over the level derived from the options.

use std::sync::atomic::{AtomicU8, Ordering};

use log::LevelFilter;

use crate::options::OptionTable;

/// Which side of a traced call gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    #[default]
    None,
    Before,
    After,
    All,
}

impl TraceMode {
    /// Parses the value of the `trace` option.
    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "none" => Some(TraceMode::None),
            "before" => Some(TraceMode::Before),
            "after" => Some(TraceMode::After),
            "all" => Some(TraceMode::All),
            _ => None,
        }
    }

    pub fn traces_before(self) -> bool {
        matches!(self, TraceMode::Before | TraceMode::All)
    }

    pub fn traces_after(self) -> bool {
        matches!(self, TraceMode::After | TraceMode::All)
    }

    fn to_raw(self) -> u8 {
        match self {
            TraceMode::None => 0,
            TraceMode::Before => 1,
            TraceMode::After => 2,
            TraceMode::All => 3,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => TraceMode::Before,
            2 => TraceMode::After,
            3 => TraceMode::All,
            _ => TraceMode::None,
        }
    }
}

static TRACE_MODE: AtomicU8 = AtomicU8::new(0);

pub fn trace_mode() -> TraceMode {
    TraceMode::from_raw(TRACE_MODE.load(Ordering::Relaxed))
}

pub fn set_trace_mode(mode: TraceMode) {
    TRACE_MODE.store(mode.to_raw(), Ordering::Relaxed);
}

/// Default level for a parsed option table.
pub fn level_for(options: &OptionTable) -> LevelFilter {
    if options.trace_mode() != TraceMode::None {
        LevelFilter::Trace
    } else if options.is_verbose() {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Installs the logger and the process-wide trace mode.
///
/// Safe to call more than once: a logger that is already installed is kept,
/// only the trace mode is updated.
pub fn init(options: &OptionTable) {
    set_trace_mode(options.trace_mode());

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_for(options));
    builder.parse_default_env();

    if builder.try_init().is_err() {
        log::debug!("logger already initialized, keeping it");
    }
}

/// Runs `f`, logging the call before and/or after as the trace mode asks.
pub fn traced<T, E, F>(label: &str, f: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    let mode = trace_mode();
    if mode.traces_before() {
        log::trace!(">> {}", label);
    }
    let result = f();
    if mode.traces_after() {
        match &result {
            Ok(_) => log::trace!("<< {}: ok", label),
            Err(e) => log::trace!("<< {}: {}", label, e),
        }
    }
    result
}
