//! Leveled logging for the Tachyon kernel ecosystem.
//!
//! Subsystem crates log through the [`klog!`] macro family; the actual
//! output path is a process-global sink function installed once by the
//! platform (early serial, later the full console). Until a sink is
//! installed, records are silently discarded, so library crates may log
//! unconditionally.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

/// Log record severity. Lower discriminant = more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Something failed; the system may continue degraded.
    Error = 0,
    /// Unexpected condition, not necessarily a failure.
    Warn = 1,
    /// High-level progress messages.
    Info = 2,
    /// Detailed diagnostics.
    Debug = 3,
    /// Very verbose tracing.
    Trace = 4,
}

impl LogLevel {
    /// Fixed-width human-readable name for aligned output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Error,
            1 => Self::Warn,
            2 => Self::Info,
            3 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

/// Signature of the global log sink.
///
/// Receives the record's level, the `module_path!()` of the call site, and
/// the pre-formatted arguments.
pub type LogSink = fn(LogLevel, &str, fmt::Arguments<'_>);

fn discard(_level: LogLevel, _target: &str, _args: fmt::Arguments<'_>) {}

static SINK: AtomicPtr<()> = AtomicPtr::new(discard as *mut ());
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Installs the global log sink.
///
/// May be called more than once (e.g. once for early serial, once for the
/// full logger); later installations replace earlier ones.
pub fn set_sink(sink: LogSink) {
    SINK.store(sink as *mut (), Ordering::Release);
}

/// Sets the most verbose level that will be forwarded to the sink.
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current verbosity ceiling.
pub fn max_level() -> LogLevel {
    LogLevel::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

/// Returns whether a record at `level` would currently be emitted.
#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level <= max_level()
}

/// Forwards one record to the installed sink. Not called directly; use the
/// [`klog!`] macros.
#[doc(hidden)]
pub fn dispatch(level: LogLevel, target: &str, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let ptr = SINK.load(Ordering::Acquire);
    // SAFETY: only valid `LogSink` function pointers (or the initial
    // `discard`) are ever stored into SINK.
    let sink: LogSink = unsafe { core::mem::transmute(ptr) };
    sink(level, target, args);
}

/// Logs a formatted record at an explicit [`LogLevel`].
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::dispatch($level, core::module_path!(), core::format_args!($($arg)*))
    };
}

/// Logs at [`LogLevel::Error`].
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Error, $($arg)*) };
}

/// Logs at [`LogLevel::Warn`].
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs at [`LogLevel::Info`].
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Info, $($arg)*) };
}

/// Logs at [`LogLevel::Debug`].
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs at [`LogLevel::Trace`].
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Trace, $($arg)*) };
}
