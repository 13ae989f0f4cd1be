//! A minimal, zero-dependency logging crate for the `metaxis` runtime.
//!
//! This crate provides thread-safe leveled logging with automatic module path
//! detection. Every record that passes the level filter is handed to the
//! installed [`TracePrinter`]s. A colored [`ConsolePrinter`] is installed by
//! default; tests swap in a [`CapturePrinter`] to assert on diagnostics.
//!
//! Logging is a side channel: printers cannot report failure back to the
//! caller and a misbehaving printer never changes control flow.
//!
//! # Example
//!
//! ```
//! use metaxis_log::{error, warn, info, debug, Level};
//!
//! // Set the minimum log level
//! metaxis_log::set_level(Level::Debug);
//!
//! let class = "meta.Object";
//! info!("Registered {}", class);
//! debug!("Ancestors: {:?}", vec!["meta.MetaObject"]);
//! warn!("This is a warning");
//! error!("Invalid meta class name: {}", "bad name");
//! ```

use std::fmt::Arguments;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

/// Log levels representing the severity/priority of log messages.
///
/// `Levels` are ordered from most severe (Error) to least severe (Trace).
/// Lower numeric values indicate higher severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Error level - refused operations and broken invariants
    Error = 0,
    /// Warning level - potentially harmful situations
    Warn = 1,
    /// Info level - informational messages
    Info = 2,
    /// Debug level - detailed diagnostic information
    Debug = 3,
    /// Trace level - most detailed tracing information
    Trace = 4,
}

impl Level {
    /// Returns the ANSI color code for this log level.
    const fn color_code(&self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m", // Red
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Info => "\x1b[32m",  // Green
            Level::Debug => "\x1b[36m", // Cyan
            Level::Trace => "\x1b[35m", // Magenta
        }
    }

    /// Returns the string representation of this log level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            4 => Level::Trace,
            _ => Level::Info,
        }
    }

    /// Parses a string into a Level.
    ///
    /// # Example
    ///
    /// ```
    /// use metaxis_log::Level;
    ///
    /// assert_eq!(Level::from_str("error"), Ok(Level::Error));
    /// assert_eq!(Level::from_str("INFO"), Ok(Level::Info));
    /// assert!(Level::from_str("invalid").is_err());
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_uppercase().as_str() {
            "ERROR" => Ok(Level::Error),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            "TRACE" => Ok(Level::Trace),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

/// A single formatted log line as seen by a [`TracePrinter`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Severity of the record.
    pub level: Level,
    /// Module path of the call site.
    pub target: &'a str,
    /// The formatted message.
    pub message: &'a str,
}

/// Destination for log records.
///
/// Printers are called synchronously from the logging thread. They must not
/// panic; anything they fail to write is simply lost.
pub trait TracePrinter: Send + Sync {
    /// Writes one record.
    fn print(&self, record: &Record<'_>);
}

/// Default printer: colored `[LEVEL] target: message` lines on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrinter;

impl TracePrinter for ConsolePrinter {
    fn print(&self, record: &Record<'_>) {
        static RESET: &str = "\x1b[0m";

        let color = record.level.color_code();
        let level_str = record.level.as_str();
        println!("{color}[{level_str}]{RESET} {}: {}", record.target, record.message);
    }
}

/// Printer that keeps every message in memory.
///
/// Intended for tests that need to assert a diagnostic was (or was not)
/// reported.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use metaxis_log::{CapturePrinter, add_printer, remove_printer, error};
///
/// let capture = Arc::new(CapturePrinter::new());
/// let id = add_printer(capture.clone());
///
/// error!("Callable {} is already registered", "getName");
/// assert!(capture.contains("Callable getName is already registered"));
///
/// remove_printer(id);
/// ```
#[derive(Debug, Default)]
pub struct CapturePrinter {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CapturePrinter {
    /// Creates an empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every captured message, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|(_, message)| message.clone()).collect()
    }

    /// Returns the captured messages at exactly `level`.
    #[must_use]
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Returns true if any captured message equals `message`.
    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.lock().iter().any(|(_, m)| m == message)
    }

    /// Counts the captured messages equal to `message`.
    #[must_use]
    pub fn count(&self, message: &str) -> usize {
        self.lock().iter().filter(|(_, m)| m == message).count()
    }

    /// Discards everything captured so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TracePrinter for CapturePrinter {
    fn print(&self, record: &Record<'_>) {
        self.lock().push((record.level, record.message.to_owned()));
    }
}

/// Identifies an installed printer so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrinterId(u64);

type PrinterList = Vec<(PrinterId, Arc<dyn TracePrinter>)>;

/// The global logger instance.
///
/// This struct uses atomic operations for thread-safe level management.
/// It is intended to be used as a singleton via `get_logger()`.
pub struct Logger {
    level: AtomicU8,
    printers: RwLock<PrinterList>,
    next_printer: AtomicU64,
}

impl Logger {
    /// Creates a new logger with the specified minimum level and the console
    /// printer installed.
    fn new(level: Level) -> Self {
        let console: Arc<dyn TracePrinter> = Arc::new(ConsolePrinter);
        Logger {
            level: AtomicU8::new(level as u8),
            printers: RwLock::new(vec![(PrinterId(0), console)]),
            next_printer: AtomicU64::new(1),
        }
    }

    /// Sets the minimum log level.
    ///
    /// Messages below this level will not be logged.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current minimum log level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Checks if a message at the given level would be logged.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }

    /// Installs an additional printer.
    pub fn add_printer(&self, printer: Arc<dyn TracePrinter>) -> PrinterId {
        let id = PrinterId(self.next_printer.fetch_add(1, Ordering::Relaxed));
        self.printers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, printer));
        id
    }

    /// Removes a printer. Returns false if `id` was not installed.
    pub fn remove_printer(&self, id: PrinterId) -> bool {
        let mut printers = self.printers.write().unwrap_or_else(PoisonError::into_inner);
        let before = printers.len();
        printers.retain(|(existing, _)| *existing != id);
        printers.len() != before
    }

    /// Removes every printer, including the console printer.
    pub fn clear_printers(&self) {
        self.printers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the number of installed printers.
    pub fn printer_count(&self) -> usize {
        self.printers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn dispatch(&self, record: &Record<'_>) {
        // Snapshot so a printer that logs does not re-enter the lock.
        let printers: Vec<Arc<dyn TracePrinter>> = self
            .printers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, printer)| Arc::clone(printer))
            .collect();

        for printer in printers {
            printer.print(record);
        }
    }
}

/// Global logger singleton.
static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns a reference to the global logger instance.
///
/// This initializes the logger on first call with `Level::Info` as the default
/// level and the console printer installed.
///
/// # Example
///
/// ```
/// use metaxis_log::get_logger;
///
/// let logger = get_logger();
/// logger.set_level(metaxis_log::Level::Debug);
/// ```
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(Level::Info))
}

/// Sets the minimum log level for the global logger.
pub fn set_level(level: Level) {
    get_logger().set_level(level);
}

/// Sets the minimum log level from a string.
///
/// # Example
///
/// ```
/// use metaxis_log::set_level_from_str;
///
/// set_level_from_str("debug").unwrap();
/// ```
///
/// # Errors
///
/// Returns the parse error if `s` is not a level name.
pub fn set_level_from_str(s: &str) -> Result<(), String> {
    let level = Level::from_str(s)?;
    set_level(level);
    Ok(())
}

/// Installs a printer on the global logger.
pub fn add_printer(printer: Arc<dyn TracePrinter>) -> PrinterId {
    get_logger().add_printer(printer)
}

/// Removes a printer from the global logger.
pub fn remove_printer(id: PrinterId) -> bool {
    get_logger().remove_printer(id)
}

/// Removes every printer from the global logger.
pub fn clear_printers() {
    get_logger().clear_printers();
}

/// Internal function that performs the actual logging.
///
/// This function is called by the log macros after checking if the level is enabled.
#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments) {
    let logger = get_logger();
    if !logger.enabled(level) {
        return;
    }

    let message = args.to_string();
    logger.dispatch(&Record {
        level,
        target,
        message: &message,
    });
}

/// The primary logging macro.
///
/// Logs a message at the specified level. The macro automatically captures
/// the module path where it was called.
///
/// # Example
///
/// ```
/// use metaxis_log::{log, Level};
///
/// # metaxis_log::set_level(Level::Info);
/// log!(level: Level::Info, "This is an info message: {}", 42);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {
        {
            if $crate::get_logger().enabled($level) {
                $crate::__log_with_target(
                    $level,
                    module_path!(),
                    format_args!($($arg)*)
                );
            }
        }
    };
}

/// Logs a message at the Error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs a message at the Warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs a message at the Info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs a message at the Debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs a message at the Trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Info);
        assert!(Level::Info < Level::Debug);
        assert!(Level::Debug < Level::Trace);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!(Level::from_str("error"), Ok(Level::Error));
        assert_eq!(Level::from_str("WARN"), Ok(Level::Warn));
        assert_eq!(Level::from_str("warning"), Ok(Level::Warn));
        assert_eq!(Level::from_str(" Info "), Ok(Level::Info));
        assert_eq!(Level::from_str("DEBUG"), Ok(Level::Debug));
        assert_eq!(Level::from_str("trace"), Ok(Level::Trace));
        assert!(Level::from_str("invalid").is_err());
    }

    #[test]
    fn test_logger_level_filtering() {
        let logger = Logger::new(Level::Info);

        assert!(logger.enabled(Level::Error));
        assert!(logger.enabled(Level::Warn));
        assert!(logger.enabled(Level::Info));
        assert!(!logger.enabled(Level::Debug));
        assert!(!logger.enabled(Level::Trace));

        logger.set_level(Level::Trace);
        assert!(logger.enabled(Level::Trace));
        assert_eq!(logger.level(), Level::Trace);
    }

    #[test]
    fn test_printer_management() {
        let logger = Logger::new(Level::Info);
        assert_eq!(logger.printer_count(), 1);

        let capture = Arc::new(CapturePrinter::new());
        let id = logger.add_printer(capture.clone());
        assert_eq!(logger.printer_count(), 2);

        logger.dispatch(&Record {
            level: Level::Error,
            target: "tests",
            message: "hello",
        });
        assert!(capture.contains("hello"));
        assert_eq!(capture.messages_at(Level::Error), vec!["hello".to_string()]);

        assert!(logger.remove_printer(id));
        assert!(!logger.remove_printer(id));

        logger.clear_printers();
        assert_eq!(logger.printer_count(), 0);
    }

    #[test]
    fn test_capture_through_macros() {
        let capture = Arc::new(CapturePrinter::new());
        let id = add_printer(capture.clone());

        error!("capture test {}", 7);
        assert_eq!(capture.count("capture test 7"), 1);

        capture.clear();
        assert!(capture.messages().is_empty());
        remove_printer(id);
    }

    #[test]
    fn test_logging_from_a_printer_does_not_deadlock() {
        struct Echo;
        impl TracePrinter for Echo {
            fn print(&self, record: &Record<'_>) {
                if record.message == "echo me" {
                    trace!("echoed");
                }
            }
        }

        let id = add_printer(Arc::new(Echo));
        error!("echo me");
        remove_printer(id);
    }

    #[test]
    fn test_thread_safety() {
        use std::thread;

        let capture = Arc::new(CapturePrinter::new());
        let id = add_printer(capture.clone());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                thread::spawn(move || {
                    error!("thread-safety {}", i);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..10 {
            assert!(capture.contains(&format!("thread-safety {i}")));
        }
        remove_printer(id);
    }
}
