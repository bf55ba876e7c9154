//! Minimal `log` backend for the generator: one line per record on stderr.
//!
//! ```text
//! [INFO] gen_init_policy::vector: reloading vl
//! ```

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fmt;
use std::io::Write;

pub struct GenLogger {
    max_level: LevelFilter,
}

impl GenLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Install as the global logger. Call once; later calls fail.
    ///
    /// # Errors
    /// A logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Default for GenLogger {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

/// `[LEVEL] target: message`
pub struct Line<'a, 'r>(pub &'a Record<'r>);

impl fmt::Display for Line<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.0.level(),
            self.0.target(),
            self.0.args()
        )
    }
}

impl Log for GenLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // A closed stderr is not worth aborting generation over.
        let _ = writeln!(std::io::stderr().lock(), "{}", Line(record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
