//! Bridge from the `log` facade into console events.
//!
//! Records are rendered through [`ConsoleUtils::event`], so they obey the
//! console's verbosity gate, theme and timestamp settings.
//!
//! ```no_run
//! use std::sync::Arc;
//! use prettiprint::{ConsoleConfig, ConsoleLogger, ConsoleUtils};
//!
//! let console = Arc::new(ConsoleUtils::new(ConsoleConfig::default()));
//! ConsoleLogger::new(Arc::clone(&console)).install().unwrap();
//! log::warn!("disk almost full");
//! ```

use std::sync::Arc;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::console_utils::ConsoleUtils;
use crate::verbosity::Severity;

/// Records from these targets are dropped to avoid feeding the console's
/// own diagnostics back into it.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

pub struct ConsoleLogger {
    console: Arc<ConsoleUtils>,
    level: LevelFilter,
}

impl ConsoleLogger {
    pub fn new(console: Arc<ConsoleUtils>) -> Self {
        Self {
            console,
            level: LevelFilter::Trace,
        }
    }

    /// Drop records above `level` before they reach the console.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Install as the global logger.
    ///
    /// Fails when another logger has already been set.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

pub(crate) fn severity_for(level: Level) -> Severity {
    match level {
        Level::Trace | Level::Debug => Severity::Debug,
        Level::Info => Severity::Info,
        Level::Warn => Severity::Warning,
        Level::Error => Severity::Error,
    }
}

fn is_own(target: &str) -> bool {
    target == OWN_TARGET || target.starts_with(&format!("{OWN_TARGET}::"))
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && !is_own(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.console
            .event(&record.args().to_string(), severity_for(record.level()));
    }

    fn flush(&self) {}
}
