//! Verbosity levels and the output gate.
//!
//! | verbosity | structural | event (non-DEBUG) | event (DEBUG) |
//! |-----------|------------|-------------------|---------------|
//! | 0         | hidden     | hidden            | hidden        |
//! | 1         | shown      | hidden            | hidden        |
//! | 2         | shown      | shown             | hidden        |
//! | 3         | shown      | shown             | shown         |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output verbosity, always within `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Verbosity(u8);

impl Verbosity {
    pub const SILENT: Verbosity = Verbosity(0);
    pub const NORMAL: Verbosity = Verbosity(1);
    pub const VERBOSE: Verbosity = Verbosity(2);
    pub const DEBUG: Verbosity = Verbosity(3);

    pub const MAX: u8 = 3;

    pub fn new(level: i64) -> Result<Self> {
        match u8::try_from(level) {
            Ok(level) if level <= Self::MAX => Ok(Verbosity(level)),
            _ => Err(Error::InvalidConfiguration(format!(
                "verbosity must be between 0 and {}, got {level}",
                Self::MAX
            ))),
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_silent(self) -> bool {
        self.0 == 0
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<i64> for Verbosity {
    type Error = Error;

    fn try_from(level: i64) -> Result<Self> {
        Self::new(level)
    }
}

impl From<Verbosity> for u8 {
    fn from(v: Verbosity) -> u8 {
        v.0
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity tag attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    /// Theme key holding this severity's event style
    pub fn style_key(self) -> String {
        format!("event.{}", self.as_str())
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Severity::Debug => "🐛",
            Severity::Info => "ℹ️",
            Severity::Success => "✅",
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so width/alignment flags work: `{:<7}`
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "SUCCESS" => Ok(Severity::Success),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            _ => Err(Error::InvalidArgument(format!(
                "unknown severity '{s}', expected one of DEBUG, INFO, SUCCESS, WARNING, ERROR"
            ))),
        }
    }
}

/// What kind of output a call produces, for gating purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Headers, panels, tables, messages and every other non-event call
    Structural,
    Event(Severity),
}

/// Decide whether output of the given kind is emitted at `verbosity`.
pub fn should_emit(verbosity: Verbosity, output: Output) -> bool {
    match (verbosity.level(), output) {
        (0, _) => false,
        (_, Output::Structural) => true,
        (1, Output::Event(_)) => false,
        (2, Output::Event(severity)) => severity != Severity::Debug,
        (_, Output::Event(_)) => true,
    }
}
