//! Themed, verbosity-aware terminal output.
//!
//! [`ConsoleUtils`] is a facade over a [`Renderer`]: it resolves semantic
//! style keys through a [`Theme`], filters output through a [`Verbosity`]
//! gate, masks secrets and manages scoped spinners and progress displays.
//!
//! ```no_run
//! use prettiprint::{ConsoleConfig, ConsoleUtils, Severity};
//!
//! let console = ConsoleUtils::new(ConsoleConfig::default());
//! console.header("Deploy", None);
//! console.success("Build finished");
//! console.event("cache warmed", Severity::Info);
//! ```

pub mod config;
pub mod console_utils;
pub mod error;
pub mod logger;
pub mod mask;
pub mod render;
pub mod scope;
pub mod testing;
pub mod theme;
pub mod verbosity;

pub use config::ConsoleConfig;
pub use console_utils::{ConsoleUtils, KeyValueOptions, PanelOptions, TableOptions};
pub use error::{Error, Result};
pub use logger::ConsoleLogger;
pub use mask::mask_secret;
pub use render::{
    BoxStyle, Line, Padding, ProgressOptions, Renderer, Spacing, TaskId, TaskUpdate,
    TerminalRenderer,
};
pub use scope::{ProgressGuard, StatusGuard};
pub use theme::{StyleMap, Theme, ThemeName};
pub use verbosity::{Severity, Verbosity};
