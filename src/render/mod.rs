//! The renderer boundary.
//!
//! [`ConsoleUtils`](crate::ConsoleUtils) never draws anything itself. It
//! resolves styles, applies the verbosity gate and hands structured data to a
//! [`Renderer`]. [`TerminalRenderer`] draws to a real terminal;
//! [`RecordingRenderer`](crate::testing::RecordingRenderer) captures calls for
//! tests.

mod boxes;
mod highlight;
mod markdown;
mod progress;
mod style;
mod tables;
mod terminal;
mod text;

use std::any::Any;
use std::io;
use std::panic::Location;
use std::str::FromStr;

use crate::error::{Error, Result};

pub use boxes::BoxStyle;
pub use style::Painter;
pub use terminal::TerminalRenderer;

/// A run of text sharing one style descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    /// `None` renders with the renderer's default style
    pub style: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: Option<&str>) -> Self {
        Self {
            text: text.into(),
            style: style.map(str::to_string),
        }
    }
}

/// One line of output made of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::plain(text)],
        }
    }

    pub fn styled(text: impl Into<String>, style: Option<&str>) -> Self {
        Self {
            spans: vec![Span::styled(text, style)],
        }
    }

    pub fn push(mut self, text: impl Into<String>, style: Option<&str>) -> Self {
        self.spans.push(Span::styled(text, style));
        self
    }

    /// Text without any styling
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }
}

/// Inner panel padding in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

impl Padding {
    pub const fn new(top: usize, right: usize, bottom: usize, left: usize) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(n: usize) -> Self {
        Self::new(n, n, n, n)
    }

    /// Vertical and horizontal padding
    pub const fn symmetric(vertical: usize, horizontal: usize) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Build from one, two or four values, CSS style.
    pub fn from_values(values: &[usize]) -> Result<Self> {
        match *values {
            [n] => Ok(Self::uniform(n)),
            [v, h] => Ok(Self::symmetric(v, h)),
            [top, right, bottom, left] => Ok(Self::new(top, right, bottom, left)),
            _ => Err(Error::InvalidArgument(format!(
                "padding takes 1, 2 or 4 values, got {}",
                values.len()
            ))),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::symmetric(0, 1)
    }
}

/// A syntax block: code highlighted for `language`, optionally numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub code: String,
    /// Syntax name or file extension, e.g. `rust`, `py`, `json`
    pub language: String,
    pub line_numbers: bool,
    pub wrap: bool,
    /// Highlighting theme; `None` leaves the code unhighlighted
    pub syntax_theme: Option<String>,
}

/// What goes inside a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Text(Line),
    Lines(Vec<Line>),
    /// Two aligned columns: right-justified keys and their values
    Grid {
        rows: Vec<(String, Line)>,
        key_style: Option<String>,
    },
    Code(CodeBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub body: PanelBody,
    pub title: Option<String>,
    /// Interior style (content and background)
    pub style: Option<String>,
    pub border_style: Option<String>,
    pub box_style: BoxStyle,
    pub expand: bool,
    pub padding: Padding,
}

impl Panel {
    pub fn new(body: PanelBody) -> Self {
        Self {
            body,
            title: None,
            style: None,
            border_style: None,
            box_style: BoxStyle::Rounded,
            expand: false,
            padding: Padding::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub title: Option<String>,
    pub header_style: Option<String>,
    pub expand: bool,
    pub box_style: BoxStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: Line,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(label: Line) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }
}

/// An already-caught error, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    /// `source()` chain, outermost first
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(error: &(dyn std::error::Error + 'static), with_causes: bool) -> Self {
        let mut causes = Vec::new();
        if with_causes {
            let mut source = error.source();
            while let Some(cause) = source {
                causes.push(cause.to_string());
                source = cause.source();
            }
        }
        Self {
            message: error.to_string(),
            causes,
        }
    }

    /// Report for a panic payload, pointing at where it was raised.
    pub fn from_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with a non-string payload".to_string());
        let causes = location
            .map(|l| format!("panicked at {}:{}:{}", l.file(), l.line(), l.column()))
            .into_iter()
            .collect();
        Self { message, causes }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOptions {
    /// Clear the display when the scope ends
    pub transient: bool,
    /// Show elapsed and remaining time columns
    pub show_speed: bool,
    /// Replaces every task's description column when non-empty
    pub description: String,
    /// Track tasks without drawing anything
    pub hidden: bool,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            transient: true,
            show_speed: true,
            description: String::new(),
            hidden: false,
        }
    }
}

impl ProgressOptions {
    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    pub fn show_speed(mut self, show_speed: bool) -> Self {
        self.show_speed = show_speed;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Handle of a task registered in a progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub usize);

/// Changes applied to a progress task; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub completed: Option<u64>,
    pub total: Option<u64>,
    pub description: Option<String>,
}

impl TaskUpdate {
    pub fn completed(mut self, completed: u64) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A live spinner owned by a status scope.
pub trait SpinnerHandle: Send {
    fn set_message(&mut self, message: &str);
    /// Stop and remove the spinner. Called exactly once.
    fn finish(&mut self);
}

/// A live progress display and its task registry.
pub trait ProgressHandle: Send {
    fn add_task(&mut self, description: &str, total: u64) -> TaskId;
    fn advance(&mut self, task: TaskId, delta: u64);
    fn update(&mut self, task: TaskId, update: &TaskUpdate);
    /// Tear down the display. Called exactly once.
    fn finish(&mut self);
}

/// Everything the facade needs from a terminal.
pub trait Renderer: Send + Sync {
    fn line(&self, line: &Line);
    fn blank(&self, count: usize);
    fn rule(&self, label: Option<&Line>, style: Option<&str>);
    fn panel(&self, panel: &Panel);
    fn table(&self, table: &TableData);
    fn tree(&self, tree: &TreeNode);
    fn markdown(&self, text: &str);
    fn error_report(&self, report: &ErrorReport);
    fn spinner(&self, message: &str, hidden: bool) -> Box<dyn SpinnerHandle>;
    fn progress(&self, options: &ProgressOptions) -> Box<dyn ProgressHandle>;
    /// Show `prompt` and read one line, without echo when `hidden`.
    fn read_line(&self, prompt: &Line, hidden: bool) -> io::Result<String>;
}

/// Vertical space for [`ConsoleUtils::spacer`](crate::ConsoleUtils::spacer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    Small,
    Medium,
    Large,
    Lines(usize),
}

impl Spacing {
    pub fn lines(self) -> usize {
        match self {
            Spacing::Small => 1,
            Spacing::Medium => 2,
            Spacing::Large => 3,
            Spacing::Lines(n) => n,
        }
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing::Lines(1)
    }
}

impl From<usize> for Spacing {
    fn from(n: usize) -> Self {
        Spacing::Lines(n)
    }
}

impl FromStr for Spacing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" | "s" => Ok(Spacing::Small),
            "medium" | "m" => Ok(Spacing::Medium),
            "large" | "l" => Ok(Spacing::Large),
            other => other.parse::<usize>().map(Spacing::Lines).map_err(|_| {
                Error::InvalidArgument(format!(
                    "spacer size must be a line count or small/medium/large, got '{s}'"
                ))
            }),
        }
    }
}
