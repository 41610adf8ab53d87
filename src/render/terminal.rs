use std::io::{self, BufRead, Write};

use console::Term;
use parking_lot::Mutex;

use super::boxes::rule_lines;
use super::highlight::DEFAULT_THEME;
use super::markdown::markdown_lines;
use super::progress::{DrawTarget, Spinner, TaskProgress};
use super::style::Painter;
use super::tables::{grid_lines, panel_inner_width, panel_lines, panel_rows, table_lines};
use super::text::{code_lines, tree_lines};
use super::{
    ErrorReport, Line, Panel, PanelBody, ProgressHandle, ProgressOptions, Renderer,
    SpinnerHandle, TableData, TreeNode,
};

const DEFAULT_WIDTH: usize = 80;

enum Sink {
    Term(Term),
    Writer(Box<dyn Write + Send>),
}

/// Renderer that draws to a terminal, or to any writer.
pub struct TerminalRenderer {
    sink: Mutex<Sink>,
    input: Option<Mutex<Box<dyn BufRead + Send>>>,
    painter: Painter,
    width: Option<usize>,
    target: DrawTarget,
}

impl TerminalRenderer {
    /// Draw to stdout, colouring when stdout is a colour terminal.
    pub fn stdout() -> Self {
        Self::for_term(Term::stdout(), DrawTarget::Stdout)
    }

    /// Draw to stderr, colouring when stderr is a colour terminal.
    pub fn stderr() -> Self {
        Self::for_term(Term::stderr(), DrawTarget::Stderr)
    }

    fn for_term(term: Term, target: DrawTarget) -> Self {
        let colorize = term.features().colors_supported() && console::colors_enabled();
        Self {
            sink: Mutex::new(Sink::Term(term)),
            input: None,
            painter: Painter::new(colorize),
            width: None,
            target,
        }
    }

    /// Write lines to `writer` at a fixed width. Live displays are hidden.
    pub fn with_writer<W: Write + Send + 'static>(writer: W, width: usize, colorize: bool) -> Self {
        Self {
            sink: Mutex::new(Sink::Writer(Box::new(writer))),
            input: None,
            painter: Painter::new(colorize),
            width: Some(width),
            target: DrawTarget::Hidden,
        }
    }

    /// Read prompt answers from `input` instead of the terminal.
    pub fn with_input<R: BufRead + Send + 'static>(mut self, input: R) -> Self {
        self.input = Some(Mutex::new(Box::new(input)));
        self
    }

    pub fn width(&self) -> usize {
        if let Some(width) = self.width {
            return width;
        }
        match &*self.sink.lock() {
            Sink::Term(term) => term
                .size_checked()
                .map_or(DEFAULT_WIDTH, |(_, cols)| usize::from(cols)),
            Sink::Writer(_) => DEFAULT_WIDTH,
        }
    }

    fn emit(&self, lines: &[String]) {
        let mut sink = self.sink.lock();
        let result = match &mut *sink {
            Sink::Term(term) => lines.iter().try_for_each(|line| term.write_line(line)),
            Sink::Writer(writer) => lines
                .iter()
                .try_for_each(|line| writeln!(writer, "{line}"))
                .and_then(|()| writer.flush()),
        };
        if let Err(e) = result {
            log::debug!("failed to write console output: {e}");
        }
    }

    fn write_prompt(&self, prompt: &str) -> io::Result<()> {
        match &mut *self.sink.lock() {
            Sink::Term(term) => term.write_str(prompt),
            Sink::Writer(writer) => {
                write!(writer, "{prompt}")?;
                writer.flush()
            }
        }
    }

    /// Painted rows for the inside of `panel` at the given outer width.
    fn panel_body(&self, panel: &Panel, width: usize) -> Vec<String> {
        let inner = panel_inner_width(panel, width);
        let fill = |lines: &[Line]| panel_rows(panel, lines, inner, &self.painter);
        match &panel.body {
            PanelBody::Text(line) => fill(std::slice::from_ref(line)),
            PanelBody::Lines(lines) => fill(lines),
            PanelBody::Grid { rows, key_style } => {
                grid_lines(rows, key_style.as_deref(), inner, &self.painter)
            }
            PanelBody::Code(block) => fill(&code_lines(block, inner)),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn line(&self, line: &Line) {
        self.emit(&[self.painter.paint_line(line)]);
    }

    fn blank(&self, count: usize) {
        self.emit(&vec![String::new(); count]);
    }

    fn rule(&self, label: Option<&Line>, style: Option<&str>) {
        self.emit(&[rule_lines(label, style, self.width(), &self.painter)]);
    }

    fn panel(&self, panel: &Panel) {
        let width = self.width();
        let rows = self.panel_body(panel, width);
        self.emit(&panel_lines(panel, rows, width, &self.painter));
    }

    fn table(&self, table: &TableData) {
        self.emit(&table_lines(table, self.width(), &self.painter));
    }

    fn tree(&self, tree: &TreeNode) {
        let lines: Vec<String> = tree_lines(tree)
            .iter()
            .map(|line| self.painter.paint_line(line))
            .collect();
        self.emit(&lines);
    }

    fn markdown(&self, text: &str) {
        let theme = self.painter.colorize().then_some(DEFAULT_THEME);
        let lines: Vec<String> = markdown_lines(text, self.width(), theme)
            .iter()
            .map(|line| self.painter.paint_line(line))
            .collect();
        self.emit(&lines);
    }

    fn error_report(&self, report: &ErrorReport) {
        let mut content = vec![Line::styled(report.message.clone(), Some("bold red"))];
        if !report.causes.is_empty() {
            content.push(Line::new());
            content.push(Line::styled("Caused by:", Some("bold")));
            for (i, cause) in report.causes.iter().enumerate() {
                content.push(Line::styled(format!("  {i}: "), Some("dim")).push(cause.clone(), None));
            }
        }
        let mut panel = Panel::new(PanelBody::Lines(content));
        panel.title = Some("Error".to_string());
        panel.border_style = Some("red".to_string());
        self.panel(&panel);
    }

    fn spinner(&self, message: &str, hidden: bool) -> Box<dyn SpinnerHandle> {
        Box::new(Spinner::start(message, self.target, hidden))
    }

    fn progress(&self, options: &ProgressOptions) -> Box<dyn ProgressHandle> {
        Box::new(TaskProgress::start(options, self.target))
    }

    fn read_line(&self, prompt: &Line, hidden: bool) -> io::Result<String> {
        self.write_prompt(&self.painter.paint_line(prompt))?;

        if let Some(input) = &self.input {
            let mut answer = String::new();
            if input.lock().read_line(&mut answer)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
            }
            if hidden {
                self.emit(&[String::new()]);
            }
            return Ok(answer.trim_end_matches(['\r', '\n']).to_string());
        }

        let term = Term::stdout();
        if hidden {
            term.read_secure_line()
        } else {
            term.read_line()
        }
    }
}
