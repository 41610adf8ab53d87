use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::config::ConsoleConfig;
use crate::error::{Error, Result};
use crate::mask::{mask_secret, DEFAULT_KEEP, DEFAULT_MASK};
use crate::render::{
    BoxStyle, CodeBlock, ErrorReport, Line, Padding, Panel, PanelBody, ProgressOptions, Renderer,
    Spacing, TableData, TerminalRenderer, TreeNode,
};
use crate::scope::{ProgressGuard, StatusGuard};
use crate::theme::{self, StyleMap, Theme};
use crate::verbosity::{should_emit, Output, Severity, Verbosity};

/// Options for [`ConsoleUtils::panel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelOptions {
    pub title: Option<String>,
    /// Interior style (content and background)
    pub style: Option<String>,
    /// Defaults to the theme's `panel` style
    pub border_style: Option<String>,
    pub box_style: BoxStyle,
    pub expand: bool,
    pub padding: Option<Padding>,
}

impl PanelOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn border_style(mut self, style: impl Into<String>) -> Self {
        self.border_style = Some(style.into());
        self
    }

    pub fn box_style(mut self, box_style: BoxStyle) -> Self {
        self.box_style = box_style;
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }
}

/// Options for [`ConsoleUtils::table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub title: Option<String>,
    /// Defaults to the theme's `table.header` style
    pub header_style: Option<String>,
    pub expand: bool,
    pub box_style: BoxStyle,
}

impl TableOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn header_style(mut self, style: impl Into<String>) -> Self {
        self.header_style = Some(style.into());
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn box_style(mut self, box_style: BoxStyle) -> Self {
        self.box_style = box_style;
        self
    }
}

/// Options for [`ConsoleUtils::key_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueOptions {
    /// Mask the value with [`mask_secret`]
    pub secret: bool,
    pub keep: usize,
    pub mask: String,
}

impl Default for KeyValueOptions {
    fn default() -> Self {
        Self {
            secret: false,
            keep: DEFAULT_KEEP,
            mask: DEFAULT_MASK.to_string(),
        }
    }
}

impl KeyValueOptions {
    pub fn secret(keep: usize) -> Self {
        Self {
            secret: true,
            keep,
            ..Self::default()
        }
    }

    pub fn mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = mask.into();
        self
    }
}

/// Themed, verbosity-aware console helpers.
///
/// Every output method resolves its styles from the active theme, checks the
/// verbosity gate and forwards structured data to the [`Renderer`]. At
/// verbosity 0 nothing is drawn; `event` output is further filtered by
/// severity at levels 1 and 2.
///
/// The facade is `Send + Sync`. Theme and verbosity changes are atomic with
/// respect to concurrent output calls. Status and progress scopes are not
/// meant to be shared between threads.
pub struct ConsoleUtils {
    renderer: Arc<dyn Renderer>,
    theme: RwLock<Arc<Theme>>,
    verbosity: AtomicU8,
    emoji: bool,
    timestamps: bool,
    enable_tracebacks: bool,
}

impl ConsoleUtils {
    /// Console writing to stdout.
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_renderer(config, Arc::new(TerminalRenderer::stdout()))
    }

    pub fn with_renderer(config: ConsoleConfig, renderer: Arc<dyn Renderer>) -> Self {
        let overrides = (!config.custom_styles.is_empty()).then_some(&config.custom_styles);
        let theme = theme::resolve_preset(config.theme, overrides);
        debug!(
            "console created: theme={} verbosity={}",
            config.theme, config.verbosity
        );
        Self {
            renderer,
            theme: RwLock::new(Arc::new(theme)),
            verbosity: AtomicU8::new(config.verbosity.level()),
            emoji: config.emoji,
            timestamps: config.timestamps,
            enable_tracebacks: config.enable_tracebacks,
        }
    }

    /// Snapshot of the active theme.
    pub fn theme(&self) -> Arc<Theme> {
        Arc::clone(&self.theme.read())
    }

    /// Switch to a preset theme with optional overrides.
    ///
    /// On error the previous theme stays active.
    pub fn set_theme(&self, name: &str, custom_styles: Option<&StyleMap>) -> Result<()> {
        let theme = theme::resolve(name, custom_styles)?;
        debug!("theme set to {}", theme.name());
        *self.theme.write() = Arc::new(theme);
        Ok(())
    }

    pub fn verbosity(&self) -> Verbosity {
        // Only validated values are ever stored
        Verbosity::new(i64::from(self.verbosity.load(Ordering::Acquire)))
            .unwrap_or(Verbosity::NORMAL)
    }

    pub fn set_verbosity(&self, level: i64) -> Result<()> {
        let verbosity = Verbosity::new(level)?;
        self.verbosity.store(verbosity.level(), Ordering::Release);
        debug!("verbosity set to {verbosity}");
        Ok(())
    }

    /// Current settings as a config value.
    pub fn config(&self) -> ConsoleConfig {
        let theme = self.theme();
        let preset = theme::preset(theme.name());
        let custom_styles = theme
            .styles()
            .iter()
            .filter(|(key, descriptor)| preset.get(key) != Some(*descriptor))
            .collect();
        ConsoleConfig {
            theme: theme.name(),
            emoji: self.emoji,
            timestamps: self.timestamps,
            verbosity: self.verbosity(),
            enable_tracebacks: self.enable_tracebacks,
            custom_styles,
        }
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    fn enabled(&self, output: Output) -> bool {
        should_emit(self.verbosity(), output)
    }

    fn is_muted(&self) -> bool {
        !self.enabled(Output::Structural)
    }

    /// Section header: a rule with a centred label, padded by blank lines.
    pub fn header(&self, message: &str, style: Option<&str>) {
        if self.is_muted() {
            return;
        }
        let theme = self.theme();
        let style = style.unwrap_or_else(|| theme.style_or("header", "bold cyan"));
        self.renderer.blank(1);
        self.renderer
            .rule(Some(&Line::styled(message, Some(style))), theme.style("rule"));
        self.renderer.blank(1);
    }

    pub fn rule(&self, label: Option<&str>, label_style: Option<&str>, line_style: Option<&str>) {
        if self.is_muted() {
            return;
        }
        let theme = self.theme();
        let line_style = line_style.unwrap_or_else(|| theme.style_or("rule", "dim"));
        let label = label
            .filter(|l| !l.is_empty())
            .map(|l| Line::styled(l, Some(label_style.unwrap_or("#cccccc"))));
        self.renderer.rule(label.as_ref(), Some(line_style));
    }

    /// Vertical whitespace.
    pub fn spacer(&self, size: impl Into<Spacing>) {
        if self.is_muted() {
            return;
        }
        let lines = size.into().lines();
        if lines > 0 {
            self.renderer.blank(lines);
        }
    }

    pub fn panel(&self, message: &str, options: PanelOptions) {
        if self.is_muted() {
            return;
        }
        let theme = self.theme();
        let mut panel = Panel::new(PanelBody::Text(Line::plain(message)));
        panel.title = options.title;
        panel.style = options.style;
        panel.border_style = options
            .border_style
            .or_else(|| theme.style("panel").map(str::to_string));
        panel.box_style = options.box_style;
        panel.expand = options.expand;
        if let Some(padding) = options.padding {
            panel.padding = padding;
        }
        self.renderer.panel(&panel);
    }

    pub fn markdown(&self, text: &str) {
        if self.is_muted() {
            return;
        }
        self.renderer.markdown(text);
    }

    /// Line-numbered code in a panel, highlighted for `language` with the
    /// active theme's syntax colours.
    pub fn code(&self, code: &str, language: &str, title: Option<&str>, wrap: bool) {
        if self.is_muted() {
            return;
        }
        let theme = self.theme();
        let mut panel = Panel::new(PanelBody::Code(CodeBlock {
            code: code.to_string(),
            language: language.to_string(),
            line_numbers: true,
            wrap,
            syntax_theme: theme.name().syntax_theme().map(str::to_string),
        }));
        panel.title = title.map(str::to_string);
        panel.border_style = theme.style("code.border").map(str::to_string);
        panel.padding = Padding::symmetric(1, 0);
        self.renderer.panel(&panel);
    }

    pub fn success(&self, message: &str) {
        self.message("✅", "success", message);
    }

    pub fn info(&self, message: &str) {
        self.message("ℹ️", "info", message);
    }

    pub fn warning(&self, message: &str) {
        self.message("⚠️", "warning", message);
    }

    pub fn error(&self, message: &str) {
        self.message("❌", "error", message);
    }

    fn message(&self, icon: &str, key: &str, message: &str) {
        if self.is_muted() {
            return;
        }
        let theme = self.theme();
        let mut line = Line::new();
        if self.emoji {
            line = line.push(format!("{icon} "), None);
        }
        self.renderer.line(&line.push(message, theme.style(key)));
    }

    /// Log-style event, filtered by severity.
    ///
    /// Shown from verbosity 2, DEBUG events only at verbosity 3.
    pub fn event(&self, message: &str, severity: Severity) {
        if !self.enabled(Output::Event(severity)) {
            return;
        }
        let theme = self.theme();
        let style = theme
            .style(&severity.style_key())
            .or_else(|| theme.style("info"));

        let mut prefix = String::new();
        if self.timestamps {
            prefix.push_str(&format!(
                "[{}] ",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ));
        }
        prefix.push_str(&format!("{severity:<7} "));

        let mut line = Line::new();
        if self.emoji {
            line = line.push(format!("{} ", severity.emoji()), None);
        }
        self.renderer
            .line(&line.push(prefix, style).push(message, None));
    }

    /// Render an already-caught error. Never fails.
    ///
    /// The cause chain is included when tracebacks are enabled.
    pub fn print_exception(&self, error: &(dyn std::error::Error + 'static)) {
        if self.is_muted() {
            return;
        }
        self.renderer
            .error_report(&ErrorReport::from_error(error, self.enable_tracebacks));
    }

    /// Route panic messages through [`Renderer::error_report`].
    ///
    /// Only installs when tracebacks are enabled; returns whether it did.
    /// While the console is muted, panics go to the previously installed
    /// hook instead.
    pub fn install_panic_hook(self: &Arc<Self>) -> bool {
        if !self.enable_tracebacks {
            return false;
        }
        let console = Arc::clone(self);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if console.is_muted() {
                previous(info);
                return;
            }
            console
                .renderer
                .error_report(&ErrorReport::from_panic(info.payload(), info.location()));
        }));
        debug!("panic hook installed");
        true
    }

    /// Table with one column per header.
    ///
    /// Every row must have exactly as many cells as there are headers.
    pub fn table<H, R, C>(&self, headers: &[H], rows: R, options: TableOptions) -> Result<()>
    where
        H: Display,
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Display,
    {
        let headers: Vec<String> = headers.iter().map(ToString::to_string).collect();
        let mut cells = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let row: Vec<String> = row.into_iter().map(|c| c.to_string()).collect();
            if row.len() != headers.len() {
                return Err(Error::InvalidArgument(format!(
                    "row {index} has {} cells but there are {} headers",
                    row.len(),
                    headers.len()
                )));
            }
            cells.push(row);
        }

        if self.is_muted() {
            return Ok(());
        }
        let theme = self.theme();
        self.renderer.table(&TableData {
            headers,
            rows: cells,
            title: options.title,
            header_style: options
                .header_style
                .or_else(|| theme.style("table.header").map(str::to_string)),
            expand: options.expand,
            box_style: options.box_style,
        });
        Ok(())
    }

    /// Key/value pairs as an aligned grid inside a panel.
    pub fn dictionary<K, V, I>(&self, data: I, title: Option<&str>, expand: bool) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Serialize,
    {
        let mut rows = Vec::new();
        for (key, value) in data {
            rows.push((key.to_string(), serde_json::to_value(value)?));
        }
        if self.is_muted() {
            return Ok(());
        }

        let theme = self.theme();
        let value_style = theme.style("value");
        let rows = rows
            .into_iter()
            .map(|(key, value)| (key, describe_value(&value, value_style)))
            .collect();

        let mut panel = Panel::new(PanelBody::Grid {
            rows,
            key_style: theme.style("key").map(str::to_string),
        });
        panel.title = title.map(str::to_string);
        panel.border_style = theme.style("panel").map(str::to_string);
        panel.expand = expand;
        self.renderer.panel(&panel);
        Ok(())
    }

    /// Pretty-printed, highlighted JSON inside a panel.
    pub fn json<T: Serialize + ?Sized>(&self, data: &T, title: Option<&str>) -> Result<()> {
        let pretty = serde_json::to_string_pretty(data)?;
        if self.is_muted() {
            return Ok(());
        }
        let theme = self.theme();
        let mut panel = Panel::new(PanelBody::Code(CodeBlock {
            code: pretty,
            language: "json".to_string(),
            line_numbers: false,
            wrap: true,
            syntax_theme: theme.name().syntax_theme().map(str::to_string),
        }));
        panel.title = title.map(str::to_string);
        panel.border_style = theme.style("panel").map(str::to_string);
        self.renderer.panel(&panel);
        Ok(())
    }

    /// Nested structure as a tree. `title` defaults to "Structure".
    pub fn tree<T: Serialize + ?Sized>(&self, data: &T, title: Option<&str>) -> Result<()> {
        let value = serde_json::to_value(data)?;
        if self.is_muted() {
            return Ok(());
        }
        let theme = self.theme();
        let mut root = TreeNode::new(Line::styled(
            title.unwrap_or("Structure"),
            theme.style("info"),
        ));
        add_to_tree(&mut root, &value, None);
        self.renderer.tree(&root);
        Ok(())
    }

    /// `key: value`, optionally masking the value.
    pub fn key_value(&self, key: &str, value: &str, options: KeyValueOptions) -> Result<()> {
        let display = if options.secret {
            mask_secret(value, options.keep, &options.mask)?
        } else {
            value.to_string()
        };
        if self.is_muted() {
            return Ok(());
        }
        let theme = self.theme();
        self.renderer.line(
            &Line::styled(key, theme.style("key"))
                .push(": ", None)
                .push(display, theme.style("value")),
        );
        Ok(())
    }

    /// Start a spinner that runs until the guard is finished or dropped.
    pub fn status(&self, text: &str) -> StatusGuard {
        StatusGuard::new(self.renderer.spinner(text, self.is_muted()))
    }

    /// Start a progress display that runs until the guard is finished or dropped.
    pub fn progress(&self, mut options: ProgressOptions) -> ProgressGuard {
        options.hidden |= self.is_muted();
        ProgressGuard::new(self.renderer.progress(&options))
    }

    /// Run `body` while a spinner shows `text`.
    pub fn with_status<T, E, F>(&self, text: &str, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut StatusGuard) -> std::result::Result<T, E>,
    {
        let mut guard = self.status(text);
        let result = body(&mut guard);
        guard.finish();
        result
    }

    /// Run `body` inside a progress display. The display is torn down before
    /// the body's result, success or error, is returned.
    pub fn with_progress<T, E, F>(
        &self,
        options: ProgressOptions,
        body: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut ProgressGuard) -> std::result::Result<T, E>,
    {
        let mut guard = self.progress(options);
        let result = body(&mut guard);
        guard.finish();
        result
    }

    /// Ask for a line of input. Password input is not echoed.
    pub fn prompt(&self, message: &str, password: bool) -> Result<String> {
        let theme = self.theme();
        let suffix = if password { " (hidden)" } else { "" };
        let prompt = Line::styled(format!("{message}{suffix}"), theme.style("accent")).push(" ", None);
        Ok(self.renderer.read_line(&prompt, password)?)
    }

    /// Yes/no question. An empty answer picks `default`.
    pub fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let theme = self.theme();
        let hint = if default { "Y/n" } else { "y/N" };
        let prompt =
            Line::styled(format!("{message} [{hint}]"), theme.style("accent")).push(" ", None);
        let answer = self.renderer.read_line(&prompt, false)?;
        Ok(parse_confirmation(&answer, default))
    }
}

fn parse_confirmation(answer: &str, default: bool) -> bool {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return default;
    }
    matches!(answer.as_str(), "y" | "yes" | "true" | "1")
}

/// Value cell for dictionaries: containers get a dimmed type tag.
fn describe_value(value: &Value, style: Option<&str>) -> Line {
    match value {
        Value::Object(_) => Line::styled("dict", Some("dim"))
            .push(" ", None)
            .push(value.to_string(), style),
        Value::Array(_) => Line::styled("list", Some("dim"))
            .push(" ", None)
            .push(value.to_string(), style),
        Value::String(s) => Line::styled(s.clone(), style),
        other => Line::styled(other.to_string(), style),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn add_to_tree(node: &mut TreeNode, value: &Value, name: Option<&str>) {
    let label = name.map(|n| Line::styled(n, Some("bold")));
    match value {
        Value::Object(map) => match label {
            // Named mappings become branches; the root mapping fills the root
            Some(label) => {
                let mut branch = TreeNode::new(label);
                for (key, child) in map {
                    add_to_tree(&mut branch, child, Some(key));
                }
                node.children.push(branch);
            }
            None => {
                for (key, child) in map {
                    add_to_tree(node, child, Some(key));
                }
            }
        },
        Value::Array(items) => {
            let label = label.unwrap_or_else(|| {
                Line::styled("list", Some("bold")).push(format!(" ({})", items.len()), None)
            });
            let mut branch = TreeNode::new(label);
            for (index, item) in items.iter().enumerate() {
                add_to_tree(&mut branch, item, Some(&index.to_string()));
            }
            node.children.push(branch);
        }
        scalar => {
            let leaf = match label {
                Some(label) => label.push(format!(": {}", scalar_text(scalar)), None),
                None => Line::plain(scalar_text(scalar)),
            };
            node.children.push(TreeNode::new(leaf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TaskUpdate;
    use crate::testing::{Record, RecordingRenderer};
    use crate::theme::ThemeName;
    use serde_json::json;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn console(verbosity: Verbosity) -> (ConsoleUtils, Arc<RecordingRenderer>) {
        let renderer = Arc::new(RecordingRenderer::new());
        let config = ConsoleConfig::default()
            .with_verbosity(verbosity)
            .with_timestamps(false)
            .with_emoji(false);
        (
            ConsoleUtils::with_renderer(config, renderer.clone()),
            renderer,
        )
    }

    /// Calls every structural output method once.
    fn emit_everything(console: &ConsoleUtils) {
        console.header("Header", None);
        console.rule(Some("rule"), None, None);
        console.spacer(Spacing::Lines(2));
        console.panel("panel", PanelOptions::default());
        console.markdown("# md");
        console.code("x = 1", "python", None, false);
        console.success("ok");
        console.info("fyi");
        console.warning("careful");
        console.error("broken");
        console
            .table(&["a"], [["1"]], TableOptions::default())
            .unwrap();
        console.dictionary([("k", 1)], None, true).unwrap();
        console.json(&json!({"a": 1}), None).unwrap();
        console.tree(&json!({"a": 1}), None).unwrap();
        console
            .key_value("k", "v", KeyValueOptions::default())
            .unwrap();
        console.print_exception(&std::io::Error::other("boom"));
    }

    #[test]
    fn test_silent_console_draws_nothing() {
        let (console, renderer) = console(Verbosity::SILENT);
        emit_everything(&console);
        for severity in Severity::ALL {
            console.event("hidden", severity);
        }
        assert!(renderer.is_empty());
    }

    #[test]
    fn test_structural_output_at_every_visible_level() {
        for level in 1..=3 {
            let (console, renderer) = console(Verbosity::new(level).unwrap());
            emit_everything(&console);
            assert_eq!(renderer.count(|r| matches!(r, Record::Panel(_))), 4);
            assert_eq!(renderer.count(|r| matches!(r, Record::Table(_))), 1);
            assert_eq!(renderer.count(|r| matches!(r, Record::Tree(_))), 1);
            assert_eq!(renderer.count(|r| matches!(r, Record::ErrorReport(_))), 1);
        }
    }

    #[test]
    fn test_event_gate() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.event("nope", Severity::Error);
        assert!(renderer.is_empty());

        console.set_verbosity(2).unwrap();
        console.event("shown", Severity::Warning);
        console.event("nope", Severity::Debug);
        assert_eq!(renderer.lines(), vec!["WARNING shown"]);

        console.set_verbosity(3).unwrap();
        console.event("trace", Severity::Debug);
        assert_eq!(renderer.lines()[1], "DEBUG   trace");
    }

    #[test]
    fn test_event_prefix_style_and_timestamp() {
        let renderer = Arc::new(RecordingRenderer::new());
        let config = ConsoleConfig::default()
            .with_verbosity(Verbosity::DEBUG)
            .with_style("event.SUCCESS", "bold green");
        let console = ConsoleUtils::with_renderer(config, renderer.clone());
        console.event("deployed", Severity::Success);

        let Record::Line(line) = &renderer.records()[0] else {
            panic!("expected a line");
        };
        let text = line.plain_text();
        assert!(text.starts_with(Severity::Success.emoji()));
        assert!(text.contains("] SUCCESS deployed"));
        // [YYYY-MM-DD HH:MM:SS]
        let stamp = text.split('[').nth(1).unwrap().split(']').next().unwrap();
        assert_eq!(stamp.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
        assert_eq!(line.spans[1].style.as_deref(), Some("bold green"));
    }

    #[test]
    fn test_debug_event_falls_back_to_info_style() {
        let (console, renderer) = console(Verbosity::DEBUG);
        let overrides = StyleMap::from_iter([("info", "blue")]);
        console.set_theme("dark", Some(&overrides)).unwrap();
        console.event("x", Severity::Debug);
        let Record::Line(line) = &renderer.records()[0] else {
            panic!("expected a line");
        };
        assert_eq!(line.spans[0].style.as_deref(), Some("blue"));
    }

    #[test]
    fn test_set_verbosity_rejects_out_of_range() {
        let (console, _) = console(Verbosity::VERBOSE);
        for level in [4, -1, 100] {
            assert!(matches!(
                console.set_verbosity(level),
                Err(Error::InvalidConfiguration(_))
            ));
        }
        assert_eq!(console.verbosity(), Verbosity::VERBOSE);
    }

    #[test]
    fn test_unknown_theme_keeps_previous_styles() {
        let (console, _) = console(Verbosity::NORMAL);
        console.set_theme("light", None).unwrap();
        let before = console.theme();

        let err = console.set_theme("neon", None).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert_eq!(*console.theme(), *before);
        assert_eq!(console.theme().name(), ThemeName::Light);
    }

    #[test]
    fn test_custom_styles_override_single_key() {
        let renderer = Arc::new(RecordingRenderer::new());
        let config = ConsoleConfig::default().with_style("panel", "bold magenta");
        let console = ConsoleUtils::with_renderer(config, renderer);
        let preset = theme::preset(ThemeName::Dark);

        let theme = console.theme();
        assert_eq!(theme.style("panel"), Some("bold magenta"));
        for (key, descriptor) in preset.iter().filter(|(k, _)| *k != "panel") {
            assert_eq!(theme.style(key), Some(descriptor));
        }
        assert_eq!(
            console.config().custom_styles,
            StyleMap::from_iter([("panel", "bold magenta")])
        );
    }

    #[test]
    fn test_header_uses_theme_styles() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.header("Deploy", None);
        let records = renderer.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], Record::Blank(1));
        let Record::Rule { label, .. } = &records[1] else {
            panic!("expected a rule");
        };
        let label = label.as_ref().unwrap();
        assert_eq!(label.plain_text(), "Deploy");
        assert_eq!(
            label.spans[0].style.as_deref(),
            Some(console.theme().style_or("header", "bold cyan"))
        );
    }

    #[test]
    fn test_rule_defaults() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.rule(Some("Section"), None, Some("red"));
        console.rule(None, None, None);
        let records = renderer.records();
        let Record::Rule { label, style } = &records[0] else {
            panic!("expected a rule");
        };
        assert_eq!(
            label.as_ref().unwrap().spans[0].style.as_deref(),
            Some("#cccccc")
        );
        assert_eq!(style.as_deref(), Some("red"));
        let Record::Rule { label, style } = &records[1] else {
            panic!("expected a rule");
        };
        assert!(label.is_none());
        assert_eq!(
            style.as_deref(),
            Some(console.theme().style_or("rule", "dim"))
        );
    }

    #[test]
    fn test_spacer_sizes() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.spacer(Spacing::Large);
        console.spacer(Spacing::Lines(0));
        console.spacer("m".parse::<Spacing>().unwrap());
        assert_eq!(renderer.records(), vec![Record::Blank(3), Record::Blank(2)]);
    }

    #[test]
    fn test_panel_options() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.panel(
            "hello",
            PanelOptions::default()
                .title("T")
                .style("on blue")
                .box_style(BoxStyle::Double)
                .expand(true)
                .padding(Padding::uniform(2)),
        );
        console.panel("plain", PanelOptions::default());

        let records = renderer.records();
        let Record::Panel(panel) = &records[0] else {
            panic!("expected a panel");
        };
        assert_eq!(panel.title.as_deref(), Some("T"));
        assert_eq!(panel.style.as_deref(), Some("on blue"));
        assert_eq!(panel.box_style, BoxStyle::Double);
        assert!(panel.expand);
        assert_eq!(panel.padding, Padding::uniform(2));
        assert_eq!(panel.border_style.as_deref(), console.theme().style("panel"));

        let Record::Panel(panel) = &records[1] else {
            panic!("expected a panel");
        };
        assert_eq!(panel.padding, Padding::default());
        assert!(!panel.expand);
    }

    #[test]
    fn test_code_panel() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.code("print(1)", "python", Some("demo.py"), true);
        let Record::Panel(panel) = &renderer.records()[0] else {
            panic!("expected a panel");
        };
        assert_eq!(panel.title.as_deref(), Some("demo.py"));
        assert_eq!(panel.padding, Padding::symmetric(1, 0));
        assert_eq!(
            panel.border_style.as_deref(),
            console.theme().style("code.border")
        );
        assert_eq!(
            panel.body,
            PanelBody::Code(CodeBlock {
                code: "print(1)".into(),
                language: "python".into(),
                line_numbers: true,
                wrap: true,
                syntax_theme: Some("base16-ocean.dark".into()),
            })
        );

        console.set_theme("mono", None).unwrap();
        console.code("print(1)", "python", None, false);
        let Record::Panel(panel) = &renderer.records()[1] else {
            panic!("expected a panel");
        };
        let PanelBody::Code(block) = &panel.body else {
            panic!("expected a code body");
        };
        assert_eq!(block.syntax_theme, None);
    }

    #[test]
    fn test_json_panel_is_highlighted_json() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console
            .json(&json!({"name": "api", "ports": [80]}), Some("service"))
            .unwrap();
        let Record::Panel(panel) = &renderer.records()[0] else {
            panic!("expected a panel");
        };
        assert_eq!(panel.title.as_deref(), Some("service"));
        let PanelBody::Code(block) = &panel.body else {
            panic!("expected a code body");
        };
        assert_eq!(block.language, "json");
        assert!(!block.line_numbers);
        assert_eq!(
            block.code,
            "{\n  \"name\": \"api\",\n  \"ports\": [\n    80\n  ]\n}"
        );
    }

    #[test]
    fn test_concurrent_theme_and_verbosity_changes() {
        let (console, _renderer) = console(Verbosity::NORMAL);
        let presets: Vec<Theme> = ThemeName::ALL
            .iter()
            .map(|name| theme::resolve_preset(*name, None))
            .collect();
        let done = std::sync::atomic::AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..500 {
                    let name = ThemeName::ALL[i % ThemeName::ALL.len()];
                    console.set_theme(name.as_str(), None).unwrap();
                    assert!(console.set_theme("neon", None).is_err());
                    console.set_verbosity((i % 4) as i64).unwrap();
                    assert!(console.set_verbosity(7).is_err());
                    assert!(console.set_verbosity(-1).is_err());
                }
                done.store(true, Ordering::Release);
            });

            for _ in 0..3 {
                scope.spawn(|| loop {
                    let finished = done.load(Ordering::Acquire);
                    let snapshot = console.theme();
                    assert!(
                        presets.iter().any(|preset| preset == snapshot.as_ref()),
                        "partial theme {:?}",
                        snapshot.name()
                    );
                    assert!(console.verbosity().level() <= Verbosity::MAX);
                    if finished {
                        break;
                    }
                });
            }
        });
    }

    #[test]
    fn test_panic_hook_renders_error_report() {
        let renderer = Arc::new(RecordingRenderer::new());
        let quiet = Arc::new(ConsoleUtils::with_renderer(
            ConsoleConfig::default().with_tracebacks(false),
            renderer.clone(),
        ));
        assert!(!quiet.install_panic_hook());

        let console = Arc::new(ConsoleUtils::with_renderer(
            ConsoleConfig::default(),
            renderer.clone(),
        ));
        assert!(console.install_panic_hook());
        let result = catch_unwind(|| panic!("hook boom"));
        drop(std::panic::take_hook());

        assert!(result.is_err());
        let reports: Vec<ErrorReport> = renderer
            .records()
            .into_iter()
            .filter_map(|record| match record {
                Record::ErrorReport(report) => Some(report),
                _ => None,
            })
            .collect();
        let report = reports
            .iter()
            .find(|report| report.message == "hook boom")
            .expect("panic was not rendered");
        assert!(report.causes[0].contains("console_utils.rs"));
    }

    #[test]
    fn test_messages_with_and_without_emoji() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.success("saved");
        console.error("failed");
        assert_eq!(renderer.lines(), vec!["saved", "failed"]);

        let renderer = Arc::new(RecordingRenderer::new());
        let console = ConsoleUtils::with_renderer(ConsoleConfig::default(), renderer.clone());
        console.warning("hot");
        console.info("note");
        assert_eq!(renderer.lines(), vec!["⚠️ hot", "ℹ️ note"]);
        let Record::Line(line) = &renderer.records()[0] else {
            panic!("expected a line");
        };
        assert_eq!(line.spans[1].style.as_deref(), console.theme().style("warning"));
    }

    #[test]
    fn test_table_rejects_ragged_rows_even_when_silent() {
        let (console, renderer) = console(Verbosity::SILENT);
        let err = console
            .table(&["a", "b"], vec![vec!["1", "2"], vec!["3"]], TableOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("row 1"));
        assert!(renderer.is_empty());
    }

    #[test]
    fn test_table_header_style_and_rows() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console
            .table(
                &["Name", "Count"],
                vec![vec!["a".to_string(), 1.to_string()]],
                TableOptions::default().title("Stats").expand(true),
            )
            .unwrap();
        let Record::Table(table) = &renderer.records()[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.headers, vec!["Name", "Count"]);
        assert_eq!(table.rows, vec![vec!["a", "1"]]);
        assert_eq!(table.title.as_deref(), Some("Stats"));
        assert!(table.expand);
        assert_eq!(
            table.header_style.as_deref(),
            console.theme().style("table.header")
        );
    }

    #[test]
    fn test_dictionary_grid() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console
            .dictionary(
                [("name", json!("api")), ("ports", json!([80, 443]))],
                Some("Service"),
                false,
            )
            .unwrap();
        let Record::Panel(panel) = &renderer.records()[0] else {
            panic!("expected a panel");
        };
        let PanelBody::Grid { rows, key_style } = &panel.body else {
            panic!("expected a grid");
        };
        assert_eq!(key_style.as_deref(), console.theme().style("key"));
        assert_eq!(rows[0].0, "name");
        assert_eq!(rows[0].1.plain_text(), "api");
        assert_eq!(rows[1].1.plain_text(), "list [80,443]");
        assert_eq!(panel.title.as_deref(), Some("Service"));
        assert!(!panel.expand);
    }

    #[test]
    fn test_tree_default_title() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console.tree(&json!({"a": {"b": 1}}), None).unwrap();
        let Record::Tree(root) = &renderer.records()[0] else {
            panic!("expected a tree");
        };
        assert_eq!(root.label.plain_text(), "Structure");
        assert_eq!(root.label.spans[0].style.as_deref(), console.theme().style("info"));
        assert_eq!(root.leaf_count(), 1);
    }

    #[test]
    fn test_key_value_masks_secrets() {
        let (console, renderer) = console(Verbosity::NORMAL);
        console
            .key_value("token", "$upaS3cr3t", KeyValueOptions::secret(3))
            .unwrap();
        console
            .key_value("pin", "1234", KeyValueOptions::secret(0).mask("#"))
            .unwrap();
        assert_eq!(renderer.lines(), vec!["token: *******r3t", "pin: ####"]);

        let err = console
            .key_value("k", "v", KeyValueOptions::secret(1).mask("**"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_print_exception_cause_chain() {
        let inner = std::io::Error::other("connection refused");
        let outer = Error::ConfigFile {
            path: "app.toml".into(),
            message: "unreadable".into(),
        };
        let (console, renderer) = console(Verbosity::NORMAL);
        console.print_exception(&outer);
        console.print_exception(&Error::Io(inner));

        let records = renderer.records();
        let Record::ErrorReport(report) = &records[1] else {
            panic!("expected an error report");
        };
        assert_eq!(report.message, "IO error: connection refused");
        assert_eq!(report.causes, vec!["connection refused".to_string()]);

        let renderer = Arc::new(RecordingRenderer::new());
        let console = ConsoleUtils::with_renderer(
            ConsoleConfig::default().with_tracebacks(false),
            renderer.clone(),
        );
        console.print_exception(&Error::Io(std::io::Error::other("x")));
        let Record::ErrorReport(report) = &renderer.records()[0] else {
            panic!("expected an error report");
        };
        assert!(report.causes.is_empty());
    }

    #[test]
    fn test_with_progress_tears_down_once_on_error() {
        let (console, renderer) = console(Verbosity::NORMAL);
        let result: std::result::Result<(), &str> =
            console.with_progress(ProgressOptions::default(), |progress| {
                let task = progress.add_task("copy", 10);
                progress.advance(task, 4);
                Err("disk full")
            });
        assert_eq!(result, Err("disk full"));
        assert_eq!(renderer.count(|r| matches!(r, Record::ProgressStopped)), 1);
        assert_eq!(
            renderer.records().last(),
            Some(&Record::ProgressStopped)
        );
    }

    #[test]
    fn test_progress_tears_down_once_on_panic() {
        let (console, renderer) = console(Verbosity::NORMAL);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut progress = console.progress(ProgressOptions::default());
            let task = progress.add_task("copy", 10);
            progress.update(task, TaskUpdate::default().completed(5));
            panic!("interrupted");
        }));
        assert!(outcome.is_err());
        assert_eq!(renderer.count(|r| matches!(r, Record::ProgressStopped)), 1);
    }

    #[test]
    fn test_with_status_returns_body_value() {
        let (console, renderer) = console(Verbosity::NORMAL);
        let value: std::result::Result<u32, Error> = console.with_status("Loading", |status| {
            status.update("Parsing");
            Ok(7)
        });
        assert_eq!(value.unwrap(), 7);
        assert_eq!(
            renderer.records(),
            vec![
                Record::SpinnerStarted {
                    message: "Loading".into(),
                    hidden: false
                },
                Record::SpinnerMessage("Parsing".into()),
                Record::SpinnerStopped,
            ]
        );
    }

    #[test]
    fn test_scopes_are_hidden_when_silent() {
        let (console, renderer) = console(Verbosity::SILENT);
        console.status("quiet").finish();
        console
            .progress(ProgressOptions::default().description("quiet"))
            .finish();
        let records = renderer.records();
        assert_eq!(
            records[0],
            Record::SpinnerStarted {
                message: "quiet".into(),
                hidden: true
            }
        );
        let Record::ProgressStarted(options) = &records[2] else {
            panic!("expected progress");
        };
        assert!(options.hidden);
    }

    #[test]
    fn test_prompt_and_confirm() {
        let (console, renderer) = console(Verbosity::SILENT);
        renderer.push_answer("alice");
        renderer.push_answer("hunter2");
        renderer.push_answer("");
        renderer.push_answer("no");

        assert_eq!(console.prompt("Name", false).unwrap(), "alice");
        assert_eq!(console.prompt("Password", true).unwrap(), "hunter2");
        assert!(console.confirm("Continue?", true).unwrap());
        assert!(!console.confirm("Really?", true).unwrap());

        let prompts: Vec<(String, bool)> = renderer
            .records()
            .into_iter()
            .filter_map(|r| match r {
                Record::Prompt { prompt, hidden } => Some((prompt.plain_text(), hidden)),
                _ => None,
            })
            .collect();
        assert_eq!(
            prompts,
            vec![
                ("Name ".to_string(), false),
                ("Password (hidden) ".to_string(), true),
                ("Continue? [Y/n] ".to_string(), false),
                ("Really? [Y/n] ".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_prompt_propagates_input_errors() {
        let (console, _) = console(Verbosity::NORMAL);
        assert!(matches!(console.prompt("Name", false), Err(Error::Io(_))));
        assert!(matches!(console.confirm("Ok?", false), Err(Error::Io(_))));
    }

    #[test]
    fn test_config_snapshot() {
        let (console, _) = console(Verbosity::VERBOSE);
        console.set_theme("MONO", None).unwrap();
        let config = console.config();
        assert_eq!(config.theme, ThemeName::Mono);
        assert_eq!(config.verbosity, Verbosity::VERBOSE);
        assert!(!config.emoji);
        assert!(config.custom_styles.is_empty());
    }

    #[test]
    fn test_parse_confirmation() {
        assert!(parse_confirmation("", true));
        assert!(!parse_confirmation("  ", false));
        for yes in ["y", "YES", "true", "1", " Yes "] {
            assert!(parse_confirmation(yes, false), "{yes}");
        }
        for no in ["n", "no", "nope", "0"] {
            assert!(!parse_confirmation(no, true), "{no}");
        }
    }

    #[test]
    fn test_describe_value_tags_containers() {
        let line = describe_value(&json!({"a": 1}), Some("white"));
        assert_eq!(line.plain_text(), "dict {\"a\":1}");
        assert_eq!(line.spans[0].style.as_deref(), Some("dim"));

        let line = describe_value(&json!([1, 2]), None);
        assert_eq!(line.plain_text(), "list [1,2]");

        assert_eq!(describe_value(&json!("prod"), None).plain_text(), "prod");
        assert_eq!(describe_value(&json!(true), None).plain_text(), "true");
    }

    #[test]
    fn test_tree_from_nested_value() {
        let mut root = TreeNode::new(Line::plain("Structure"));
        add_to_tree(
            &mut root,
            &json!({"db": {"port": 5432}, "services": ["auth", "search"], "debug": false}),
            None,
        );

        let labels: Vec<String> = root.children.iter().map(|c| c.label.plain_text()).collect();
        assert_eq!(labels, vec!["db", "services", "debug: false"]);
        assert_eq!(root.children[0].children[0].label.plain_text(), "port: 5432");
        assert_eq!(root.children[1].children[1].label.plain_text(), "1: search");
    }

    #[test]
    fn test_tree_unnamed_list_root() {
        let mut root = TreeNode::new(Line::plain("Structure"));
        add_to_tree(&mut root, &json!(["a"]), None);
        assert_eq!(root.children[0].label.plain_text(), "list (1)");
        assert_eq!(root.children[0].children[0].label.plain_text(), "0: a");
    }
}
