//! Markdown to styled lines, parsed with pulldown-cmark.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::highlight::highlight;
use super::text::wrap_line;
use super::{Line, Span};

const BULLET: &str = "• ";
const QUOTE: &str = "▌ ";
const INLINE_CODE: &str = "bold cyan on black";

/// Lay out `text` as lines at most `width` cells wide. Fenced code is
/// highlighted with `syntax_theme` when one is given.
pub(crate) fn markdown_lines(text: &str, width: usize, syntax_theme: Option<&str>) -> Vec<Line> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut writer = Writer::new(width, syntax_theme);
    for event in Parser::new_ext(text, options) {
        writer.event(event);
    }
    writer.finish()
}

struct Writer<'a> {
    width: usize,
    syntax_theme: Option<&'a str>,
    out: Vec<Line>,
    current: Line,
    styles: Vec<&'static str>,
    /// Open lists, holding the next number for ordered ones
    lists: Vec<Option<u64>>,
    quotes: usize,
    marker: Option<String>,
    code: Option<(String, String)>,
}

impl<'a> Writer<'a> {
    fn new(width: usize, syntax_theme: Option<&'a str>) -> Self {
        Self {
            width: width.max(1),
            syntax_theme,
            out: Vec::new(),
            current: Line::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            quotes: 0,
            marker: None,
            code: None,
        }
    }

    fn style(&self) -> Option<String> {
        (!self.styles.is_empty()).then(|| self.styles.join(" "))
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        self.current.spans.push(Span::styled(text, style.as_deref()));
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match &mut self.code {
                Some((_, buffer)) => buffer.push_str(&text),
                None => self.text(&text),
            },
            Event::Code(code) => {
                self.current
                    .spans
                    .push(Span::styled(code.to_string(), Some(INLINE_CODE)));
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.out.push(Line::styled("─".repeat(self.width), Some("dim")));
                self.separate();
            }
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => self.styles.push(match level {
                HeadingLevel::H1 => "bold underline",
                HeadingLevel::H2 => "bold",
                _ => "bold italic",
            }),
            Tag::BlockQuote { .. } => {
                self.quotes += 1;
                self.styles.push("italic");
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        *next += 1;
                        format!("{}. ", *next - 1)
                    }
                    _ => BULLET.to_string(),
                };
                self.marker = Some(marker);
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some((language, String::new()));
            }
            Tag::Emphasis => self.styles.push("italic"),
            Tag::Strong => self.styles.push("bold"),
            Tag::Strikethrough => self.styles.push("strike"),
            Tag::Link { .. } => self.styles.push("underline blue"),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::Heading { .. } => {
                self.styles.pop();
                self.flush();
                self.separate();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                if self
                    .out
                    .last()
                    .is_some_and(|line| line.plain_text() == QUOTE.trim_end())
                {
                    self.out.pop();
                }
                self.styles.pop();
                self.quotes = self.quotes.saturating_sub(1);
                self.separate();
            }
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    for line in highlight(&code, &language, self.syntax_theme) {
                        let mut indented = Line::plain("  ");
                        indented.spans.extend(line.spans);
                        self.push_prefixed(indented);
                    }
                }
                self.separate();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn prefix(&self) -> String {
        let nesting = self.lists.len().saturating_sub(1);
        format!("{}{}", QUOTE.repeat(self.quotes), "  ".repeat(nesting))
    }

    fn push_prefixed(&mut self, line: Line) {
        let prefix = self.prefix();
        let mut prefixed = Line::styled(prefix, (self.quotes > 0).then_some("dim"));
        prefixed.spans.extend(line.spans);
        self.out.push(prefixed);
    }

    /// Wrap the pending inline text into output lines.
    fn flush(&mut self) {
        let line = std::mem::take(&mut self.current);
        if line.is_empty() && self.marker.is_none() {
            return;
        }

        let prefix = self.prefix();
        let marker = self.marker.take().unwrap_or_default();
        let hanging = if self.lists.is_empty() {
            String::new()
        } else {
            " ".repeat(console::measure_text_width(BULLET).max(marker.chars().count()))
        };
        let indent = console::measure_text_width(&prefix) + hanging.len();
        let quote_style = (self.quotes > 0).then_some("dim");

        for (i, wrapped) in wrap_line(&line, self.width.saturating_sub(indent))
            .into_iter()
            .enumerate()
        {
            let lead = if i == 0 && !marker.is_empty() {
                format!("{marker:<width$}", width = hanging.len())
            } else {
                hanging.clone()
            };
            let mut out = Line::styled(prefix.clone(), quote_style).push(lead, None);
            out.spans.extend(wrapped.spans);
            out.spans.retain(|span| !span.text.is_empty());
            self.out.push(out);
        }
    }

    /// Blank line between blocks.
    fn separate(&mut self) {
        if self.out.last().is_some_and(|line| !line.is_empty()) {
            if self.quotes > 0 {
                self.out.push(Line::styled(QUOTE.trim_end(), Some("dim")));
            } else {
                self.out.push(Line::new());
            }
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.flush();
        while self.out.last().is_some_and(|line| line.plain_text().trim().is_empty()) {
            self.out.pop();
        }
        self.out
    }
}
