//! Syntax highlighting with syntect's bundled grammars and themes.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::Line;

/// Theme used for fenced code in markdown
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

fn syntaxes() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn themes() -> &'static ThemeSet {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    THEMES.get_or_init(ThemeSet::load_defaults)
}

/// Split `code` into lines styled for `language`.
///
/// `language` is matched against syntax names and file extensions; unknown
/// languages, unknown themes and a `None` theme yield unstyled lines.
pub fn highlight(code: &str, language: &str, theme: Option<&str>) -> Vec<Line> {
    let plain = || code.lines().map(Line::plain).collect();

    let Some(theme) = theme.and_then(|name| themes().themes.get(name)) else {
        return plain();
    };
    let syntaxes = syntaxes();
    let syntax = syntaxes
        .find_syntax_by_token(language)
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for source in LinesWithEndings::from(code) {
        match highlighter.highlight_line(source, syntaxes) {
            Ok(regions) => lines.push(to_line(&regions)),
            Err(e) => {
                log::debug!("highlighting as {language} failed: {e}");
                return plain();
            }
        }
    }
    lines
}

fn to_line(regions: &[(Style, &str)]) -> Line {
    regions
        .iter()
        .map(|(style, text)| (style, text.trim_end_matches(['\r', '\n'])))
        .filter(|(_, text)| !text.is_empty())
        .fold(Line::new(), |line, (style, text)| {
            line.push(text, Some(descriptor(style).as_str()))
        })
}

fn descriptor(style: &Style) -> String {
    let fg = style.foreground;
    let mut descriptor = format!("#{:02x}{:02x}{:02x}", fg.r, fg.g, fg.b);
    for (flag, word) in [
        (FontStyle::BOLD, " bold"),
        (FontStyle::ITALIC, " italic"),
        (FontStyle::UNDERLINE, " underline"),
    ] {
        if style.font_style.contains(flag) {
            descriptor.push_str(word);
        }
    }
    descriptor
}
