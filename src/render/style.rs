//! Translation of style descriptors into terminal styles.
//!
//! Descriptors follow the familiar `"bold white on #3b82f6"` shape: any mix
//! of attributes, a foreground colour and an optional `on <colour>`
//! background. Each word is rewritten into `console`'s dotted style syntax;
//! unknown words are dropped so that a typo degrades to plain text rather
//! than an error.

use console::Style;

/// Rewrite a descriptor as a `console` dotted style string, e.g.
/// `"bold red on bright_black"` becomes `"bold.red.on_black.on_bright"`.
pub fn dotted(descriptor: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut words = descriptor.split_whitespace();

    while let Some(word) = words.next() {
        let word = word.to_lowercase();
        let attribute = match word.as_str() {
            "bold" | "b" => "bold",
            "dim" | "d" => "dim",
            "italic" | "i" => "italic",
            "underline" | "u" => "underlined",
            "blink" => "blink",
            "reverse" | "r" => "reverse",
            "strike" | "s" => "strikethrough",
            "default" | "none" => continue,
            "on" => {
                if let Some((colour, bright)) = words.next().and_then(colour) {
                    parts.push(format!("on_{colour}"));
                    if bright {
                        parts.push("on_bright".to_string());
                    }
                }
                continue;
            }
            other => {
                if let Some((colour, bright)) = colour(other) {
                    parts.push(colour);
                    if bright {
                        parts.push("bright".to_string());
                    }
                }
                continue;
            }
        };
        parts.push(attribute.to_string());
    }
    parts.join(".")
}

/// A colour word as a `console` colour name or 256-colour index, plus
/// whether the bright variant is meant.
fn colour(word: &str) -> Option<(String, bool)> {
    let word = word.trim().to_lowercase();
    let indexed = |index: u8| Some((index.to_string(), false));

    if let Some(hex) = word.strip_prefix('#') {
        let (r, g, b) = parse_hex(hex)?;
        return indexed(rgb_to_index(r, g, b));
    }
    if let Some(args) = word
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<u8> = args
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        return match parts[..] {
            [r, g, b] => indexed(rgb_to_index(r, g, b)),
            _ => None,
        };
    }
    if let Some(index) = word
        .strip_prefix("color(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return index.trim().parse().ok().and_then(indexed);
    }
    if let Some(level) = word
        .strip_prefix("grey")
        .or_else(|| word.strip_prefix("gray"))
        .filter(|rest| !rest.is_empty())
    {
        return level
            .parse::<u32>()
            .ok()
            .filter(|l| *l <= 100)
            .and_then(|l| indexed(grey(l)));
    }

    let (bright, base) = match word.strip_prefix("bright_") {
        Some(base) => (true, base),
        None => (false, word.as_str()),
    };
    match base {
        "black" | "red" | "green" | "yellow" | "blue" | "magenta" | "cyan" | "white" => {
            Some((base.to_string(), bright))
        }
        _ if bright => None,
        "grey" | "gray" => Some(("black".to_string(), true)),
        "purple" => indexed(129),
        "orange" | "dark_orange" => indexed(208),
        "pink" => indexed(218),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn grey(level: u32) -> u8 {
    // 24-step greyscale ramp at 232..=255
    232 + ((level * 23 + 50) / 100) as u8
}

/// Nearest entry in the xterm 256-colour palette
fn rgb_to_index(r: u8, g: u8, b: u8) -> u8 {
    let cube = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((u16::from(r) - 8) * 24 / 247) as u8;
    }
    16 + 36 * cube(r) + 6 * cube(g) + cube(b)
}

/// Applies descriptors to text, or passes text through untouched when
/// colour output is off.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    colorize: bool,
}

impl Painter {
    pub fn new(colorize: bool) -> Self {
        Self { colorize }
    }

    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub fn paint(&self, text: &str, descriptor: Option<&str>) -> String {
        match descriptor.map(dotted) {
            Some(style) if self.colorize && !text.is_empty() && !style.is_empty() => {
                // The dotted syntax has no italic token
                let mut console_style = Style::from_dotted_str(&style);
                if style.split('.').any(|part| part == "italic") {
                    console_style = console_style.italic();
                }
                console_style
                    .force_styling(true)
                    .apply_to(text)
                    .to_string()
            }
            _ => text.to_string(),
        }
    }

    pub fn paint_line(&self, line: &super::Line) -> String {
        line.spans
            .iter()
            .map(|span| self.paint(&span.text, span.style.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colours() {
        assert_eq!(dotted("red"), "red");
        assert_eq!(dotted("Bright_Blue"), "blue.bright");
        assert_eq!(dotted("dark_orange"), "208");
        assert_eq!(dotted("grey"), "black.bright");
        assert_eq!(dotted("bright_purple"), "");
        assert_eq!(dotted("invalid"), "");
    }

    #[test]
    fn test_hex_and_functional_colours() {
        assert_eq!(dotted("#3b82f6"), "75");
        assert_eq!(dotted("#3b82"), "");
        assert_eq!(dotted("rgb(255, 0, 0)"), "196");
        assert_eq!(dotted("color(208)"), "208");
    }

    #[test]
    fn test_grey_levels_map_to_ramp() {
        assert_eq!(dotted("grey0"), "232");
        assert_eq!(dotted("grey100"), "255");
        assert_eq!(dotted("grey101"), "");
    }

    #[test]
    fn test_rgb_to_index() {
        assert_eq!(rgb_to_index(0, 0, 0), 16);
        assert_eq!(rgb_to_index(255, 255, 255), 231);
        assert_eq!(rgb_to_index(255, 0, 0), 196);
        assert_eq!(rgb_to_index(0, 0, 255), 21);
    }

    #[test]
    fn test_descriptor_with_background() {
        assert_eq!(dotted("bold white on #3b82f6"), "bold.white.on_75");
        assert_eq!(dotted("on bright_black underline"), "on_black.on_bright.underlined");
        assert_eq!(dotted("strike none"), "strikethrough");
        assert_eq!(dotted("sparkly"), "");
        assert_eq!(dotted(""), "");
    }

    #[test]
    fn test_painter_without_colour_passes_text_through() {
        let painter = Painter::new(false);
        assert_eq!(painter.paint("hello", Some("bold red")), "hello");
    }

    #[test]
    fn test_painter_with_colour_emits_ansi() {
        let painter = Painter::new(true);
        let painted = painter.paint("hello", Some("bold red"));
        assert!(painted.contains("\u{1b}["));
        assert_eq!(console::strip_ansi_codes(&painted), "hello");
        assert_eq!(painter.paint("hello", Some("nonsense")), "hello");
        assert_eq!(painter.paint("hello", None), "hello");
    }

    #[test]
    fn test_painter_italic() {
        let painter = Painter::new(true);
        assert!(painter.paint("x", Some("italic")).contains("\u{1b}[3m"));
    }
}
