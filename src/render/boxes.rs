//! Box styles and horizontal rules.

use comfy_table::presets::{ASCII_FULL_CONDENSED, UTF8_FULL_CONDENSED};
use console::measure_text_width;

use super::style::Painter;
use super::Line;

/// Border shapes for panels and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxStyle {
    #[default]
    Rounded,
    Square,
    Heavy,
    Double,
    Ascii,
    Minimal,
    MinimalHeavyHead,
    MinimalDoubleHead,
    Simple,
    SimpleHeavy,
    SimpleHead,
}

impl BoxStyle {
    /// Look up a box style by name. Case-insensitive; `-` and spaces count as
    /// `_`. Unknown names give [`BoxStyle::Rounded`].
    pub fn resolve(name: &str) -> BoxStyle {
        let key = name.trim().to_uppercase().replace(['-', ' '], "_");
        match key.as_str() {
            "ROUNDED" | "ROUND" => BoxStyle::Rounded,
            "SQUARE" => BoxStyle::Square,
            "HEAVY" | "THICK" => BoxStyle::Heavy,
            "DOUBLE" => BoxStyle::Double,
            "ASCII" => BoxStyle::Ascii,
            "MINIMAL" => BoxStyle::Minimal,
            "MINIMAL_HEAVY" | "MINIMAL_HEAVY_HEAD" => BoxStyle::MinimalHeavyHead,
            "MINIMAL_DOUBLE" | "MINIMAL_DOUBLE_HEAD" => BoxStyle::MinimalDoubleHead,
            "SIMPLE" => BoxStyle::Simple,
            "SIMPLE_HEAVY" => BoxStyle::SimpleHeavy,
            "SIMPLE_HEAD" => BoxStyle::SimpleHead,
            _ => BoxStyle::Rounded,
        }
    }

    /// comfy-table preset string for this style.
    pub(crate) fn preset(self) -> &'static str {
        match self {
            BoxStyle::Rounded => ROUNDED,
            BoxStyle::Square => UTF8_FULL_CONDENSED,
            BoxStyle::Heavy => HEAVY,
            BoxStyle::Double => DOUBLE,
            BoxStyle::Ascii => ASCII_FULL_CONDENSED,
            BoxStyle::Minimal => MINIMAL,
            BoxStyle::MinimalHeavyHead => MINIMAL_HEAVY_HEAD,
            BoxStyle::MinimalDoubleHead => MINIMAL_DOUBLE_HEAD,
            BoxStyle::Simple => SIMPLE,
            BoxStyle::SimpleHeavy => SIMPLE_HEAVY,
            BoxStyle::SimpleHead => SIMPLE_HEAD,
        }
    }

    fn component(self, index: usize) -> bool {
        self.preset().chars().nth(index).is_some_and(|c| c != ' ')
    }

    pub(crate) fn has_top(self) -> bool {
        self.component(2)
    }

    pub(crate) fn has_bottom(self) -> bool {
        self.component(3)
    }

    pub(crate) fn has_sides(self) -> bool {
        self.component(0)
    }
}

// Component order: left, right, top, bottom, header left/line/middle/right,
// vertical, horizontal, middle, left/right/top/bottom intersections, then
// the four corners.
const ROUNDED: &str = "││──╞═╪╡┆    ┬┴╭╮╰╯";
const HEAVY: &str = "┃┃━━┣━╋┫┃    ┳┻┏┓┗┛";
const DOUBLE: &str = "║║══╠═╬╣║    ╦╩╔╗╚╝";
const MINIMAL: &str = "     ─┼ │          ";
const MINIMAL_HEAVY_HEAD: &str = "     ━┿ │          ";
const MINIMAL_DOUBLE_HEAD: &str = "     ═╪ │          ";
const SIMPLE: &str = "  ── ─             ";
const SIMPLE_HEAVY: &str = "  ━━ ━             ";
const SIMPLE_HEAD: &str = "     ─             ";

fn repeat(c: char, n: usize) -> String {
    std::iter::repeat(c).take(n).collect()
}

/// Lay out a horizontal rule of `width` cells, with an optional centred label.
pub(crate) fn rule_lines(
    label: Option<&Line>,
    style: Option<&str>,
    width: usize,
    painter: &Painter,
) -> String {
    let label = label.filter(|l| !l.is_empty());
    let Some(label) = label else {
        return painter.paint(&repeat('─', width), style);
    };

    let text = painter.paint_line(label);
    let label_width = measure_text_width(&text);
    if label_width + 4 > width {
        return text;
    }
    let remaining = width - label_width - 2;
    let left = remaining / 2;
    let right = remaining - left;
    format!(
        "{} {} {}",
        painter.paint(&repeat('─', left), style),
        text,
        painter.paint(&repeat('─', right), style)
    )
}
