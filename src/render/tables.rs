use comfy_table::presets::NOTHING;
use comfy_table::{CellAlignment, ColumnConstraint, ContentArrangement, Table, Width};
use console::{measure_text_width, pad_str, Alignment};

use super::style::Painter;
use super::text::wrap_line;
use super::{BoxStyle, Line, Panel, Span, TableData};

/// Table creation helpers
pub fn create_table(box_style: BoxStyle) -> Table {
    let mut table = Table::new();
    table
        .load_preset(box_style.preset())
        .force_no_tty()
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn clamp(width: usize) -> u16 {
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn centred(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Center, None).into_owned()
}

/// Render `data` to lines no wider than `width`.
pub(crate) fn table_lines(data: &TableData, width: usize, painter: &Painter) -> Vec<String> {
    let mut table = create_table(data.box_style);
    if data.expand {
        table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
    }
    table.set_width(clamp(width));

    if !data.headers.is_empty() {
        let style = data.header_style.as_deref();
        table.set_header(
            data.headers
                .iter()
                .map(|label| painter.paint(label, style))
                .collect::<Vec<_>>(),
        );
    }
    for row in &data.rows {
        table.add_row(row.clone());
    }

    let body: Vec<String> = table.lines().collect();
    let mut lines = Vec::with_capacity(body.len() + 1);
    if let Some(title) = data.title.as_deref().filter(|t| !t.is_empty()) {
        let table_width = body.first().map_or(width, |l| measure_text_width(l));
        lines.push(centred(&painter.paint(title, Some("italic")), table_width));
    }
    lines.extend(body);
    lines
}

/// Two aligned columns: keys right-justified in `key_style`, then values
/// wrapped to whatever is left of `width`.
pub(crate) fn grid_lines(
    rows: &[(String, Line)],
    key_style: Option<&str>,
    width: usize,
    painter: &Painter,
) -> Vec<String> {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .force_no_tty()
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(clamp(width));
    for (key, value) in rows {
        table.add_row(vec![painter.paint(key, key_style), painter.paint_line(value)]);
    }
    if let Some(keys) = table.column_mut(0) {
        keys.set_padding((0, 1));
        keys.set_cell_alignment(CellAlignment::Right);
    }
    if let Some(values) = table.column_mut(1) {
        values.set_padding((0, 0));
    }
    table.lines().map(|line| line.trim_end().to_string()).collect()
}

/// Cells left for content once the border and padding are taken.
pub(crate) fn panel_inner_width(panel: &Panel, available: usize) -> usize {
    let border = if panel.box_style.has_sides() { 2 } else { 0 };
    available
        .saturating_sub(border + panel.padding.left + panel.padding.right)
        .max(1)
}

/// Wrap content lines to the panel interior and paint them, giving unstyled
/// spans the panel's interior style.
pub(crate) fn panel_rows(panel: &Panel, content: &[Line], inner: usize, painter: &Painter) -> Vec<String> {
    let interior = panel.style.as_deref();
    content
        .iter()
        .flat_map(|line| wrap_line(line, inner))
        .map(|line| {
            let filled = Line {
                spans: line
                    .spans
                    .into_iter()
                    .map(|span| match span.style {
                        Some(_) => span,
                        None => Span::styled(span.text, interior),
                    })
                    .collect(),
            };
            painter.paint_line(&filled)
        })
        .collect()
}

/// Frame already painted `rows` in a one-column table drawn with the
/// panel's box style, then paint the border and place the title.
pub(crate) fn panel_lines(
    panel: &Panel,
    rows: Vec<String>,
    available: usize,
    painter: &Painter,
) -> Vec<String> {
    let pad = panel.padding;
    let box_style = panel.box_style;
    let border = panel.border_style.as_deref();
    let title = panel.title.as_deref().filter(|t| !t.is_empty());

    let mut table = create_table(box_style);
    table.set_width(clamp(available));
    if panel.expand {
        table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
    }

    let blank = || vec![String::new()];
    for _ in 0..pad.top {
        table.add_row(blank());
    }
    if rows.is_empty() {
        table.add_row(blank());
    }
    for row in rows {
        table.add_row(vec![row]);
    }
    for _ in 0..pad.bottom {
        table.add_row(blank());
    }

    if let Some(column) = table.column_mut(0) {
        column.set_padding((clamp(pad.left), clamp(pad.right)));
        if let Some(title) = title {
            let least = (measure_text_width(title) + 4).min(available);
            column.set_constraint(ColumnConstraint::LowerBoundary(Width::Fixed(clamp(least))));
        }
    }

    let framed: Vec<String> = table.lines().collect();
    let last = framed.len().saturating_sub(1);
    let mut lines: Vec<String> = framed
        .into_iter()
        .enumerate()
        .map(|(i, line)| match i {
            0 if box_style.has_top() => match title {
                Some(title) => titled_border(&line, title, border, painter),
                None => painter.paint(&line, border),
            },
            i if i == last && box_style.has_bottom() => painter.paint(&line, border),
            _ if box_style.has_sides() => paint_sides(&line, border, painter),
            _ => line,
        })
        .collect();

    if let Some(title) = title.filter(|_| !box_style.has_top()) {
        let width = lines.first().map_or(available, |l| measure_text_width(l));
        lines.insert(0, centred(&painter.paint(title, border), width));
    }
    lines
}

/// Splice ` title ` into the middle of a top border line, keeping its
/// corners. Falls back to the bare border when the title does not fit.
fn titled_border(line: &str, title: &str, border: Option<&str>, painter: &Painter) -> String {
    let chars: Vec<char> = line.chars().collect();
    let title_width = measure_text_width(title) + 2;
    let (Some(&first), Some(&horizontal), Some(&last)) =
        (chars.first(), chars.get(1), chars.last())
    else {
        return painter.paint(line, border);
    };
    let run = chars.len().saturating_sub(2);
    if title_width + 2 > run {
        return painter.paint(line, border);
    }

    let remaining = run - title_width;
    let left = remaining / 2;
    let right = remaining - left;
    let horizontal = horizontal.to_string();
    format!(
        "{} {} {}",
        painter.paint(&format!("{first}{}", horizontal.repeat(left)), border),
        painter.paint(title, border),
        painter.paint(&format!("{}{last}", horizontal.repeat(right)), border),
    )
}

fn paint_sides(line: &str, border: Option<&str>, painter: &Painter) -> String {
    let mut chars = line.chars();
    match (chars.next(), chars.next_back()) {
        (Some(left), Some(right)) => format!(
            "{}{}{}",
            painter.paint(&left.to_string(), border),
            chars.as_str(),
            painter.paint(&right.to_string(), border),
        ),
        _ => line.to_string(),
    }
}
