//! Text layout: wrapping, highlighted code blocks and tree guides.
//!
//! Everything here works on [`Line`]s so the same layout can be painted with
//! or without colour.

use console::measure_text_width;

use super::highlight::highlight;
use super::{CodeBlock, Line, Span, TreeNode};

/// Greedy word wrap of a styled line to `width` cells.
///
/// Leading spaces are kept and repeated on every continuation line, so
/// indented code stays indented.
pub(crate) fn wrap_line(line: &Line, width: usize) -> Vec<Line> {
    let width = width.max(1);
    let plain = line.plain_text();
    if measure_text_width(&plain) <= width {
        return vec![line.clone()];
    }

    let indent = (plain.len() - plain.trim_start_matches(' ').len()).min(width - 1);
    if indent == 0 {
        return wrap_words(line, width);
    }
    let pad = " ".repeat(indent);
    wrap_words(&strip_indent(line, indent), width - indent)
        .into_iter()
        .map(|wrapped| {
            let mut line = Line::plain(pad.as_str());
            line.spans.extend(wrapped.spans);
            line
        })
        .collect()
}

fn strip_indent(line: &Line, mut indent: usize) -> Line {
    let mut out = Line::new();
    for span in &line.spans {
        let leading = span.text.len() - span.text.trim_start_matches(' ').len();
        let skip = leading.min(indent);
        indent -= skip;
        if skip < span.text.len() {
            out.spans
                .push(Span::styled(&span.text[skip..], span.style.as_deref()));
        }
    }
    out
}

fn wrap_words(line: &Line, width: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::new();
    let mut used = 0;

    for span in &line.spans {
        let style = span.style.as_deref();
        for (i, word) in span.text.split(' ').enumerate() {
            let word_width = measure_text_width(word);
            let space = usize::from(i > 0 && used > 0);

            if used + space + word_width > width && used > 0 {
                lines.push(std::mem::take(&mut current));
                used = 0;
            } else if space == 1 {
                current.spans.push(Span::styled(" ", style));
                used += 1;
            }

            // Words longer than a whole line are split hard
            let mut rest = word.to_string();
            while measure_text_width(&rest) > width - used {
                let (mut head, mut tail) = split_at_width(&rest, width - used);
                if head.is_empty() {
                    if used > 0 {
                        lines.push(std::mem::take(&mut current));
                        used = 0;
                        continue;
                    }
                    // A single glyph wider than the line
                    let mut chars = rest.chars();
                    head = chars.next().map(String::from).unwrap_or_default();
                    tail = chars.collect();
                }
                current.spans.push(Span::styled(head, style));
                lines.push(std::mem::take(&mut current));
                used = 0;
                rest = tail;
            }
            if !rest.is_empty() {
                used += measure_text_width(&rest);
                current.spans.push(Span::styled(rest, style));
            }
        }
    }
    if !current.spans.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_at_width(text: &str, width: usize) -> (String, String) {
    let mut head = String::new();
    let mut used = 0;
    let mut chars = text.chars();
    for c in chars.by_ref() {
        let w = measure_text_width(&c.to_string());
        if used + w > width {
            let mut tail = c.to_string();
            tail.extend(chars);
            return (head, tail);
        }
        used += w;
        head.push(c);
    }
    (head, String::new())
}

/// Highlighted code lines, numbered when asked, cropped or wrapped to
/// `width`.
pub(crate) fn code_lines(block: &CodeBlock, width: usize) -> Vec<Line> {
    let code = block.code.replace('\t', "    ");
    let source = highlight(&code, &block.language, block.syntax_theme.as_deref());
    let gutter = source.len().max(1).to_string().len();
    let body_width = if block.line_numbers {
        width.saturating_sub(gutter + 2).max(1)
    } else {
        width.max(1)
    };

    let mut lines = Vec::new();
    for (number, text) in source.iter().enumerate() {
        let pieces = if block.wrap {
            wrap_line(text, body_width)
        } else {
            vec![crop_line(text, body_width)]
        };

        for (i, piece) in pieces.into_iter().enumerate() {
            let mut line = Line::new();
            if block.line_numbers {
                let label = if i == 0 {
                    format!("{:>gutter$}  ", number + 1)
                } else {
                    " ".repeat(gutter + 2)
                };
                line = line.push(label, Some("dim"));
            }
            line.spans.extend(piece.spans);
            lines.push(line);
        }
    }
    lines
}

/// Cut a line to `width` cells, marking the cut with an ellipsis.
fn crop_line(line: &Line, width: usize) -> Line {
    if measure_text_width(&line.plain_text()) <= width {
        return line.clone();
    }

    let budget = width.saturating_sub(1);
    let mut out = Line::new();
    let mut used = 0;
    for span in &line.spans {
        let style = span.style.as_deref();
        let (head, tail) = split_at_width(&span.text, budget - used);
        used += measure_text_width(&head);
        out.spans.push(Span::styled(head, style));
        if !tail.is_empty() {
            out.spans.push(Span::styled("…", style));
            break;
        }
    }
    out
}

pub(crate) fn tree_lines(root: &TreeNode) -> Vec<Line> {
    let mut out = vec![root.label.clone()];
    tree_children(&root.children, "", &mut out);
    out
}

fn tree_children(children: &[TreeNode], prefix: &str, out: &mut Vec<Line>) {
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate() {
        let (branch, carry) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let mut line = Line::plain(format!("{prefix}{branch}"));
        line.spans.extend(child.label.spans.iter().cloned());
        out.push(line);
        tree_children(&child.children, &format!("{prefix}{carry}"), out);
    }
}
