//! ANSI terminal formatter: SGR escape codes plus a rotation palette.

use super::{Formatter, ROTATION_SLOTS};
use crate::text::{Format, Text};

const PALETTE: [&str; ROTATION_SLOTS] = ["31", "32", "33", "34", "35", "36", "91", "92", "93"];
const RESET: &str = "\x1b[0m";

fn sgr(code: &str, chunk: &str) -> String {
    if chunk.is_empty() {
        return String::new();
    }
    format!("\x1b[{}m{}{}", code, chunk, RESET)
}

pub struct AnsiFormatter;

impl Formatter for AnsiFormatter {
    fn apply_format(&self, chunk: &str, format: &Format) -> String {
        match format {
            Format::None => chunk.to_string(),
            Format::Immediate => sgr("36", chunk),
            Format::Stack => sgr("35", chunk),
            Format::Register => sgr("33", chunk),
            Format::DelaySlot => sgr("2", chunk),
            Format::DiffChange => sgr("34", chunk),
            Format::DiffAdd => sgr("32", chunk),
            Format::DiffRemove => sgr("31", chunk),
            Format::SourceFilename => sgr("2;37", chunk),
            Format::SourceFunction => sgr("1;37", chunk),
            Format::SourceOther => sgr("2", chunk),
            Format::RegDiff { index, .. } | Format::StackDiff { index, .. } => {
                sgr(PALETTE[index % ROTATION_SLOTS], chunk)
            }
            Format::Branch { .. } => sgr("4", chunk),
        }
    }

    fn table(&self, header: Option<&[&str]>, rows: &[Vec<Option<Text>>], column_width: usize) -> String {
        let ncols = header
            .map(|h| h.len())
            .or_else(|| rows.first().map(Vec::len))
            .unwrap_or(0);

        let mut widths = vec![column_width; ncols];
        if let Some(h) = header {
            for (i, cell) in h.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.as_ref().map(Text::display_width).unwrap_or(0);
                widths[i] = widths[i].max(w);
            }
        }

        let mut out = String::new();
        if let Some(h) = header {
            let cells: Vec<(String, usize)> =
                h.iter().map(|s| ((*s).to_string(), s.chars().count())).collect();
            out.push_str(&pad_row(&cells, &widths));
            out.push('\n');
        }
        for row in rows {
            let cells: Vec<(String, usize)> = row
                .iter()
                .map(|cell| match cell {
                    Some(t) => (self.apply(t), t.display_width()),
                    None => (String::new(), 0),
                })
                .collect();
            out.push_str(&pad_row(&cells, &widths));
            out.push('\n');
        }
        out
    }
}

/// Pad by plain-text width, not rendered-byte length, so escape codes
/// never shift a later column.
fn pad_row(cells: &[(String, usize)], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|((rendered, width), target)| {
            if *width < *target {
                format!("{}{}", rendered, " ".repeat(target - width))
            } else {
                rendered.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_wraps_in_yellow() {
        let formatter = AnsiFormatter;
        let out = formatter.apply_format("v0", &Format::Register);
        assert_eq!(out, "\x1b[33mv0\x1b[0m");
    }

    #[test]
    fn test_rotation_wraps_around_palette() {
        let formatter = AnsiFormatter;
        let first = formatter.apply_format(
            "v0",
            &Format::RegDiff { group: "base-reg", index: 0, key: "v0".to_string() },
        );
        let ninth = formatter.apply_format(
            "v1",
            &Format::RegDiff { group: "base-reg", index: 9, key: "v1".to_string() },
        );
        assert_eq!(first, ninth.replace("v1", "v0"));
    }

    #[test]
    fn test_padding_ignores_escape_codes() {
        let formatter = AnsiFormatter;
        let rows = vec![vec![Some(Text::styled("v0", Format::Register)), Some(Text::plain("x"))]];
        let out = formatter.table(None, &rows, 4);
        // the rendered first column is longer than 4 bytes due to escape
        // codes, but padding must still treat it as width 2.
        assert!(out.contains("\x1b[33mv0\x1b[0m  "));
    }
}
