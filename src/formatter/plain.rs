//! Plain-text formatter: fixed-width columns, no escape sequences.

use super::Formatter;
use crate::text::{Format, Text};

pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn apply_format(&self, chunk: &str, _format: &Format) -> String {
        chunk.to_string()
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
            out.push_str(&pad_row(
                &h.iter().map(|s| (*s).to_string()).collect::<Vec<_>>(),
                &widths,
            ));
            out.push('\n');
        }
        for row in rows {
            let rendered: Vec<String> = row
                .iter()
                .map(|cell| cell.as_ref().map(|t| self.apply(t)).unwrap_or_default())
                .collect();
            out.push_str(&pad_row(&rendered, &widths));
            out.push('\n');
        }
        out
    }
}

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let len = cell.chars().count();
            if len < *width {
                format!("{}{}", cell, " ".repeat(width - len))
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}
