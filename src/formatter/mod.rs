//! The pluggable rendering backend.
//!
//! Three variants share one small interface: escape/style a single
//! segment, concatenate a [`Text`] value, and lay rows out into a
//! table. Plain and ANSI differ only in `apply_format`/padding; HTML
//! additionally carries rotation and branch wiring for the interactive
//! browser UI. Matching on [`crate::config::FormatterKind`] at the call
//! site avoids dynamic dispatch on the hot path.

pub mod ansi;
pub mod html;
pub mod plain;

use crate::classify::OutputLine;
use crate::config::FormatterKind;
use crate::text::{Format, Text};

/// Number of distinct colors/classes in the rotation palette before it
/// wraps around.
pub const ROTATION_SLOTS: usize = 9;

/// Shared rendering surface implemented by [`plain::PlainFormatter`],
/// [`ansi::AnsiFormatter`] and [`html::HtmlFormatter`].
pub trait Formatter {
    /// Escape and style one chunk.
    fn apply_format(&self, chunk: &str, format: &Format) -> String;

    /// Concatenate `apply_format` over every segment.
    fn apply(&self, text: &Text) -> String {
        text.segments().map(|(c, f)| self.apply_format(c, f)).collect()
    }

    /// Lay out `rows` (each a list of optional columns, 2 for the plain
    /// two-way diff or 3 under threeway) into a single rendered table,
    /// padding to at least `column_width` per column.
    fn table(&self, header: Option<&[&str]>, rows: &[Vec<Option<Text>>], column_width: usize) -> String;
}

/// Construct the formatter named by `kind`.
pub fn formatter_for(kind: FormatterKind) -> Box<dyn Formatter> {
    match kind {
        FormatterKind::Plain => Box::new(plain::PlainFormatter),
        FormatterKind::Ansi => Box::new(ansi::AnsiFormatter),
        FormatterKind::Html => Box::new(html::HtmlFormatter),
    }
}

/// Render a full set of classified rows as a two-column (or, under
/// threeway, three-column) table, one row per [`OutputLine`].
pub fn render(formatter: &dyn Formatter, rows: &[OutputLine], column_width: usize) -> String {
    let table_rows: Vec<Vec<Option<Text>>> = rows
        .iter()
        .map(|row| vec![row.base.clone(), Some(row.current.clone())])
        .collect();
    formatter.table(None, &table_rows, column_width)
}

/// The row-kind marker printed in the leftmost gutter: ` ` exact equal
/// or delay-slot, `r`/`s`/`i` soft-diff refinements, `|` replace, `>`
/// insert, `<` delete.
pub fn row_prefix(row: &OutputLine) -> char {
    if row.base.is_none() {
        return '>';
    }
    if row.current.is_empty() {
        return '<';
    }
    let formats: Vec<&Format> = row.current.segments().map(|(_, f)| f).collect();
    if formats.iter().any(|f| matches!(f, Format::DiffChange)) {
        '|'
    } else if formats.iter().any(|f| matches!(f, Format::RegDiff { .. })) {
        'r'
    } else if formats.iter().any(|f| matches!(f, Format::StackDiff { .. })) {
        's'
    } else if formats.iter().any(|f| matches!(f, Format::Immediate)) {
        'i'
    } else {
        ' '
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::OutputLine;

    #[test]
    fn test_row_prefix_insert() {
        let row = OutputLine {
            base: None,
            current: Text::styled("addiu", Format::DiffAdd),
            key: None,
        };
        assert_eq!(row_prefix(&row), '>');
    }

    #[test]
    fn test_row_prefix_delete() {
        let row = OutputLine {
            base: Some(Text::styled("addiu", Format::DiffRemove)),
            current: Text::new(),
            key: None,
        };
        assert_eq!(row_prefix(&row), '<');
    }

    #[test]
    fn test_row_prefix_exact_equal() {
        let row = OutputLine {
            base: Some(Text::plain("addiu")),
            current: Text::plain("addiu"),
            key: Some("addiu".to_string()),
        };
        assert_eq!(row_prefix(&row), ' ');
    }
}
