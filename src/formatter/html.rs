//! HTML formatter for the optional interactive browser UI.
//!
//! Each rendered instruction becomes a `<span class="<kind>">`, with
//! rotation groups carrying a `data-rotation` attribute and branch
//! arrows carrying `id`/`data-branches-class`/`data-branch-target` so
//! client-side script can wire up hover/jump behavior.

use super::Formatter;
use crate::text::{Format, Text};

pub struct HtmlFormatter;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn kind_class(format: &Format) -> &'static str {
    match format {
        Format::None => "none",
        Format::Immediate => "immediate",
        Format::Stack => "stack",
        Format::Register => "register",
        Format::DelaySlot => "delay-slot",
        Format::DiffChange => "diff-change",
        Format::DiffAdd => "diff-add",
        Format::DiffRemove => "diff-remove",
        Format::SourceFilename => "source-filename",
        Format::SourceFunction => "source-function",
        Format::SourceOther => "source-other",
        Format::RegDiff { .. } => "reg-diff",
        Format::StackDiff { .. } => "stack-diff",
        Format::Branch { .. } => "branch",
    }
}

impl Formatter for HtmlFormatter {
    fn apply_format(&self, chunk: &str, format: &Format) -> String {
        if chunk.is_empty() {
            return String::new();
        }
        let class = kind_class(format);
        let mut attrs = String::new();
        match format {
            Format::RegDiff { group, key, .. } | Format::StackDiff { group, key, .. } => {
                attrs.push_str(&format!(" data-rotation=\"{};{}\"", group, escape(key)));
            }
            Format::Branch { group, from_line, to_line, is_target, .. } => {
                attrs.push_str(&format!(" data-branches-class=\"branch-{group}-{from_line}\""));
                if *is_target {
                    attrs.push_str(&format!(" id=\"branch-{group}-{from_line}-target\""));
                } else {
                    attrs.push_str(&format!(" data-branch-target=\"{to_line}\""));
                }
            }
            _ => {}
        }
        format!("<span class=\"{}\"{}>{}</span>", class, attrs, escape(chunk))
    }

    fn table(&self, header: Option<&[&str]>, rows: &[Vec<Option<Text>>], _column_width: usize) -> String {
        let mut out = String::from("<table class=\"diff\">\n");
        if let Some(h) = header {
            out.push_str("<thead><tr>");
            for cell in h {
                out.push_str(&format!("<th>{}</th>", escape(cell)));
            }
            out.push_str("</tr></thead>\n");
        }
        out.push_str("<tbody>\n");
        for row in rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str("<td>");
                if let Some(t) = cell {
                    out.push_str(&self.apply(t));
                }
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_angle_brackets() {
        let formatter = HtmlFormatter;
        let out = formatter.apply_format("a<b>c", &Format::None);
        assert_eq!(out, "<span class=\"none\">a&lt;b&gt;c</span>");
    }

    #[test]
    fn test_reg_diff_carries_rotation_attribute() {
        let formatter = HtmlFormatter;
        let out = formatter.apply_format(
            "v0",
            &Format::RegDiff { group: "base-reg", index: 0, key: "v0".to_string() },
        );
        assert!(out.contains("data-rotation=\"base-reg;v0\""));
        assert!(out.contains("class=\"reg-diff\""));
    }

    #[test]
    fn test_branch_target_carries_id_and_class() {
        let formatter = HtmlFormatter;
        let out = formatter.apply_format(
            "beql",
            &Format::Branch {
                group: "branch",
                index: 0,
                key: "4".to_string(),
                from_line: "0".to_string(),
                to_line: "4".to_string(),
                is_target: true,
            },
        );
        assert!(out.contains("id=\"branch-branch-0-target\""));
        assert!(out.contains("data-branches-class=\"branch-branch-0\""));
    }

    #[test]
    fn test_table_wraps_rows() {
        let formatter = HtmlFormatter;
        let rows = vec![vec![Some(Text::plain("a")), None]];
        let out = formatter.table(None, &rows, 50);
        assert!(out.starts_with("<table class=\"diff\">"));
        assert!(out.contains("<td><span class=\"none\">a</span></td><td></td>"));
    }
}
