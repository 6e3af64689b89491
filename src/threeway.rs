//! The threeway coordinator.
//!
//! Given a stored "previous" run's output rows and a fresh "current"
//! run's output rows -- both diffed against the same base -- produces a
//! three-column rendering showing what changed since the last rebuild,
//! independent of what differs from the base.
//!
//! Rows are segmented by base anchor (a row with `base.is_some()`); the
//! insertion-only runs between anchors are "chunks". Because both runs
//! share the same base, their anchor sequences line up positionally;
//! each pair of chunks is aligned by an inner key-based diff using
//! `OutputLine::key` (the unformatted current-side `original`) as the
//! equality hinge.

use crate::classify::OutputLine;
use crate::formatter::Formatter;
use crate::text::Text;

/// One rendered threeway row.
#[derive(Debug, Clone)]
pub struct ThreewayLine {
    /// Base-side text, present only at an anchor row.
    pub base: Option<Text>,
    /// The previous run's current-side text at this position, if any.
    pub previous: Option<Text>,
    /// The fresh run's current-side text at this position.
    pub current: Text,
    /// Alignment key, mirrored from the fresh run's `OutputLine`.
    pub key: Option<String>,
}

/// Coordinate `previous` and `current` into a three-column sequence.
pub fn coordinate(previous: &[OutputLine], current: &[OutputLine]) -> Vec<ThreewayLine> {
    let prev_segments = segment(previous);
    let cur_segments = segment(current);
    let n = prev_segments.len().max(cur_segments.len());

    let mut out = Vec::new();
    for idx in 0..n {
        let (p_run, p_anchor) = prev_segments.get(idx).cloned().unwrap_or((Vec::new(), None));
        let (c_run, c_anchor) = cur_segments.get(idx).cloned().unwrap_or((Vec::new(), None));
        out.extend(diff_chunk(&p_run, &c_run));
        match (p_anchor, c_anchor) {
            (Some(p), Some(c)) => out.push(ThreewayLine {
                base: p.base,
                previous: Some(p.current),
                current: c.current,
                key: c.key,
            }),
            (Some(p), None) => out.push(ThreewayLine {
                base: p.base,
                previous: Some(p.current),
                current: Text::new(),
                key: None,
            }),
            (None, Some(c)) => out.push(ThreewayLine {
                base: c.base,
                previous: None,
                current: c.current,
                key: c.key,
            }),
            (None, None) => {}
        }
    }
    out
}

/// Render a coordinated threeway sequence through `formatter` as a
/// three-column table with a `BASE / PREVIOUS / CURRENT` header.
pub fn render(formatter: &dyn Formatter, rows: &[ThreewayLine], column_width: usize) -> String {
    let table_rows: Vec<Vec<Option<Text>>> = rows
        .iter()
        .map(|row| vec![row.base.clone(), row.previous.clone(), Some(row.current.clone())])
        .collect();
    formatter.table(Some(&["BASE", "PREVIOUS", "CURRENT"]), &table_rows, column_width)
}

/// Split `rows` into `(insert run before anchor, anchor)` pairs, with a
/// final trailing entry whose anchor is `None` for any insertions after
/// the last base-anchored row.
fn segment(rows: &[OutputLine]) -> Vec<(Vec<OutputLine>, Option<OutputLine>)> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for row in rows {
        if row.base.is_some() {
            out.push((std::mem::take(&mut run), Some(row.clone())));
        } else {
            run.push(row.clone());
        }
    }
    out.push((run, None));
    out
}

/// Inner sequence diff over one pair of chunks, keyed by
/// `OutputLine::key`; rows with no key never match.
fn diff_chunk(prev: &[OutputLine], cur: &[OutputLine]) -> Vec<ThreewayLine> {
    let n = prev.len();
    let m = cur.len();
    let eq = |i: usize, j: usize| matches!((&prev[i].key, &cur[j].key), (Some(a), Some(b)) if a == b);

    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if eq(i, j) {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut i = 0;
    let mut j = 0;
    let mut out = Vec::new();
    while i < n && j < m {
        if eq(i, j) {
            out.push(ThreewayLine {
                base: cur[j].base.clone().or_else(|| prev[i].base.clone()),
                previous: Some(prev[i].current.clone()),
                current: cur[j].current.clone(),
                key: cur[j].key.clone(),
            });
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            out.push(ThreewayLine {
                base: prev[i].base.clone(),
                previous: Some(prev[i].current.clone()),
                current: Text::new(),
                key: None,
            });
            i += 1;
        } else {
            out.push(ThreewayLine {
                base: cur[j].base.clone(),
                previous: None,
                current: cur[j].current.clone(),
                key: cur[j].key.clone(),
            });
            j += 1;
        }
    }
    while i < n {
        out.push(ThreewayLine {
            base: prev[i].base.clone(),
            previous: Some(prev[i].current.clone()),
            current: Text::new(),
            key: None,
        });
        i += 1;
    }
    while j < m {
        out.push(ThreewayLine {
            base: cur[j].base.clone(),
            previous: None,
            current: cur[j].current.clone(),
            key: cur[j].key.clone(),
        });
        j += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(tag: &str) -> OutputLine {
        OutputLine {
            base: Some(Text::plain(tag)),
            current: Text::plain(tag),
            key: Some(tag.to_string()),
        }
    }

    fn insert(tag: &str) -> OutputLine {
        OutputLine {
            base: None,
            current: Text::plain(tag),
            key: Some(tag.to_string()),
        }
    }

    #[test]
    fn test_identical_runs_produce_matching_anchors_only() {
        let previous = vec![anchor("a"), anchor("b")];
        let current = previous.clone();
        let rows = coordinate(&previous, &current);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.base.is_some() && r.previous.is_some()));
    }

    #[test]
    fn test_new_insertion_has_no_previous() {
        let previous = vec![anchor("a"), anchor("b")];
        let current = vec![anchor("a"), insert("new"), anchor("b")];
        let rows = coordinate(&previous, &current);
        assert_eq!(rows.len(), 3);
        let inserted = rows.iter().find(|r| r.key.as_deref() == Some("new")).unwrap();
        assert!(inserted.previous.is_none());
    }

    #[test]
    fn test_matching_insertion_across_runs_aligns_by_key() {
        let previous = vec![anchor("a"), insert("x"), anchor("b")];
        let current = vec![anchor("a"), insert("x"), anchor("b")];
        let rows = coordinate(&previous, &current);
        let matched = rows.iter().find(|r| r.key.as_deref() == Some("x")).unwrap();
        assert!(matched.previous.is_some());
    }

    #[test]
    fn test_trailing_insertion_after_last_anchor() {
        let previous = vec![anchor("a")];
        let current = vec![anchor("a"), insert("tail")];
        let rows = coordinate(&previous, &current);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].key.as_deref(), Some("tail"));
        assert!(rows[1].previous.is_none());
    }
}
