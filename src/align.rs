//! The sequence aligner.
//!
//! Aligns two instruction streams on their `diff_row` strings, producing
//! a list of `(base, current)` pairs with `None` standing in for an
//! insertion or deletion. Two algorithms are available: a Levenshtein
//! minimal-edit-distance aligner (the default), and a difflib-style
//! longest-common-subsequence aligner used either on request or as an
//! automatic fallback when the Levenshtein size guards trip.

use crate::config::Algorithm;
use crate::parser::Line;

/// Token count above which a Levenshtein token-to-codepoint mapping can
/// no longer stay inside the Unicode scalar value range.
const MAX_DISTINCT_TOKENS: usize = 0x110000;
/// Heuristic `|a| * |b|` budget for the Levenshtein DP table.
const MAX_TABLE_CELLS: u64 = 400_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpTag {
    Equal,
    Replace,
    Insert,
    Delete,
}

#[derive(Debug, Clone)]
struct Op {
    tag: OpTag,
    a_start: usize,
    a_end: usize,
    b_start: usize,
    b_end: usize,
}

/// Align `base` against `current`, choosing the fallback automatically
/// when `algorithm` is [`Algorithm::Levenshtein`] but its size guards
/// reject the input.
pub fn align(base: &[Line], current: &[Line], algorithm: Algorithm) -> Vec<(Option<Line>, Option<Line>)> {
    let a_rows: Vec<&str> = base.iter().map(|l| l.diff_row.as_str()).collect();
    let b_rows: Vec<&str> = current.iter().map(|l| l.diff_row.as_str()).collect();

    let ops = match algorithm {
        Algorithm::Levenshtein => levenshtein_opcodes(&a_rows, &b_rows)
            .unwrap_or_else(|| difflib_opcodes(&a_rows, &b_rows)),
        Algorithm::Difflib => difflib_opcodes(&a_rows, &b_rows),
    };

    let mut out = Vec::new();
    for op in ops {
        let a_len = op.a_end - op.a_start;
        let b_len = op.b_end - op.b_start;
        let n = a_len.max(b_len);
        for i in 0..n {
            let a_line = (i < a_len).then(|| base[op.a_start + i].clone());
            let b_line = (i < b_len).then(|| current[op.b_start + i].clone());
            out.push((a_line, b_line));
        }
    }
    out
}

fn levenshtein_opcodes(a: &[&str], b: &[&str]) -> Option<Vec<Op>> {
    let n = a.len();
    let m = b.len();
    if (n as u64) * (m as u64) > MAX_TABLE_CELLS {
        return None;
    }

    let mut token_ids: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
    let mut next_id: u32 = 0;
    let mut encode = |tokens: &[&str]| -> Vec<u32> {
        tokens
            .iter()
            .map(|t| {
                *token_ids.entry(t).or_insert_with(|| {
                    let id = next_id;
                    next_id += 1;
                    id
                })
            })
            .collect()
    };
    let a_ids = encode(a);
    let b_ids = encode(b);
    if next_id as usize >= MAX_DISTINCT_TOKENS {
        return None;
    }

    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i as u32;
    }
    for j in 0..=m {
        dp[0][j] = j as u32;
    }
    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if a_ids[i - 1] == b_ids[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j - 1].min(dp[i - 1][j]).min(dp[i][j - 1])
            };
        }
    }

    let mut i = n;
    let mut j = m;
    let mut steps = Vec::with_capacity(n + m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a_ids[i - 1] == b_ids[j - 1] && dp[i][j] == dp[i - 1][j - 1] {
            steps.push(OpTag::Equal);
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && dp[i][j] == dp[i - 1][j - 1] + 1 {
            steps.push(OpTag::Replace);
            i -= 1;
            j -= 1;
        } else if i > 0 && dp[i][j] == dp[i - 1][j] + 1 {
            steps.push(OpTag::Delete);
            i -= 1;
        } else {
            steps.push(OpTag::Insert);
            j -= 1;
        }
    }
    steps.reverse();
    Some(merge_steps(steps))
}

fn difflib_opcodes(a: &[&str], b: &[&str]) -> Vec<Op> {
    let n = a.len();
    let m = b.len();
    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut i = 0;
    let mut j = 0;
    let mut steps = Vec::with_capacity(n + m);
    while i < n && j < m {
        if a[i] == b[j] {
            steps.push(OpTag::Equal);
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            steps.push(OpTag::Delete);
            i += 1;
        } else {
            steps.push(OpTag::Insert);
            j += 1;
        }
    }
    while i < n {
        steps.push(OpTag::Delete);
        i += 1;
    }
    while j < m {
        steps.push(OpTag::Insert);
        j += 1;
    }
    refine_replace(merge_steps(steps))
}

fn merge_steps(steps: Vec<OpTag>) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut a = 0;
    let mut b = 0;
    let mut idx = 0;
    while idx < steps.len() {
        let tag = steps[idx];
        let start_a = a;
        let start_b = b;
        while idx < steps.len() && steps[idx] == tag {
            match tag {
                OpTag::Equal | OpTag::Replace => {
                    a += 1;
                    b += 1;
                }
                OpTag::Delete => a += 1,
                OpTag::Insert => b += 1,
            }
            idx += 1;
        }
        ops.push(Op {
            tag,
            a_start: start_a,
            a_end: a,
            b_start: start_b,
            b_end: b,
        });
    }
    ops
}

/// Difflib's longest-common-subsequence backbone never emits `replace`
/// directly; a delete run immediately followed by an insert run (or
/// vice versa) is the same thing `difflib.get_opcodes` folds into one.
fn refine_replace(ops: Vec<Op>) -> Vec<Op> {
    let mut out = Vec::with_capacity(ops.len());
    let mut idx = 0;
    while idx < ops.len() {
        if idx + 1 < ops.len() && ops[idx].tag == OpTag::Delete && ops[idx + 1].tag == OpTag::Insert {
            let (d, ins) = (&ops[idx], &ops[idx + 1]);
            out.push(Op {
                tag: OpTag::Replace,
                a_start: d.a_start,
                a_end: d.a_end,
                b_start: ins.b_start,
                b_end: ins.b_end,
            });
            idx += 2;
        } else if idx + 1 < ops.len() && ops[idx].tag == OpTag::Insert && ops[idx + 1].tag == OpTag::Delete {
            let (ins, d) = (&ops[idx], &ops[idx + 1]);
            out.push(Op {
                tag: OpTag::Replace,
                a_start: d.a_start,
                a_end: d.a_end,
                b_start: ins.b_start,
                b_end: ins.b_end,
            });
            idx += 2;
        } else {
            out.push(ops[idx].clone());
            idx += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(diff_row: &str) -> Line {
        Line {
            mnemonic: diff_row.split_whitespace().next().unwrap_or("").to_string(),
            original: diff_row.to_string(),
            normalized_original: diff_row.to_string(),
            diff_row: diff_row.to_string(),
            line_num: "0".to_string(),
            branch_target: None,
            source_lines: Vec::new(),
            comment: None,
        }
    }

    #[test]
    fn test_identical_sequences_all_equal() {
        let a = vec![line("addiu <reg>,<reg>,<imm>"), line("jr ra")];
        let b = a.clone();
        let pairs = align(&a, &b, Algorithm::Levenshtein);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|(x, y)| x.is_some() && y.is_some()));
    }

    #[test]
    fn test_single_substitution() {
        let a = vec![line("addiu <reg>,<reg>,<imm>")];
        let b = vec![line("addu <reg>,<reg>,<reg>")];
        let pairs = align(&a, &b, Algorithm::Levenshtein);
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].0.is_some());
        assert!(pairs[0].1.is_some());
    }

    #[test]
    fn test_insertion_detected() {
        let a = vec![line("nop"), line("jr ra")];
        let b = vec![line("nop"), line("addiu <reg>,<reg>,<imm>"), line("jr ra")];
        let pairs = align(&a, &b, Algorithm::Levenshtein);
        assert_eq!(pairs.len(), 3);
        let inserted = pairs.iter().find(|(x, _)| x.is_none());
        assert!(inserted.is_some());
        assert!(inserted.unwrap().1.is_some());
    }

    #[test]
    fn test_deletion_detected() {
        let a = vec![line("nop"), line("addiu <reg>,<reg>,<imm>"), line("jr ra")];
        let b = vec![line("nop"), line("jr ra")];
        let pairs = align(&a, &b, Algorithm::Levenshtein);
        let deleted = pairs.iter().find(|(_, y)| y.is_none());
        assert!(deleted.is_some());
        assert!(deleted.unwrap().0.is_some());
    }

    #[test]
    fn test_difflib_algorithm_matches_identical_input() {
        let a = vec![line("nop"), line("jr ra")];
        let b = a.clone();
        let pairs = align(&a, &b, Algorithm::Difflib);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|(x, y)| x.is_some() && y.is_some()));
    }

    #[test]
    fn test_difflib_algorithm_detects_replace() {
        let a = vec![line("addiu <reg>,<reg>,<imm>")];
        let b = vec![line("addu <reg>,<reg>,<reg>")];
        let pairs = align(&a, &b, Algorithm::Difflib);
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].0.is_some());
        assert!(pairs[0].1.is_some());
    }
}
