//! The classifier and styler.
//!
//! Turns aligned `(Option<Line>, Option<Line>)` pairs into [`OutputLine`]
//! values: a row kind (decided by the equality ladder) plus two styled
//! [`Text`] columns. Rotation coloring for registers, stack offsets and
//! branch arrows is tracked independently per column so that, e.g., the
//! Nth distinct register on the base side and the Nth distinct register
//! on the current side share a rotation slot even when their names
//! differ.

use std::collections::HashMap;

use crate::arch::{self, ArchDescriptor};
use crate::config::Config;
use crate::parser::Line;
use crate::text::{Format, Text};

/// One rendered row: a base column (absent for a pure insertion), a
/// current column, and an optional alignment key.
#[derive(Debug, Clone)]
pub struct OutputLine {
    /// Styled base-side text, or `None` for an insertion / source
    /// annotation with no base counterpart.
    pub base: Option<Text>,
    /// Styled current-side text.
    pub current: Text,
    /// The unformatted current-side `original`, used by the threeway
    /// coordinator to interdiff successive runs.
    pub key: Option<String>,
}

/// Classify and style every aligned pair into output rows, followed by
/// any interleaved source annotations attached to the current-side line.
pub fn build_output(pairs: &[(Option<Line>, Option<Line>)], config: &Config) -> Vec<OutputLine> {
    let mut rotations = Rotations::default();
    let mut out = Vec::new();

    // Falls back to the MIPS descriptor for the (test-only) case of a
    // caller building pairs directly without going through `diff_rows`,
    // which validates `config.arch` against the registry first.
    let descriptor = arch::registry(&config.arch).unwrap_or_else(|| arch::registry("mips").unwrap());

    let base_targets = branch_target_index(pairs.iter().filter_map(|(b, _)| b.as_ref()));
    let cur_targets = branch_target_index(pairs.iter().filter_map(|(_, c)| c.as_ref()));

    for (base, current) in pairs {
        for src in current.iter().flat_map(|l| l.source_lines.iter()) {
            out.push(source_annotation_line(src));
        }
        let mut row = classify_pair(base.as_ref(), current.as_ref(), config, descriptor, &mut rotations);
        if config.show_branches {
            if let Some(b) = base {
                row.base = row.base.map(|t| annotate_branch(t, b, "base-branch", &base_targets));
            }
            if let Some(c) = current {
                row.current = annotate_branch(row.current, c, "my-branch", &cur_targets);
            }
        }
        out.push(row);
    }
    out
}

/// Maps a branch target's line number to the line number of the (first)
/// branch instruction that targets it, within one column.
fn branch_target_index<'a>(lines: impl Iterator<Item = &'a Line>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in lines {
        if let Some(target) = &line.branch_target {
            map.entry(target.clone()).or_insert_with(|| line.line_num.clone());
        }
    }
    map
}

/// Prepends an in-arrow if `line` is itself a branch target, and appends
/// an out-arrow if `line` has one, both tagged with `group` so the
/// source and target ends of the same arrow can be correlated client-side.
fn annotate_branch(text: Text, line: &Line, group: &'static str, targets: &HashMap<String, String>) -> Text {
    let mut result = Text::new();
    if let Some(from_line) = targets.get(&line.line_num) {
        result = result.concat(Text::styled(
            "~>",
            Format::Branch {
                group,
                index: 0,
                key: from_line.clone(),
                from_line: from_line.clone(),
                to_line: line.line_num.clone(),
                is_target: true,
            },
        ));
    }
    result = result.concat(text);
    if let Some(target) = &line.branch_target {
        result = result.concat(Text::styled(
            "->",
            Format::Branch {
                group,
                index: 0,
                key: target.clone(),
                from_line: line.line_num.clone(),
                to_line: target.clone(),
                is_target: false,
            },
        ));
    }
    result
}

struct Rotations {
    base_reg: RotationTracker,
    cur_reg: RotationTracker,
    base_stack: RotationTracker,
    cur_stack: RotationTracker,
}

impl Default for Rotations {
    /// Stack groups start their index at 4 so stack and register colors
    /// diverge even when both start rotating from an empty `seen` map.
    fn default() -> Self {
        Rotations {
            base_reg: RotationTracker::starting_at(0),
            cur_reg: RotationTracker::starting_at(0),
            base_stack: RotationTracker::starting_at(4),
            cur_stack: RotationTracker::starting_at(4),
        }
    }
}

struct RotationTracker {
    seen: HashMap<String, usize>,
    next: usize,
}

impl RotationTracker {
    fn starting_at(start: usize) -> Self {
        RotationTracker {
            seen: HashMap::new(),
            next: start,
        }
    }

    fn slot(&mut self, key: &str) -> usize {
        if let Some(&idx) = self.seen.get(key) {
            return idx;
        }
        let idx = self.next;
        self.next += 1;
        self.seen.insert(key.to_string(), idx);
        idx
    }
}

fn source_annotation_line(src: &str) -> OutputLine {
    let trimmed = src.trim();
    let format = if trimmed.ends_with(':') && trimmed.contains('(') && trimmed.ends_with("):") {
        Format::SourceFunction
    } else if looks_like_filename(trimmed) {
        Format::SourceFilename
    } else {
        Format::SourceOther
    };
    let text = match format {
        Format::SourceFunction => Text::styled(demangle_if_cpp(trimmed), format),
        _ => Text::styled(src.to_string(), format),
    };
    OutputLine {
        base: None,
        current: text,
        key: None,
    }
}

fn looks_like_filename(s: &str) -> bool {
    s.ends_with(".c") || s.ends_with(".cpp") || s.ends_with(".cc") || s.ends_with(".h")
        || s.contains('/') && !s.contains('(')
}

fn demangle_if_cpp(s: &str) -> String {
    let Some(paren) = s.find('(') else { return s.to_string() };
    let (name, rest) = s.split_at(paren);
    match cpp_demangle::Symbol::new(name) {
        Ok(sym) => format!("{}{}", sym, rest),
        Err(_) => s.to_string(),
    }
}

fn classify_pair(
    base: Option<&Line>,
    current: Option<&Line>,
    config: &Config,
    arch: &ArchDescriptor,
    rotations: &mut Rotations,
) -> OutputLine {
    let key = current.map(|l| l.original.clone());

    let (base_text, current_text) = match (base, current) {
        (None, Some(c)) => (None, style_insert(c)),
        (Some(b), None) => (Some(style_delete(b)), Text::new()),
        (Some(b), Some(c)) => style_pair(b, c, config, arch, rotations),
        (None, None) => (None, Text::new()),
    };

    OutputLine {
        base: base_text,
        current: current_text,
        key,
    }
}

fn style_insert(line: &Line) -> Text {
    Text::styled(line.original.clone(), Format::DiffAdd)
}

fn style_delete(line: &Line) -> Text {
    Text::styled(line.original.clone(), Format::DiffRemove)
}

fn style_pair(
    base: &Line,
    current: &Line,
    config: &Config,
    arch: &ArchDescriptor,
    rotations: &mut Rotations,
) -> (Option<Text>, Text) {
    if base.diff_row != current.diff_row {
        // `replace`: the alignment key itself differs, color the whole
        // row rather than attempting operand-level highlighting.
        return (
            Some(Text::styled(base.original.clone(), Format::DiffChange)),
            Text::styled(current.original.clone(), Format::DiffChange),
        );
    }

    if base.normalized_original == current.normalized_original {
        // Exact equal (both sentinels included): no highlighting.
        return (
            Some(Text::plain(base.original.clone())),
            Text::plain(current.original.clone()),
        );
    }

    if base.diff_row == crate::parser::DELAY_SLOT_SENTINEL {
        return (
            Some(Text::styled(base.original.clone(), Format::DelaySlot)),
            Text::styled(current.original.clone(), Format::DelaySlot),
        );
    }

    // Soft diff: same diff_row, different normalized_original. Refine
    // into imm-only / stack-only / reg-diff by stripping categories in
    // order and seeing which stage first makes the two sides equal.
    soft_diff(base, current, config, arch, rotations)
}

fn soft_diff(
    base: &Line,
    current: &Line,
    config: &Config,
    arch: &ArchDescriptor,
    rotations: &mut Rotations,
) -> (Option<Text>, Text) {
    let base_text = base.original.as_str();
    let cur_text = current.original.as_str();

    if config.show_branches {
        if let (Some(bt), Some(ct)) = (&base.branch_target, &current.branch_target) {
            let base_rel = hex_to_i64(bt).zip(hex_to_i64(&base.line_num)).map(|(t, l)| t - l);
            let cur_rel = hex_to_i64(ct).zip(hex_to_i64(&current.line_num)).map(|(t, l)| t - l);
            if base_rel.is_some() && base_rel == cur_rel {
                // Same relative target: not a real divergence on its own.
                if only_immediates_differ(base_text, cur_text, arch) {
                    return build_imm_only(base, current);
                }
            }
        }
    }

    // Stack-relative operands are already folded into the `addr(sp)`
    // diff-row token, so a digit-only divergence on such a line is a
    // stack offset, not a plain immediate; check it first or
    // `only_immediates_differ`'s register-aware stripping would steal it.
    if only_stack_offsets_differ(base, current) {
        return build_stack_only(base, current, rotations);
    }
    if only_immediates_differ(base_text, cur_text, arch) {
        return build_imm_only(base, current);
    }
    build_reg_diff(base, current, rotations)
}

/// True if `base` and `current` differ only in their non-register
/// immediate literals.
///
/// Masks every register token (via `arch.re_register`) before stripping
/// immediates, so that digits embedded in a register name (`v0`, `t9`,
/// `r3`, ...) are never mistaken for an immediate literal -- a blanket
/// digit strip would equate a register-only diff (`v0` vs `v1`) with an
/// imm-only one, since both reduce to the same digit-free skeleton.
fn only_immediates_differ(base: &str, current: &str, arch: &ArchDescriptor) -> bool {
    let mask = |s: &str| mask_immediates_outside_registers(s, arch);
    mask(base) == mask(current) && base != current
}

/// Replaces every `re_generic_imm` match in `text` with `<imm>`, except
/// matches that fall entirely inside a `re_register` span.
fn mask_immediates_outside_registers(text: &str, arch: &ArchDescriptor) -> String {
    let reg_spans: Vec<(usize, usize)> = arch.re_register.find_iter(text).map(|m| (m.start(), m.end())).collect();
    let mut out = String::new();
    let mut last = 0;
    for m in arch.re_generic_imm.find_iter(text) {
        if reg_spans.iter().any(|&(s, e)| m.start() >= s && m.end() <= e) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str("<imm>");
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

fn only_stack_offsets_differ(base: &Line, current: &Line) -> bool {
    base.diff_row.contains("addr(sp)") || current.diff_row.contains("addr(sp)")
}

fn build_imm_only(base: &Line, current: &Line) -> (Option<Text>, Text) {
    (
        Some(Text::styled(base.original.clone(), Format::Immediate)),
        Text::styled(current.original.clone(), Format::Immediate),
    )
}

fn build_stack_only(base: &Line, current: &Line, rotations: &mut Rotations) -> (Option<Text>, Text) {
    let base_idx = rotations.base_stack.slot(&base.original);
    let cur_idx = rotations.cur_stack.slot(&current.original);
    (
        Some(Text::styled(
            base.original.clone(),
            Format::StackDiff {
                group: "base-stack",
                index: base_idx,
                key: base.original.clone(),
            },
        )),
        Text::styled(
            current.original.clone(),
            Format::StackDiff {
                group: "my-stack",
                index: cur_idx,
                key: current.original.clone(),
            },
        ),
    )
}

fn build_reg_diff(base: &Line, current: &Line, rotations: &mut Rotations) -> (Option<Text>, Text) {
    let base_idx = rotations.base_reg.slot(&base.original);
    let cur_idx = rotations.cur_reg.slot(&current.original);
    (
        Some(Text::styled(
            base.original.clone(),
            Format::RegDiff {
                group: "base-reg",
                index: base_idx,
                key: base.original.clone(),
            },
        )),
        Text::styled(
            current.original.clone(),
            Format::RegDiff {
                group: "my-reg",
                index: cur_idx,
                key: current.original.clone(),
            },
        ),
    )
}

fn hex_to_i64(s: &str) -> Option<i64> {
    i64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn line(original: &str, diff_row: &str, normalized: &str) -> Line {
        Line {
            mnemonic: original.split_whitespace().next().unwrap_or("").to_string(),
            original: original.to_string(),
            normalized_original: normalized.to_string(),
            diff_row: diff_row.to_string(),
            line_num: "0".to_string(),
            branch_target: None,
            source_lines: Vec::new(),
            comment: None,
        }
    }

    #[test]
    fn test_exact_equal_no_highlighting() {
        let a = line("addiu v0,zero,1", "addiu <reg>,<reg>,<imm>", "addiu v0,zero,1");
        let b = a.clone();
        let config = Config::new();
        let out = build_output(&[(Some(a), Some(b))], &config);
        assert_eq!(out.len(), 1);
        assert!(out[0]
            .base
            .as_ref()
            .unwrap()
            .segments()
            .all(|(_, f)| *f == Format::None));
    }

    #[test]
    fn test_insert_has_no_base() {
        let b = line("addiu v0,zero,1", "addiu <reg>,<reg>,<imm>", "addiu v0,zero,1");
        let config = Config::new();
        let out = build_output(&[(None, Some(b))], &config);
        assert!(out[0].base.is_none());
    }

    #[test]
    fn test_delete_has_no_current() {
        let a = line("addiu v0,zero,1", "addiu <reg>,<reg>,<imm>", "addiu v0,zero,1");
        let config = Config::new();
        let out = build_output(&[(Some(a), None)], &config);
        assert!(out[0].current.is_empty());
    }

    #[test]
    fn test_diff_row_mismatch_is_replace() {
        let a = line("addiu v0,zero,1", "addiu <reg>,<reg>,<imm>", "addiu v0,zero,1");
        let b = line("addu v0,zero,t0", "addu <reg>,<reg>,<reg>", "addu v0,zero,t0");
        let config = Config::new();
        let out = build_output(&[(Some(a), Some(b))], &config);
        assert!(out[0]
            .base
            .as_ref()
            .unwrap()
            .segments()
            .any(|(_, f)| *f == Format::DiffChange));
    }

    #[test]
    fn test_stack_rotation_starts_at_four() {
        let a = line("lw v0,16(sp)", "lw <reg>,addr(sp)", "lw v0,0x10(sp)");
        let b = line("lw v0,20(sp)", "lw <reg>,addr(sp)", "lw v0,0x14(sp)");
        let config = Config::new();
        let out = build_output(&[(Some(a), Some(b))], &config);
        let base_format = out[0]
            .base
            .as_ref()
            .unwrap()
            .segments()
            .find_map(|(_, f)| match f {
                Format::StackDiff { index, .. } => Some(*index),
                _ => None,
            });
        assert_eq!(base_format, Some(4));
    }

    #[test]
    fn test_branch_source_and_target_get_arrows() {
        let mut src = line("beql $at,$zero,8", "<imm>", "beql $at,$zero,8");
        src.branch_target = Some("4".to_string());
        src.line_num = "0".to_string();
        let mut tgt = line("nop", "nop", "nop");
        tgt.line_num = "4".to_string();

        let config = Config::new();
        let out = build_output(&[(Some(src.clone()), Some(src)), (Some(tgt.clone()), Some(tgt))], &config);

        let has_out_arrow = out[0].current.segments().any(|(_, f)| {
            matches!(f, Format::Branch { is_target: false, .. })
        });
        let has_in_arrow = out[1].current.segments().any(|(_, f)| {
            matches!(f, Format::Branch { is_target: true, .. })
        });
        assert!(has_out_arrow, "branch source line should carry an out-arrow");
        assert!(has_in_arrow, "branch target line should carry an in-arrow");
    }

    #[test]
    fn test_delay_slot_dim() {
        let a = line("<delay-slot>", "<delay-slot>", "nop");
        let b = line("<delay-slot>", "<delay-slot>", "addiu v0,zero,1");
        let config = Config::new();
        let out = build_output(&[(Some(a), Some(b))], &config);
        assert!(out[0]
            .base
            .as_ref()
            .unwrap()
            .segments()
            .any(|(_, f)| *f == Format::DelaySlot));
    }

    #[test]
    fn test_only_immediates_differ_ignores_register_digits() {
        let arch = crate::arch::registry("mips").unwrap();
        // Same register (`v0`), different immediate: genuinely imm-only.
        assert!(only_immediates_differ("addiu v0,zero,0x1", "addiu v0,zero,0x2", arch));
        // Same immediate, different register: must not be mistaken for
        // imm-only just because the register name happens to carry a
        // different trailing digit (`v0` vs `v1`).
        assert!(!only_immediates_differ("addiu v0,zero,0x1", "addiu v1,zero,0x1", arch));
    }

    #[test]
    fn test_register_only_diff_through_real_parser() {
        // Regression: exercises the actual parser's `diff_row`/`original`
        // output (rather than a hand-built `Line`) end to end, so a
        // register-only divergence is classified as `RegDiff`, not
        // miscategorized as an immediate-only change.
        let config = Config::new();
        let arch = crate::arch::registry("mips").unwrap();
        let base = crate::parser::parse("   0:\t24020001\taddiu\tv0,zero,1\n", &config, arch).unwrap();
        let current = crate::parser::parse("   0:\t24030001\taddiu\tv1,zero,1\n", &config, arch).unwrap();
        let out = build_output(&[(Some(base[0].clone()), Some(current[0].clone()))], &config);
        assert!(out[0]
            .current
            .segments()
            .any(|(_, f)| matches!(f, Format::RegDiff { .. })));
    }

    #[test]
    fn test_stack_only_diff_through_real_parser() {
        // Regression: `abstract_diff_row`'s sprel-before-register
        // substitution order used to leave the register regex free to
        // re-match the "sp" inside a freshly-substituted "addr(sp)",
        // producing "addr(<reg>)" and making `only_stack_offsets_differ`'s
        // literal-`"addr(sp)"` check never fire.
        let config = Config::new();
        let arch = crate::arch::registry("mips").unwrap();
        let base = crate::parser::parse("   0:\t8fa20010\tlw\tv0,16(sp)\n", &config, arch).unwrap();
        let current = crate::parser::parse("   0:\t8fa20014\tlw\tv0,20(sp)\n", &config, arch).unwrap();
        assert_eq!(base[0].diff_row, "lw <reg>,addr(sp)");
        let out = build_output(&[(Some(base[0].clone()), Some(current[0].clone()))], &config);
        assert!(out[0]
            .current
            .segments()
            .any(|(_, f)| matches!(f, Format::StackDiff { .. })));
    }
}
