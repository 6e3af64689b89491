//! The disassembly line parser.
//!
//! Consumes raw objdump-style text and emits a stream of structured
//! [`Line`] records, fusing relocation annotations into the previous
//! instruction and tracking delay slots and branch targets as it goes.

use crate::arch::ArchDescriptor;
use crate::config::Config;
use crate::error::{DiffError, Result};
use crate::normalize;

/// One parsed instruction (or delay-slot sentinel, or source
/// annotation carrier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// First whitespace-delimited token of the instruction text.
    pub mnemonic: String,
    /// Cleaned instruction text, literals still present, possibly
    /// rewritten by relocation fusion.
    pub original: String,
    /// Canonical form stable under architecture-ignored differences.
    pub normalized_original: String,
    /// Highly abstracted alignment key: no registers, no stack
    /// displacements, no address immediates.
    pub diff_row: String,
    /// Hex offset string (the line's address within the function).
    pub line_num: String,
    /// Hex offset string of the branch target, if this is a branch.
    pub branch_target: Option<String>,
    /// Interleaved source-code annotation lines captured immediately
    /// before this instruction.
    pub source_lines: Vec<String>,
    /// First parenthetical `<...>` annotation on the line, if any.
    pub comment: Option<String>,
}

/// Sentinel mnemonic/diff-row value for an instruction occupying a
/// branch-likely delay slot.
pub const DELAY_SLOT_SENTINEL: &str = "<delay-slot>";

const RELOCATION_PREFIXES: &[&str] = &["R_MIPS_", "R_PPC_", "R_AARCH64_"];

fn relocation_kind(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    for tok in trimmed.split_whitespace() {
        if RELOCATION_PREFIXES.iter().any(|p| tok.starts_with(p)) {
            return Some(tok);
        }
    }
    None
}

/// Parse `text` into a sequence of [`Line`] records per `config` and
/// `arch`.
pub fn parse(text: &str, config: &Config, arch: &ArchDescriptor) -> Result<Vec<Line>> {
    let mut raw_lines: Vec<&str> = text.lines().collect();

    // Step 1: binary-mode skip.
    if !config.diff_obj {
        let drop_head = raw_lines.len().min(7);
        raw_lines.drain(0..drop_head);
        if raw_lines.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
            raw_lines.pop();
        }
    }

    for _ in 0..config.skip_lines.min(raw_lines.len()) {
        raw_lines.remove(0);
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut pending_source: Vec<String> = Vec::new();
    let mut armed_delay_slot = false;
    let mut adrp_pending: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut byte_budget = config.max_function_size_bytes;
    let mut stop = false;

    for raw in raw_lines {
        if stop {
            break;
        }
        if byte_budget == 0 {
            break;
        }
        let consumed = raw.len() + 1;
        byte_budget = byte_budget.saturating_sub(consumed);

        // Step 2: object-mode filter.
        if config.diff_obj {
            let trimmed = raw.trim_end();
            if trimmed.is_empty() || trimmed.ends_with(">:") {
                continue;
            }
        }

        // Relocation fusion (step 4), handled before anything else since
        // a relocation line carries no offset/tab structure of its own.
        if let Some(kind) = relocation_kind(raw) {
            fuse_relocation(&mut lines, raw, kind, arch)?;
            continue;
        }

        let looks_like_instruction = {
            let mut parts = raw.splitn(2, '\t');
            match (parts.next(), parts.next()) {
                (Some(first), Some(_)) => first.trim().chars().all(|c| {
                    c.is_ascii_hexdigit() || c.is_ascii_whitespace() || c == ':'
                }) && !first.trim().is_empty(),
                _ => false,
            }
        };

        // Step 3: source annotation capture.
        if config.source && !looks_like_instruction {
            if !raw.trim().is_empty() {
                pending_source.push(raw.to_string());
            }
            continue;
        }
        if !looks_like_instruction {
            continue;
        }

        // Step 6: column split.
        let cols: Vec<&str> = raw.split('\t').collect();
        if cols.len() < 2 {
            continue;
        }
        let line_num = cols[0].trim().trim_end_matches(':').to_string();
        // cols[1] is raw bytes in object mode; instruction text is the rest.
        let rest_start = if cols.len() >= 3 { 2 } else { 1 };
        let mut instruction_text = cols[rest_start..].join(" ").trim().to_string();
        if instruction_text.is_empty() {
            continue;
        }

        // Step 5: comment extraction.
        let comment = arch
            .re_comment
            .find(&instruction_text)
            .map(|m| m.as_str().to_string());
        if let Some(c) = &comment {
            instruction_text = instruction_text.replacen(c.as_str(), "", 1).trim().to_string();
        }

        // Step 7: mnemonic isolation.
        let mnemonic = instruction_text
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        // Step 8: integer hexification, skipped for address-immediate ops.
        if !arch.has_address_immediate(&mnemonic) {
            instruction_text = hexify_integers(&instruction_text, arch);
        }

        let mut original = instruction_text;
        let mut mnemonic = mnemonic;

        // Step 11: delay-slot handling.
        if armed_delay_slot {
            original = DELAY_SLOT_SENTINEL.to_string();
            mnemonic = DELAY_SLOT_SENTINEL.to_string();
            armed_delay_slot = false;
        } else if arch.is_branch_likely(&mnemonic) {
            armed_delay_slot = true;
        }

        // Step 10: arch normalizer.
        let normalized_original =
            normalize::normalize(&original, &mnemonic, arch, config, &mut adrp_pending);

        // Step 13: branch target computation.
        let branch_target = if mnemonic != DELAY_SLOT_SENTINEL && arch.is_branch(&mnemonic) {
            compute_branch_target(&original, arch.is_branch_likely(&mnemonic))
        } else {
            None
        };

        // Step 12: diff-row abstraction.
        let diff_row = if mnemonic == DELAY_SLOT_SENTINEL {
            DELAY_SLOT_SENTINEL.to_string()
        } else {
            abstract_diff_row(&original, &mnemonic, arch)
        };

        // Step 15: stop-at-return. "jr ra" is a plain (non-likely)
        // branch on every supported arch, so there is no delay slot to
        // wait out; stop right after this line lands.
        if config.stop_at_return
            && mnemonic == "jr"
            && original.split(',').next_back().map(str::trim) == Some("ra")
        {
            stop = true;
        }

        let mut line = Line {
            mnemonic: mnemonic.clone(),
            original,
            normalized_original,
            diff_row,
            line_num,
            branch_target,
            source_lines: Vec::new(),
            comment,
        };
        line.source_lines.append(&mut pending_source);
        lines.push(line);
    }

    Ok(lines)
}

fn hexify_integers(text: &str, arch: &ArchDescriptor) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    let chars: Vec<char> = text.chars().collect();
    for m in arch.re_integer.find_iter(text) {
        let start = text[..m.start()].chars().count();
        let end = text[..m.end()].chars().count();
        let prev_ok = start == 0 || !ArchDescriptor::is_forbidden_int_neighbor(chars[start - 1]);
        let next_ok = end >= chars.len() || !ArchDescriptor::is_forbidden_int_neighbor(chars[end]);
        out.push_str(&text[last_end..m.start()]);
        if prev_ok && next_ok {
            let negative = m.as_str().starts_with('-');
            let digits = m.as_str().trim_start_matches('-');
            match digits.parse::<i64>() {
                Ok(v) => {
                    let v = if negative { -v } else { v };
                    out.push_str(&format!("{:#x}", v));
                }
                Err(_) => out.push_str(m.as_str()),
            }
        } else {
            out.push_str(m.as_str());
        }
        last_end = m.end();
    }
    out.push_str(&text[last_end..]);
    out
}

fn compute_branch_target(original: &str, is_likely: bool) -> Option<String> {
    let operand = original.rsplit(',').next()?.trim();
    let hex = operand.trim_start_matches("0x");
    let value = i64::from_str_radix(hex, 16).ok().or_else(|| operand.parse::<i64>().ok())?;
    let value = if is_likely { value - 4 } else { value };
    Some(format!("{:x}", value))
}

/// Placeholder substituted for a stack-relative operand before register
/// substitution runs, and swapped back to `addr(sp)` afterwards. Some
/// architectures' register regex alternates on the literal `sp`
/// (MIPS, AArch64), which would otherwise re-match the `sp` inside a
/// freshly-substituted `addr(sp)` and turn it into `addr(<reg>)`.
const SPREL_PLACEHOLDER: &str = "\u{1}SPREL\u{1}";

fn abstract_diff_row(original: &str, mnemonic: &str, arch: &ArchDescriptor) -> String {
    let mut row = original.to_string();
    // Stack-relative operands are recognized first, into a placeholder
    // the register regex cannot match, so that register substitution
    // can run afterwards without re-matching "sp" inside the result.
    row = arch.re_sprel.replace_all(&row, SPREL_PLACEHOLDER).to_string();
    // Registers next, so that digits embedded in register names (v0,
    // t9, r3, ...) are gone before the generic immediate regex -- which
    // has no register-name awareness of its own -- runs over the rest.
    row = arch.re_register.replace_all(&row, "<reg>").to_string();
    row = row.replace(SPREL_PLACEHOLDER, "addr(sp)");
    if arch.has_address_immediate(mnemonic) {
        if let Some(idx) = row.rfind(',') {
            row.truncate(idx);
            row.push_str(",<imm>");
        } else {
            row = format!("{} <imm>", mnemonic);
        }
    } else {
        row = arch.re_generic_imm.replace_all(&row, "<imm>").to_string();
    }
    row
}

fn fuse_relocation(
    lines: &mut Vec<Line>,
    raw: &str,
    kind: &str,
    arch: &ArchDescriptor,
) -> Result<()> {
    if kind.starts_with("R_AARCH64_") {
        // AArch64 relocations are discarded entirely.
        return Ok(());
    }

    let prev = match lines.last_mut() {
        Some(l) => l,
        None => return Ok(()),
    };

    // Relocation annotation lines have no leading offset column; they
    // are whitespace, the relocation kind token, then the symbol
    // (optionally `symbol+addend`).
    let tokens: Vec<&str> = raw.trim().split_whitespace().collect();
    let kind_pos = tokens.iter().position(|t| *t == kind).unwrap_or(0);
    let reloc_kind = tokens.get(kind_pos).copied().unwrap_or(kind);
    let symbol_and_addend = tokens[kind_pos + 1..].join(" ");
    let (symbol, addend) = split_symbol_addend(&symbol_and_addend);

    let wrapped = if reloc_kind.starts_with("R_MIPS_HI16") {
        wrap_symbol("%hi", &symbol, addend)
    } else if reloc_kind.starts_with("R_MIPS_LO16") {
        wrap_symbol("%lo", &symbol, addend)
    } else if reloc_kind.contains("HA") {
        wrap_symbol_suffix(&symbol, addend, "@ha")
    } else if reloc_kind.contains("HI") {
        wrap_symbol_suffix(&symbol, addend, "@h")
    } else if reloc_kind.contains("LO") {
        wrap_symbol_suffix(&symbol, addend, "@l")
    } else if reloc_kind.starts_with("R_PPC_") || reloc_kind.starts_with("R_MIPS_") {
        // Absolute-address style reloc; addend above this bound is an
        // artifact of the relocation encoding, not real.
        let addend = addend.filter(|&a| a < 0x7000_0000);
        wrap_symbol_suffix(&symbol, addend, "")
    } else {
        return Err(DiffError::UnknownRelocation {
            kind: reloc_kind.to_string(),
            arch: arch.name.to_string(),
        });
    };

    let slot = find_immediate_slot(&prev.original);
    prev.original = format!("{}{}", &prev.original[..slot], wrapped);
    Ok(())
}

fn split_symbol_addend(text: &str) -> (String, Option<i64>) {
    if let Some(idx) = text.rfind('+') {
        let addend_text = text[idx + 1..].trim();
        let parsed = addend_text
            .strip_prefix("0x")
            .and_then(|hex| i64::from_str_radix(hex, 16).ok())
            .or_else(|| addend_text.parse::<i64>().ok());
        if let Some(addend) = parsed {
            return (text[..idx].trim().to_string(), Some(addend));
        }
    }
    (text.trim().to_string(), None)
}

fn wrap_symbol(prefix: &str, symbol: &str, addend: Option<i64>) -> String {
    match addend {
        Some(a) if a != 0 => format!("{}({}+{:#x})", prefix, symbol, a),
        _ => format!("{}({})", prefix, symbol),
    }
}

fn wrap_symbol_suffix(symbol: &str, addend: Option<i64>, suffix: &str) -> String {
    match addend {
        Some(a) if a != 0 => format!("{}+{:#x}{}", symbol, a, suffix),
        _ => format!("{}{}", symbol, suffix),
    }
}

/// Find the byte offset of the immediate slot in `original`: the last
/// comma, falling back to the last tab, then the last space.
fn find_immediate_slot(original: &str) -> usize {
    if let Some(idx) = original.rfind(',') {
        return idx + 1;
    }
    if let Some(idx) = original.rfind('\t') {
        return idx + 1;
    }
    if let Some(idx) = original.rfind(' ') {
        return idx + 1;
    }
    original.len()
}
