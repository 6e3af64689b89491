//! The architecture normalizer.
//!
//! Derives `normalized_original` from a parsed line's `original`: the
//! form used for the "truly equal modulo architecture-ignored
//! differences" half of the classifier's equality ladder. Unlike
//! `diff_row`, it keeps registers and stack offsets intact and only
//! erases what the config says to ignore (large immediates, address
//! diffs) plus, on AArch64, GOT-pair immediates tied to a matched
//! `adrp`.

use std::collections::HashSet;

use crate::arch::{ArchDescriptor, NormalizerVariant};
use crate::config::Config;

/// Derive `normalized_original` for one line.
///
/// `adrp_pending` carries AArch64 GOT-pair tracking state across calls
/// within one parse: it must be threaded through line by line, in
/// order, for a single function's instruction stream.
pub fn normalize(
    original: &str,
    mnemonic: &str,
    arch: &ArchDescriptor,
    config: &Config,
    adrp_pending: &mut HashSet<String>,
) -> String {
    match arch.normalizer {
        NormalizerVariant::Generic => normalize_generic(original, mnemonic, arch, config),
        NormalizerVariant::Aarch64Adrp => {
            normalize_aarch64(original, mnemonic, arch, config, adrp_pending)
        }
    }
}

fn normalize_generic(original: &str, mnemonic: &str, arch: &ArchDescriptor, config: &Config) -> String {
    let mut text = original.to_string();
    if config.ignore_large_imms {
        text = arch.re_large_imm.replace_all(&text, "<imm>").to_string();
    }
    if config.ignore_addr_diffs && arch.has_address_immediate(mnemonic) {
        if let Some(idx) = text.rfind(',') {
            text.truncate(idx);
            text.push_str(",<addr>");
        } else {
            text = format!("{} <addr>", mnemonic);
        }
    }
    text
}

fn normalize_aarch64(
    original: &str,
    mnemonic: &str,
    arch: &ArchDescriptor,
    config: &Config,
    adrp_pending: &mut HashSet<String>,
) -> String {
    let mut text = normalize_generic(original, mnemonic, arch, config);
    let regs: Vec<&str> = arch.re_register.find_iter(original).map(|m| m.as_str()).collect();

    match mnemonic {
        "adrp" => {
            if let Some(target) = regs.first() {
                adrp_pending.insert((*target).to_string());
            }
        }
        "ldr" => {
            if let Some(base) = regs.get(1) {
                if adrp_pending.remove(*base) {
                    text = blank_generic_imm(&text, arch);
                }
            }
        }
        "add" => {
            if regs.len() >= 2 && regs[0] == regs[1] {
                if adrp_pending.remove(regs[0]) {
                    text = blank_generic_imm(&text, arch);
                }
            }
        }
        _ => {}
    }
    text
}

/// Replace generic-immediate matches with `<imm>`, skipping any match
/// that overlaps a register token -- the naive digit regex has no
/// register-name awareness and would otherwise eat the trailing digit
/// of names like `x0`.
fn blank_generic_imm(text: &str, arch: &ArchDescriptor) -> String {
    let reg_spans: Vec<(usize, usize)> = arch
        .re_register
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    for m in arch.re_generic_imm.find_iter(text) {
        let overlaps = reg_spans.iter().any(|&(s, e)| m.start() < e && s < m.end());
        out.push_str(&text[last_end..m.start()]);
        out.push_str(if overlaps { m.as_str() } else { "<imm>" });
        last_end = m.end();
    }
    out.push_str(&text[last_end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch;

    #[test]
    fn test_generic_passthrough_without_ignore_flags() {
        let mips = arch::registry("mips").unwrap();
        let config = Config::new();
        let mut pending = HashSet::new();
        let out = normalize("lw v0,0x10(sp)", "lw", mips, &config, &mut pending);
        assert_eq!(out, "lw v0,0x10(sp)");
    }

    #[test]
    fn test_ignore_large_imms_blanks_large_immediate() {
        let mips = arch::registry("mips").unwrap();
        let config = Config {
            ignore_large_imms: true,
            ..Config::new()
        };
        let mut pending = HashSet::new();
        let out = normalize("lui v0,0x80000000", "lui", mips, &config, &mut pending);
        assert!(out.contains("<imm>"));
        assert!(!out.contains("0x80000000"));
    }

    #[test]
    fn test_ignore_addr_diffs_blanks_branch_target() {
        let mips = arch::registry("mips").unwrap();
        let config = Config {
            ignore_addr_diffs: true,
            ..Config::new()
        };
        let mut pending = HashSet::new();
        let out = normalize("jal 0x400010", "jal", mips, &config, &mut pending);
        assert_eq!(out, "jal <addr>");
    }

    #[test]
    fn test_adrp_ldr_pair_erases_immediate() {
        let aarch = arch::registry("aarch64").unwrap();
        let config = Config::new();
        let mut pending = HashSet::new();
        let adrp = normalize("adrp x0, 0x100000", "adrp", aarch, &config, &mut pending);
        assert!(pending.contains("x0"));
        assert!(adrp.contains("0x100000"));

        let ldr = normalize("ldr x1, [x0, 0x18]", "ldr", aarch, &config, &mut pending);
        assert!(!pending.contains("x0"));
        assert!(ldr.contains("<imm>"));
        assert!(!ldr.contains("0x18"));
        assert!(ldr.contains("[x0"));
    }

    #[test]
    fn test_adrp_add_pair_erases_immediate() {
        let aarch = arch::registry("aarch64").unwrap();
        let config = Config::new();
        let mut pending = HashSet::new();
        normalize("adrp x2, 0x100000", "adrp", aarch, &config, &mut pending);
        let add = normalize("add x2, x2, 0x20", "add", aarch, &config, &mut pending);
        assert!(!pending.contains("x2"));
        assert!(add.contains("<imm>"));
    }

    #[test]
    fn test_unrelated_register_does_not_consume_pending() {
        let aarch = arch::registry("aarch64").unwrap();
        let config = Config::new();
        let mut pending = HashSet::new();
        normalize("adrp x0, 0x100000", "adrp", aarch, &config, &mut pending);
        let ldr = normalize("ldr x3, [x1]", "ldr", aarch, &config, &mut pending);
        assert!(pending.contains("x0"));
        assert!(ldr.contains("[x1]"));
    }
}
