//! AArch64 architecture descriptor.
//!
//! AArch64 has no delay slots and discards its relocation annotations
//! entirely during fusion (see [`crate::parser`]); its distinguishing
//! feature in this pipeline is ADRP+LDR/ADD GOT-pair tracking, handled
//! by [`NormalizerVariant::Aarch64Adrp`] in [`crate::normalize`].

use super::{ArchDescriptor, NormalizerVariant};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?[0-9]+").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>|//.*$").unwrap());
static RE_REGISTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[wx][0-9]{1,2}\b|\b(?:sp|lr|fp|xzr|wzr)\b").unwrap());
static RE_SPREL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:-?0x[0-9a-fA-F]+|-?[0-9]+)\]?,\s*\[sp\b").unwrap());
static RE_LARGE_IMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?0x[0-9a-fA-F]{5,}|-?[0-9]{7,}").unwrap());
static RE_GENERIC_IMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?0x[0-9a-fA-F]+|-?[0-9]+").unwrap());

static BRANCH_INSTRUCTIONS: &[&str] = &[
    "b", "b.eq", "b.ne", "b.lt", "b.le", "b.gt", "b.ge", "b.cs", "b.cc", "b.mi", "b.pl", "b.vs",
    "b.vc", "b.hi", "b.ls", "cbz", "cbnz", "tbz", "tbnz",
];
// AArch64 has no delay slot / branch-likely convention.
static BRANCH_LIKELY_INSTRUCTIONS: &[&str] = &[];
static ADDRESS_IMMEDIATE_INSTRUCTIONS: &[&str] = &[
    "b", "b.eq", "b.ne", "b.lt", "b.le", "b.gt", "b.ge", "b.cs", "b.cc", "b.mi", "b.pl", "b.vs",
    "b.vc", "b.hi", "b.ls", "cbz", "cbnz", "tbz", "tbnz", "bl", "adrp",
];

pub static DESCRIPTOR: Lazy<ArchDescriptor> = Lazy::new(|| ArchDescriptor {
    name: "aarch64",
    re_integer: &RE_INTEGER,
    re_comment: &RE_COMMENT,
    re_register: &RE_REGISTER,
    re_sprel: &RE_SPREL,
    re_large_imm: &RE_LARGE_IMM,
    re_generic_imm: &RE_GENERIC_IMM,
    branch_instructions: BRANCH_INSTRUCTIONS,
    branch_likely_instructions: BRANCH_LIKELY_INSTRUCTIONS,
    address_immediate_instructions: ADDRESS_IMMEDIATE_INSTRUCTIONS,
    objdump_arch_flags: &[],
    normalizer: NormalizerVariant::Aarch64Adrp,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_regex() {
        assert!(DESCRIPTOR.re_register.is_match("x0"));
        assert!(DESCRIPTOR.re_register.is_match("w12"));
        assert!(DESCRIPTOR.re_register.is_match("sp"));
    }

    #[test]
    fn test_no_branch_likely() {
        assert!(DESCRIPTOR.branch_likely_instructions.is_empty());
        assert!(!DESCRIPTOR.is_branch_likely("b"));
    }

    #[test]
    fn test_adrp_has_address_immediate() {
        assert!(DESCRIPTOR.has_address_immediate("adrp"));
        assert!(DESCRIPTOR.has_address_immediate("bl"));
    }

    #[test]
    fn test_normalizer_variant() {
        assert_eq!(DESCRIPTOR.normalizer, NormalizerVariant::Aarch64Adrp);
    }
}
