//! MIPS architecture descriptor.
//!
//! Covers the common MIPS I-V / MIPS32 / MIPS64 disassembly grammar as
//! emitted by GNU objdump, including the delay-slot and branch-likely
//! conventions and `R_MIPS_HI16`/`R_MIPS_LO16` relocation fusion (see
//! [`crate::parser`]).

use super::{ArchDescriptor, NormalizerVariant};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?[0-9]+").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_REGISTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?\b(?:zero|at|v[01]|a[0-3]|t[0-9]|s[0-8]|k[01]|gp|sp|fp|ra|f[12]?[0-9]|f3[01])\b")
        .unwrap()
});
static RE_SPREL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:-?0x[0-9a-fA-F]+|-?[0-9]+)\(sp\)").unwrap());
static RE_LARGE_IMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?0x[0-9a-fA-F]{5,}|-?[0-9]{7,}").unwrap());
static RE_GENERIC_IMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?0x[0-9a-fA-F]+|-?[0-9]+").unwrap());

static BRANCH_INSTRUCTIONS: &[&str] = &[
    "b", "beq", "bne", "beqz", "bnez", "bgez", "bgtz", "blez", "bltz", "bc1t", "bc1f",
];
static BRANCH_LIKELY_INSTRUCTIONS: &[&str] = &[
    "beql", "bnel", "beqzl", "bnezl", "bgezl", "bgtzl", "blezl", "bltzl", "bc1tl", "bc1fl",
];
static ADDRESS_IMMEDIATE_INSTRUCTIONS: &[&str] = &[
    "b", "beq", "bne", "beqz", "bnez", "bgez", "bgtz", "blez", "bltz", "bc1t", "bc1f", "beql",
    "bnel", "beqzl", "bnezl", "bgezl", "bgtzl", "blezl", "bltzl", "bc1tl", "bc1fl", "j", "jal",
];

pub static DESCRIPTOR: Lazy<ArchDescriptor> = Lazy::new(|| ArchDescriptor {
    name: "mips",
    re_integer: &RE_INTEGER,
    re_comment: &RE_COMMENT,
    re_register: &RE_REGISTER,
    re_sprel: &RE_SPREL,
    re_large_imm: &RE_LARGE_IMM,
    re_generic_imm: &RE_GENERIC_IMM,
    branch_instructions: BRANCH_INSTRUCTIONS,
    branch_likely_instructions: BRANCH_LIKELY_INSTRUCTIONS,
    address_immediate_instructions: ADDRESS_IMMEDIATE_INSTRUCTIONS,
    objdump_arch_flags: &["-Mreg-names=32"],
    normalizer: NormalizerVariant::Generic,
});
