//! PowerPC architecture descriptor.
//!
//! PPC relocation fusion wraps immediates in `@h`/`@ha`/`@l` rather than
//! MIPS's `%hi(...)`/`%lo(...)`, and drops artifact addends above
//! `0x70000000` for absolute-address relocations (see
//! [`crate::parser`]).

use super::{ArchDescriptor, NormalizerVariant};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?[0-9]+").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>|//.*$").unwrap());
static RE_REGISTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\br[0-9]{1,2}\b|\bf[0-9]{1,2}\b|\bcr[0-7]\b").unwrap());
static RE_SPREL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:-?0x[0-9a-fA-F]+|-?[0-9]+)\(r1\)").unwrap());
static RE_LARGE_IMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?0x[0-9a-fA-F]{5,}|-?[0-9]{7,}").unwrap());
static RE_GENERIC_IMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?0x[0-9a-fA-F]+|-?[0-9]+").unwrap());

static BRANCH_INSTRUCTIONS: &[&str] = &["b", "beq", "bne", "blt", "ble", "bgt", "bge", "bdnz", "bdz"];
// PPC's ordinary branches have no delay slot in the MIPS sense.
static BRANCH_LIKELY_INSTRUCTIONS: &[&str] = &[];
static ADDRESS_IMMEDIATE_INSTRUCTIONS: &[&str] = &[
    "b", "beq", "bne", "blt", "ble", "bgt", "bge", "bdnz", "bdz", "bl",
];

pub static DESCRIPTOR: Lazy<ArchDescriptor> = Lazy::new(|| ArchDescriptor {
    name: "ppc",
    re_integer: &RE_INTEGER,
    re_comment: &RE_COMMENT,
    re_register: &RE_REGISTER,
    re_sprel: &RE_SPREL,
    re_large_imm: &RE_LARGE_IMM,
    re_generic_imm: &RE_GENERIC_IMM,
    branch_instructions: BRANCH_INSTRUCTIONS,
    branch_likely_instructions: BRANCH_LIKELY_INSTRUCTIONS,
    address_immediate_instructions: ADDRESS_IMMEDIATE_INSTRUCTIONS,
    objdump_arch_flags: &["-Mpowerpc"],
    normalizer: NormalizerVariant::Generic,
});
