//! Architecture registry.
//!
//! The registry is the sole source of architecture-specific behavior;
//! every other stage of the pipeline is data-driven from an
//! [`ArchDescriptor`]. Adding a new architecture requires only a new
//! descriptor plus, optionally, a [`NormalizerVariant`].

pub mod aarch64;
pub mod mips;
pub mod ppc;

use regex::Regex;

/// Which architecture-specific normalization pass to run when deriving
/// `normalized_original` from `original` (step 10 of the line parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizerVariant {
    /// No extra normalization beyond the generic passes every arch gets.
    Generic,
    /// AArch64's ADRP+LDR/ADD GOT-pair tracking.
    Aarch64Adrp,
}

/// Immutable, per-architecture descriptor. One instance per supported
/// architecture, constructed once at process startup.
pub struct ArchDescriptor {
    /// Architecture name as used in [`crate::config::Config::arch`].
    pub name: &'static str,
    /// Matches a decimal integer operand candidate. Whether it is
    /// actually a literal (vs. part of an identifier) is decided by
    /// [`ArchDescriptor::is_forbidden_int_neighbor`].
    pub re_integer: &'static Regex,
    /// Matches the first parenthetical annotation on a line
    /// (`<func+0x10>`), kept lazy so it does not swallow trailing
    /// annotations like `! 60e87d0`.
    pub re_comment: &'static Regex,
    /// Matches a register operand.
    pub re_register: &'static Regex,
    /// Matches a stack-pointer-relative operand (`offset(sp)`-style).
    pub re_sprel: &'static Regex,
    /// Matches an immediate considered "large" for
    /// `ignore_large_imms` purposes.
    pub re_large_imm: &'static Regex,
    /// Matches any operand this architecture treats as an immediate
    /// for the purposes of integer hexification (step 8).
    pub re_generic_imm: &'static Regex,
    /// Mnemonics for ordinary branch instructions.
    pub branch_instructions: &'static [&'static str],
    /// Mnemonics for branch-likely instructions (delay slot nullified
    /// when not taken).
    pub branch_likely_instructions: &'static [&'static str],
    /// Mnemonics whose address-like immediate should be treated as a
    /// branch target rather than a plain immediate in the diff row
    /// (branches plus calls/address-materializing instructions).
    pub address_immediate_instructions: &'static [&'static str],
    /// Objdump `-M` flags appropriate for this architecture. Opaque to
    /// the core; passed through to the objdump-invoking collaborator.
    pub objdump_arch_flags: &'static [&'static str],
    /// Which normalizer variant [`crate::normalize`] should run.
    pub normalizer: NormalizerVariant,
}

impl ArchDescriptor {
    /// True if `ch` indicates that a digit run adjacent to it is part
    /// of an identifier (e.g. `r1` should not hexify the `1`), not a
    /// standalone integer literal.
    pub fn is_forbidden_int_neighbor(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_' || ch == '.' || ch == '$'
    }

    /// True if `mnemonic` is any kind of branch (ordinary or likely).
    pub fn is_branch(&self, mnemonic: &str) -> bool {
        self.branch_instructions.contains(&mnemonic) || self.is_branch_likely(mnemonic)
    }

    /// True if `mnemonic` is a branch-likely instruction.
    pub fn is_branch_likely(&self, mnemonic: &str) -> bool {
        self.branch_likely_instructions.contains(&mnemonic)
    }

    /// True if `mnemonic`'s trailing immediate should be treated as an
    /// address (branch target, call target, `adrp` page) rather than a
    /// plain numeric immediate.
    pub fn has_address_immediate(&self, mnemonic: &str) -> bool {
        self.address_immediate_instructions.contains(&mnemonic)
    }
}

/// Look up the descriptor for `name`, or `None` if the architecture is
/// not in the registry.
///
/// `sh2` is a deliberate gap: it appears in ad-hoc test fixtures but has
/// no full descriptor here, and is left unimplemented rather than
/// guessed at.
pub fn registry(name: &str) -> Option<&'static ArchDescriptor> {
    match name {
        "mips" => Some(&*mips::DESCRIPTOR),
        "aarch64" => Some(&*aarch64::DESCRIPTOR),
        "ppc" => Some(&*ppc::DESCRIPTOR),
        _ => None,
    }
}
