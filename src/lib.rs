//! asm-differ-core: a semantic assembly-diff engine for decompilation work.
//!
//! Given two objdump-style disassembly listings of the "same" function --
//! a reference ("base") and a candidate ("current") -- [`run_diff`]
//! produces a side-by-side diff that ignores cosmetic differences
//! (renamed registers, shifted stack offsets, reordered immediate
//! encodings, branch target line numbers) while highlighting real
//! divergences (wrong opcodes, missing instructions, register class
//! changes).
//!
//! # Pipeline
//!
//! 1. [`arch`] -- per-architecture descriptor: regex set, branch-instruction
//!    sets, relocation dialect. Pure data, the sole source of
//!    architecture-specific behavior.
//! 2. [`parser`] -- raw disassembly text to structured [`parser::Line`]
//!    records, fusing relocation annotations into the previous instruction.
//! 3. [`normalize`] -- derives `normalized_original` per line.
//! 4. [`align`] -- sequence-alignment over diff-keys, producing paired
//!    `(Option<Line>, Option<Line>)` rows.
//! 5. [`classify`] -- determines the diff kind for each pair and emits a
//!    richly-tagged [`text::Text`] value with stable rotation indices.
//! 6. [`formatter`] -- pluggable rendering backend (plain / ansi / html).
//! 7. [`threeway`] -- optional: overlays a previous diff onto the current
//!    one to show intra-iteration deltas.
//!
//! The core is purely synchronous and holds no process-wide state: every
//! [`run_diff`] call is independent and safely callable from any thread.
//! It performs no I/O, no subprocess invocation, and no file watching --
//! those are collaborator responsibilities described in [`collab`].
//!
//! # Quick start
//!
//! ```rust
//! use asm_differ_core::{run_diff, Config};
//!
//! let base = "   0:\t24020001 \taddiu\tv0,zero,1\n";
//! let current = "   0:\t24020001 \taddiu\tv1,zero,1\n";
//! let config = Config::new();
//! let rendered = run_diff(base, current, &config).unwrap();
//! assert!(rendered.contains("addiu"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]

pub mod align;
pub mod arch;
pub mod classify;
pub mod collab;
pub mod config;
pub mod error;
pub mod formatter;
pub mod normalize;
pub mod parser;
pub mod text;
pub mod threeway;

pub use classify::OutputLine;
pub use config::{Algorithm, Config, FormatterKind, ThreewayMode};
pub use error::{DiffError, Result};
pub use parser::Line;
pub use text::{Format, Text};

/// Run the full pipeline on two disassembly texts and render the result.
///
/// This is the primary entry point: parse both texts against the
/// configured architecture, align their instruction streams, classify
/// and style every pair, and render through the configured formatter.
/// No threeway overlay is applied here -- for that, call [`diff_rows`]
/// directly and pass the resulting rows through [`threeway::coordinate`].
///
/// # Errors
///
/// Returns [`DiffError::InvalidConfig`] for an invalid flag combination,
/// [`DiffError::UnknownArch`] if `config.arch` is not in the registry, or
/// a parse error if the input text cannot be parsed under that
/// architecture's rules.
pub fn run_diff(base_text: &str, current_text: &str, config: &Config) -> Result<String> {
    let rows = diff_rows(base_text, current_text, config)?;
    let formatter = formatter::formatter_for(config.formatter_kind);
    Ok(formatter::render(formatter.as_ref(), &rows, config.column_width))
}

/// Run the pipeline through classification, stopping short of rendering.
///
/// Exposed separately from [`run_diff`] so that callers building a
/// threeway overlay (or a custom formatter pipeline) can obtain
/// [`OutputLine`]s without forcing a render pass.
///
/// # Errors
///
/// Same as [`run_diff`].
pub fn diff_rows(base_text: &str, current_text: &str, config: &Config) -> Result<Vec<OutputLine>> {
    config.validate()?;

    let descriptor = arch::registry(&config.arch).ok_or_else(|| DiffError::UnknownArch {
        name: config.arch.clone(),
    })?;

    let base_lines = parser::parse(base_text, config, descriptor)?;
    let current_lines = parser::parse(current_text, config, descriptor)?;

    let base_lines = truncate_to_limit(base_lines, config);
    let current_lines = truncate_to_limit(current_lines, config);

    let pairs = align::align(&base_lines, &current_lines, config.algorithm);
    Ok(classify::build_output(&pairs, config))
}

/// Apply the `max_function_size_lines` size guard: truncate silently at
/// the limit. This is the designed behavior (§7.3), not an error.
fn truncate_to_limit(mut lines: Vec<Line>, config: &Config) -> Vec<Line> {
    if lines.len() > config.max_function_size_lines {
        lines.truncate(config.max_function_size_lines);
    }
    lines
}

/// Render a three-column overlay of a previous diff's rows against a
/// fresh diff's rows, both computed against the same base.
///
/// Thin wrapper around [`threeway::coordinate`] plus a formatter pass,
/// for callers that already hold both row sets (e.g. a watch-mode
/// collaborator keeping the previous run's [`OutputLine`]s around).
pub fn run_threeway(
    previous: &[OutputLine],
    current: &[OutputLine],
    config: &Config,
) -> String {
    let rows = threeway::coordinate(previous, current);
    let formatter = formatter::formatter_for(config.formatter_kind);
    threeway::render(formatter.as_ref(), &rows, config.column_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_diff() {
        let text = "   0:\t24020001 \taddiu\tv0,zero,1\n";
        let config = Config::new();
        let rows = diff_rows(text, text, &config).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]
            .current
            .segments()
            .all(|(_, f)| *f == Format::None));
    }

    #[test]
    fn test_register_only_diff() {
        let base = "   0:\t24020001 \taddiu\tv0,zero,1\n";
        let current = "   0:\t24020001 \taddiu\tv1,zero,1\n";
        let config = Config::new();
        let rows = diff_rows(base, current, &config).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]
            .current
            .segments()
            .any(|(_, f)| matches!(f, Format::RegDiff { .. })));
    }

    #[test]
    fn test_insertion_renders_with_diff_add() {
        let config = Config::new();
        let rows = diff_rows("", "   0:\t24020001 \taddiu\tv0,zero,1\n", &config).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].base.is_none());
        assert!(rows[0]
            .current
            .segments()
            .any(|(_, f)| *f == Format::DiffAdd));
    }

    #[test]
    fn test_unknown_arch_errors() {
        let mut config = Config::new();
        config.arch = "sh2".to_string();
        let err = diff_rows("", "", &config).unwrap_err();
        assert!(matches!(err, DiffError::UnknownArch { .. }));
    }

    #[test]
    fn test_run_diff_renders_string() {
        let text = "   0:\t24020001 \taddiu\tv0,zero,1\n";
        let config = Config::new();
        let out = run_diff(text, text, &config).unwrap();
        assert!(out.contains("addiu"));
    }
}
