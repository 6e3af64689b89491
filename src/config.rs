//! Diff configuration.
//!
//! `Config` is a plain, caller-constructed value; the core performs no
//! file, environment, or CLI parsing of its own. Collaborators (a CLI
//! binary, a project-config loader) are responsible for producing one.
//! Every type here derives `serde::{Serialize, Deserialize}` so a
//! project-config loader can round-trip a `Config` through TOML/JSON
//! without the core ever parsing a config file itself.

use serde::{Deserialize, Serialize};

/// Threeway overlay mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreewayMode {
    /// No threeway overlay; render the plain two-column diff.
    #[default]
    None,
    /// Overlay against the very first diff produced for this base.
    Base,
    /// Overlay against the immediately preceding diff.
    Prev,
}

/// Sequence alignment algorithm choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Minimal edit distance over diff-row tokens. Falls back to
    /// [`Algorithm::Difflib`] automatically when its size guards trip.
    #[default]
    Levenshtein,
    /// Longest-common-subsequence with anchoring, in the style of
    /// Python's `difflib`. Produces longer equal runs at the cost of
    /// more total edits.
    Difflib,
}

/// Output rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    /// Plain text, fixed-width columns, no escape sequences.
    #[default]
    Plain,
    /// ANSI SGR escape codes for terminal display.
    Ansi,
    /// HTML `<table>` with stable rotation CSS classes and data
    /// attributes, for the interactive browser UI.
    Html,
}

/// Fully-resolved diff configuration.
///
/// Every field here corresponds to an option the collaborator layers
/// (CLI flags, project config files) must resolve before calling
/// [`crate::run_diff`]; the core never infers a default from the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Architecture name, looked up in the [`crate::arch`] registry.
    pub arch: String,
    /// Whether the input is object-file disassembly (symbol labels,
    /// per-line relocations) rather than whole-binary disassembly
    /// (7-line header, no relocations).
    pub diff_obj: bool,
    /// Whether to capture interleaved source-code annotation lines.
    pub source: bool,
    /// Whether the source annotations were produced by an older
    /// binutils whose source-line regex differs slightly.
    pub source_old_binutils: bool,
    /// Whether to treat inlined-function source annotations as
    /// belonging to the enclosing function rather than splitting them.
    pub inlines: bool,
    /// Threeway overlay mode.
    pub threeway: ThreewayMode,
    /// Number of lines the current listing's addresses are shifted
    /// relative to the base listing (object-mode only).
    pub base_shift: i64,
    /// Number of leading lines to skip in both listings before diffing.
    pub skip_lines: usize,
    /// Whether to annotate branch source/target lines with arrows.
    pub show_branches: bool,
    /// Stop parsing after the first `jr ra` (plus its delay slot).
    pub stop_at_return: bool,
    /// Treat large immediates as insignificant for alignment purposes.
    pub ignore_large_imms: bool,
    /// Ignore differences in absolute address immediates.
    pub ignore_addr_diffs: bool,
    /// Sequence alignment algorithm.
    pub algorithm: Algorithm,
    /// Truncate input beyond this many parsed instruction lines.
    pub max_function_size_lines: usize,
    /// Truncate input beyond this many raw bytes of disassembly text.
    pub max_function_size_bytes: usize,
    /// Target column width for the plain/ANSI table formatters.
    pub column_width: usize,
    /// Which formatter backend to render with.
    pub formatter_kind: FormatterKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arch: "mips".to_string(),
            diff_obj: true,
            source: false,
            source_old_binutils: false,
            inlines: false,
            threeway: ThreewayMode::None,
            base_shift: 0,
            skip_lines: 0,
            show_branches: true,
            stop_at_return: false,
            ignore_large_imms: false,
            ignore_addr_diffs: false,
            algorithm: Algorithm::Levenshtein,
            max_function_size_lines: 25_000,
            max_function_size_bytes: 100_000,
            column_width: 50,
            formatter_kind: FormatterKind::Plain,
        }
    }
}

impl Config {
    /// Construct a config with every field at its documented default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate flag combinations that are individually well-typed but
    /// jointly nonsensical. Called by [`crate::run_diff`] before any
    /// parsing happens.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.base_shift != 0 && !self.diff_obj {
            return Err(crate::error::DiffError::InvalidConfig {
                message: "base_shift requires diff_obj (object-file mode)".to_string(),
            });
        }
        if self.threeway != ThreewayMode::None && self.max_function_size_lines == 0 {
            return Err(crate::error::DiffError::InvalidConfig {
                message: "threeway overlay requires a nonzero max_function_size_lines"
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.arch, "mips");
        assert!(config.diff_obj);
        assert_eq!(config.algorithm, Algorithm::Levenshtein);
    }

    #[test]
    fn test_validate_rejects_base_shift_without_diff_obj() {
        let mut config = Config::new();
        config.diff_obj = false;
        config.base_shift = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::new().validate().is_ok());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = Config::new();
        config.arch = "aarch64".to_string();
        config.formatter_kind = FormatterKind::Html;
        config.threeway = ThreewayMode::Prev;

        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.arch, "aarch64");
        assert_eq!(restored.formatter_kind, FormatterKind::Html);
        assert_eq!(restored.threeway, ThreewayMode::Prev);
    }
}
