//! Error types for the assembly diff engine.
//!
//! This module defines the typed failure value returned by the core
//! pipeline, plus a small context-adding extension trait in the same
//! shape the rest of the crate uses for propagating lower-level errors.

use thiserror::Error;

/// Primary error type for the diff engine.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The configuration named an architecture the registry has no
    /// descriptor for.
    #[error("unknown architecture: {name}")]
    UnknownArch {
        /// The architecture name as given in `Config`.
        name: String,
    },

    /// An unsupported combination of configuration flags was requested.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable description of the conflicting flags.
        message: String,
    },

    /// The parser encountered a relocation kind the architecture
    /// descriptor does not know how to fuse. This indicates an
    /// architecture coverage gap, not a data error.
    #[error("unknown relocation kind {kind} for architecture {arch}")]
    UnknownRelocation {
        /// The relocation tag as it appeared in the input text.
        kind: String,
        /// The architecture name being diffed.
        arch: String,
    },

    /// The aligner was given sequences incompatible with either
    /// algorithm (should not happen for well-formed `Line` streams).
    #[error("alignment failed: {message}")]
    AlignmentFailed {
        /// Human-readable description of the failure.
        message: String,
    },
}

/// Result type alias for diff engine operations.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Wrap an underlying error with additional context, folding it into
    /// a [`DiffError::InvalidConfig`].
    fn context(self, msg: impl Into<String>) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| DiffError::InvalidConfig {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_arch_display() {
        let err = DiffError::UnknownArch {
            name: "sh2".to_string(),
        };
        assert!(err.to_string().contains("sh2"));
    }

    #[test]
    fn test_unknown_relocation_display() {
        let err = DiffError::UnknownRelocation {
            kind: "R_MIPS_GOT16".to_string(),
            arch: "mips".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("R_MIPS_GOT16"));
        assert!(msg.contains("mips"));
    }

    #[test]
    fn test_context_trait() {
        let r: std::result::Result<(), &str> = Err("boom");
        let wrapped = r.context("parsing header");
        assert!(wrapped.unwrap_err().to_string().contains("parsing header"));
    }
}
