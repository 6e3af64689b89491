//! The styled text segment model.
//!
//! Building diffs over already-colored strings is the classic source of
//! bugs in this kind of tool: substitution has to dodge escape codes,
//! width computation has to skip them, and every formatter needs its
//! own string-surgery. Keeping styling metadata out-of-band as a
//! sequence of `(chunk, format)` segments until the very last rendering
//! step makes all three trivial and correct.

use regex::Regex;

/// A tagged style applied to one chunk of a [`Text`] value.
///
/// Basic variants carry no data. The parameterized variants
/// (`RegDiff`/`StackDiff`/`Branch`) additionally carry a stable rotation
/// slot so that, e.g., the same register name gets the same color
/// everywhere in a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// No styling.
    None,
    /// A non-address immediate operand.
    Immediate,
    /// A stack-pointer-relative operand, uncolored (used before
    /// rotation assignment, or when coloring is disabled).
    Stack,
    /// A register operand, uncolored.
    Register,
    /// Dimmed delay-slot instruction text.
    DelaySlot,
    /// A changed segment in a "replace" row.
    DiffChange,
    /// An inserted segment (current-only row).
    DiffAdd,
    /// A removed segment (base-only row).
    DiffRemove,
    /// A source-annotation line naming a filename.
    SourceFilename,
    /// A source-annotation line naming a function (`name():`).
    SourceFunction,
    /// Any other source-annotation line.
    SourceOther,
    /// A register operand with a stable per-column rotation slot.
    RegDiff {
        /// Rotation namespace (`base-reg` or `my-reg`).
        group: &'static str,
        /// Rotation slot index, stable for a given `key` within `group`.
        index: usize,
        /// The operand text the slot was assigned for.
        key: String,
    },
    /// A stack offset operand with a stable per-column rotation slot.
    /// Stack groups start their index at 4 so stack and register colors
    /// never collide in a shared palette.
    StackDiff {
        /// Rotation namespace (`base-stack` or `my-stack`).
        group: &'static str,
        /// Rotation slot index, stable for a given `key` within `group`.
        index: usize,
        /// The operand text the slot was assigned for.
        key: String,
    },
    /// A branch source or target annotation.
    Branch {
        /// Rotation namespace the branch arrow belongs to.
        group: &'static str,
        /// Rotation slot index for this particular arrow.
        index: usize,
        /// Opaque key identifying the branch (typically the target
        /// address text).
        key: String,
        /// Line number of the branch instruction.
        from_line: String,
        /// Line number of the branch target.
        to_line: String,
        /// Whether this segment is the target end (`true`) or the
        /// source end (`false`) of the arrow.
        is_target: bool,
    },
}

impl Default for Format {
    fn default() -> Self {
        Format::None
    }
}

/// An ordered sequence of `(chunk, format)` segments.
///
/// Immutable by convention: every transforming method returns a new
/// `Text` rather than mutating in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(Vec<(String, Format)>);

impl Text {
    /// An empty text value.
    pub fn new() -> Self {
        Text(Vec::new())
    }

    /// A single unstyled segment.
    pub fn plain(s: impl Into<String>) -> Self {
        Text(vec![(s.into(), Format::None)])
    }

    /// A single segment with the given format.
    pub fn styled(s: impl Into<String>, format: Format) -> Self {
        Text(vec![(s.into(), format)])
    }

    /// Append a segment in place, merging with the previous segment if
    /// its format is identical (keeps the segment list compact).
    pub fn push(&mut self, s: impl Into<String>, format: Format) {
        let s = s.into();
        if s.is_empty() {
            return;
        }
        if let Some((last_chunk, last_format)) = self.0.last_mut() {
            if *last_format == format {
                last_chunk.push_str(&s);
                return;
            }
        }
        self.0.push((s, format));
    }

    /// Concatenate another `Text` onto this one, consuming both.
    pub fn concat(mut self, other: Text) -> Self {
        for (chunk, format) in other.0 {
            self.push(chunk, format);
        }
        self
    }

    /// Iterate over the underlying segments.
    pub fn segments(&self) -> impl Iterator<Item = &(String, Format)> {
        self.0.iter()
    }

    /// True if there are no segments, or all segments are empty.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(s, _)| s.is_empty())
    }

    /// Flatten to plain text, discarding all styling.
    pub fn to_plain_string(&self) -> String {
        self.0.iter().map(|(s, _)| s.as_str()).collect()
    }

    /// Total character count across all segments (used for padding
    /// computations that must ignore styling).
    pub fn display_width(&self) -> usize {
        self.0.iter().map(|(s, _)| s.chars().count()).sum()
    }

    /// Apply a regex substitution across the text, preserving segment
    /// boundaries outside the match and replacing each match's span
    /// with a new segment in the given format. Matches never cross
    /// segment boundaries: the regex runs independently within each
    /// existing segment, which keeps the styling of unrelated chunks
    /// untouched.
    pub fn substitute(&self, pattern: &Regex, replacement_format: Format) -> Text {
        let mut out = Text::new();
        for (chunk, format) in &self.0 {
            let mut last_end = 0;
            for m in pattern.find_iter(chunk) {
                if m.start() > last_end {
                    out.push(&chunk[last_end..m.start()], format.clone());
                }
                out.push(m.as_str(), replacement_format.clone());
                last_end = m.end();
            }
            if last_end < chunk.len() {
                out.push(&chunk[last_end..], format.clone());
            }
        }
        out
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::plain(s)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::plain(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_roundtrip() {
        let t = Text::plain("addiu v0,zero,1");
        assert_eq!(t.to_plain_string(), "addiu v0,zero,1");
    }

    #[test]
    fn test_push_merges_same_format() {
        let mut t = Text::new();
        t.push("add", Format::None);
        t.push("iu", Format::None);
        assert_eq!(t.segments().count(), 1);
        assert_eq!(t.to_plain_string(), "addiu");
    }

    #[test]
    fn test_push_splits_on_format_change() {
        let mut t = Text::new();
        t.push("addiu ", Format::None);
        t.push("v0", Format::Register);
        t.push(",zero,1", Format::None);
        assert_eq!(t.segments().count(), 3);
        assert_eq!(t.to_plain_string(), "addiu v0,zero,1");
    }

    #[test]
    fn test_concat() {
        let a = Text::plain("addiu ");
        let b = Text::styled("v0", Format::Register);
        let combined = a.concat(b);
        assert_eq!(combined.to_plain_string(), "addiu v0");
        assert_eq!(combined.segments().count(), 2);
    }

    #[test]
    fn test_display_width_ignores_format() {
        let mut t = Text::new();
        t.push("lw", Format::None);
        t.push("v0", Format::Register);
        assert_eq!(t.display_width(), 4);
    }

    #[test]
    fn test_substitute_preserves_other_segments() {
        let mut t = Text::new();
        t.push("lw v0,16", Format::None);
        t.push("(sp)", Format::Stack);
        let re = Regex::new(r"\d+").unwrap();
        let out = t.substitute(&re, Format::Immediate);
        let plain = out.to_plain_string();
        assert_eq!(plain, "lw v0,16(sp)");
        // "16" inside the first segment becomes its own Immediate segment
        assert!(out
            .segments()
            .any(|(s, f)| s == "16" && *f == Format::Immediate));
    }
}
