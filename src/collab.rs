//! Collaborator interface boundaries.
//!
//! The core never invokes a subprocess, touches the filesystem, or
//! watches anything -- those concerns live one layer up, in whatever
//! binds this crate to a project (a `make`-driven decompilation repo, an
//! IDE plugin, a watch-and-serve daemon). This module defines the
//! *shape* of that boundary so collaborators have a stable contract to
//! implement against, without the core depending on any of their actual
//! mechanics.
//!
//! Nothing here is called by [`crate::run_diff`]; these types exist so
//! that a collaborator crate can express "I produce the two strings
//! `run_diff` wants" in terms the core already understands. They are
//! interface boundary types only, per the source's own scope note: the
//! crate ships no implementation of any of them.

use std::path::PathBuf;
use std::time::Instant;

use crate::error::DiffError;

/// The linker map dialect a [`LinkerMapLookup`] should parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// GNU ld `-Map` output.
    Gnu,
    /// CodeWarrior-style linker map, as emitted by older console SDKs.
    CodeWarrior,
    /// Metrowerks/MWLD map format.
    Mwld,
}

/// Where a function's code lives: which object file defines it, and its
/// address in ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    /// Path to the object file that defines the function.
    pub object_path: PathBuf,
    /// The function's address in ROM.
    pub rom_address: u64,
}

/// One function lookup request against a linker map.
#[derive(Debug, Clone)]
pub struct LinkerMapRequest {
    /// The function name to resolve.
    pub function_name: String,
    /// Which linker map dialect to parse.
    pub map_format: MapFormat,
    /// Root directory to search for the map file under.
    pub search_root: PathBuf,
}

/// Resolves a function name to the object file that defines it and its
/// address in ROM, by scanning a linker map.
///
/// Implemented by a project-aware collaborator; the core has no notion
/// of object files or ROM addresses, only disassembly text.
pub trait LinkerMapLookup {
    /// Resolve `request` to an [`ObjectLocation`].
    ///
    /// # Errors
    ///
    /// Implementations must error on ambiguity (the symbol appears in
    /// more than one object file) rather than guessing.
    fn locate(&self, request: &LinkerMapRequest) -> Result<ObjectLocation, DiffError>;
}

/// One `objdump` (or compatible disassembler) invocation request.
#[derive(Debug, Clone)]
pub struct ObjdumpRequest {
    /// Flags passed to the disassembler verbatim (arch flags, `-d`,
    /// `--source`, ...).
    pub flags: Vec<String>,
    /// Path to the object file or binary to disassemble.
    pub target_path: PathBuf,
    /// Restrict output to a single symbol, if given.
    pub restrict_symbol: Option<String>,
}

/// Invokes the disassembler and returns its textual output, in the form
/// [`crate::parser::parse`] expects.
pub trait ObjdumpInvoker {
    /// Run the disassembler per `request`.
    ///
    /// # Errors
    ///
    /// Implementations must surface the subprocess's stderr on failure
    /// rather than swallowing it.
    fn disassemble(&self, request: &ObjdumpRequest) -> Result<String, DiffError>;
}

/// One debounced filesystem-change notification.
///
/// A watcher collaborator posts these onto a bounded queue; a debounce
/// thread collapses bursts within a short window (the source uses 100
/// ms) and forwards a single event per burst. The core has no knowledge
/// of the queue or the debounce timer -- it only ever sees a fresh pair
/// of disassembly strings passed to [`crate::run_diff`] after one of
/// these fires.
#[derive(Debug, Clone, Copy)]
pub struct WatchEvent {
    /// Monotonic timestamp of the debounced event.
    pub at: Instant,
}

/// Sink a watcher collaborator notifies when a debounced rebuild should
/// happen. The core has no cancellation surface of its own: a rebuild in
/// flight always runs to completion, and a superseding [`WatchEvent`]
/// simply queues the next [`crate::run_diff`] call.
pub trait RebuildSignal {
    /// Notify the sink that `event` should trigger a rebuild.
    fn notify(&self, event: WatchEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSignal {
        seen: std::sync::Mutex<Vec<Instant>>,
    }

    impl RebuildSignal for RecordingSignal {
        fn notify(&self, event: WatchEvent) {
            self.seen.lock().unwrap().push(event.at);
        }
    }

    #[test]
    fn test_rebuild_signal_receives_event() {
        let sink = RecordingSignal { seen: std::sync::Mutex::new(Vec::new()) };
        sink.notify(WatchEvent { at: Instant::now() });
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_map_format_variants_distinct() {
        assert_ne!(MapFormat::Gnu, MapFormat::CodeWarrior);
    }

    #[test]
    fn test_object_location_fields() {
        let loc = ObjectLocation {
            object_path: PathBuf::from("build/src/foo.o"),
            rom_address: 0x8000_1000,
        };
        assert_eq!(loc.rom_address, 0x8000_1000);
    }
}
