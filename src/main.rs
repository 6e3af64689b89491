//! asm-differ CLI
//!
//! Command-line front end over the diff core: reads two disassembly
//! text files (or `-` for stdin), resolves CLI flags into a
//! [`Config`], and prints the rendered diff. Everything this binary
//! does beyond that -- invoking objdump, watching the filesystem,
//! paging, serving HTML over HTTP -- belongs to a project-level
//! collaborator, not to this crate.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use asm_differ_core::{
    config::{Algorithm, Config, FormatterKind, ThreewayMode},
    run_diff,
};

/// Semantic assembly-diff engine for decompilation work.
///
/// Diffs two objdump-style disassembly listings of the same function,
/// ignoring cosmetic differences (renamed registers, shifted stack
/// offsets, reordered immediates) while highlighting real divergences.
#[derive(Parser, Debug)]
#[command(name = "asm-differ")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the base (reference) disassembly listing, or `-` for stdin.
    base: PathBuf,

    /// Path to the current (candidate) disassembly listing.
    current: PathBuf,

    /// Target architecture.
    #[arg(short, long, default_value = "mips")]
    arch: String,

    /// Diff object-file disassembly (symbol labels, per-line
    /// relocations) rather than whole-binary disassembly.
    #[arg(long, default_value_t = true)]
    diff_obj: bool,

    /// Capture interleaved source-code annotation lines.
    #[arg(long)]
    source: bool,

    /// Annotate branch source/target lines with arrows.
    #[arg(long, default_value_t = true)]
    show_branches: bool,

    /// Stop parsing after the first `jr ra`.
    #[arg(long)]
    stop_at_return: bool,

    /// Treat large immediates as insignificant for alignment.
    #[arg(long)]
    ignore_large_imms: bool,

    /// Sequence alignment algorithm.
    #[arg(long, value_enum, default_value = "levenshtein")]
    algorithm: AlgorithmArg,

    /// Output rendering backend.
    #[arg(short, long, value_enum, default_value = "ansi")]
    format: FormatterArg,

    /// Target column width for the plain/ANSI table formatters.
    #[arg(long, default_value_t = 50)]
    column_width: usize,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// CLI-facing mirror of [`Algorithm`] (clap needs `ValueEnum`, which the
/// core's own enum intentionally does not derive).
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    /// Minimal edit distance.
    Levenshtein,
    /// Longest-common-subsequence with anchoring.
    Difflib,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(a: AlgorithmArg) -> Self {
        match a {
            AlgorithmArg::Levenshtein => Algorithm::Levenshtein,
            AlgorithmArg::Difflib => Algorithm::Difflib,
        }
    }
}

/// CLI-facing mirror of [`FormatterKind`].
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatterArg {
    /// Fixed-width columns, no escape sequences.
    Plain,
    /// ANSI terminal escape sequences.
    Ansi,
    /// HTML `<table>` for the browser UI.
    Html,
}

impl From<FormatterArg> for FormatterKind {
    fn from(f: FormatterArg) -> Self {
        match f {
            FormatterArg::Plain => FormatterKind::Plain,
            FormatterArg::Ansi => FormatterKind::Ansi,
            FormatterArg::Html => FormatterKind::Html,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("asm_differ_core=debug")
            .init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let base_text = read_input(&args.base)?;
    let current_text = read_input(&args.current)?;

    let config = Config {
        arch: args.arch.clone(),
        diff_obj: args.diff_obj,
        source: args.source,
        source_old_binutils: false,
        inlines: false,
        threeway: ThreewayMode::None,
        base_shift: 0,
        skip_lines: 0,
        show_branches: args.show_branches,
        stop_at_return: args.stop_at_return,
        ignore_large_imms: args.ignore_large_imms,
        ignore_addr_diffs: false,
        algorithm: args.algorithm.into(),
        column_width: args.column_width,
        formatter_kind: args.format.into(),
        ..Config::new()
    };

    tracing::debug!(arch = %config.arch, diff_obj = config.diff_obj, "running diff");

    let rendered = run_diff(&base_text, &current_text, &config)?;
    println!("{rendered}");
    Ok(())
}

fn read_input(path: &PathBuf) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing_defaults() {
        let args = Args::try_parse_from(["asm-differ", "base.s", "current.s"]).unwrap();
        assert_eq!(args.arch, "mips");
        assert!(args.diff_obj);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_format_flag() {
        let args =
            Args::try_parse_from(["asm-differ", "-f", "html", "base.s", "current.s"]).unwrap();
        assert!(matches!(args.format, FormatterArg::Html));
    }

    #[test]
    fn test_args_requires_two_paths() {
        assert!(Args::try_parse_from(["asm-differ", "base.s"]).is_err());
    }
}
