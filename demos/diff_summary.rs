//! Diffs two tiny MIPS functions and prints a plain-text summary.
//!
//! Run with `cargo run --example diff_summary`.

use asm_differ_core::{run_diff, Config};

fn main() {
    let base = "\
   0:\t24020001 \taddiu\tv0,zero,1\n\
   4:\t00021023 \tsubu\tv0,zero,v0\n\
   8:\t03e00008 \tjr\tra\n\
   c:\t00000000 \tnop\n";

    let current = "\
   0:\t24030001 \taddiu\tv1,zero,1\n\
   4:\t00031823 \tsubu\tv1,zero,v1\n\
   8:\t03e00008 \tjr\tra\n\
   c:\t00000000 \tnop\n";

    let config = Config {
        formatter_kind: asm_differ_core::FormatterKind::Plain,
        ..Config::new()
    };

    match run_diff(base, current, &config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("diff failed: {e}"),
    }
}
