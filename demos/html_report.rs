//! Diffs two tiny MIPS functions and prints an HTML `<table class="diff">`
//! suitable for embedding in a browser-based viewer.
//!
//! Run with `cargo run --example html_report`.

use asm_differ_core::{run_diff, Config, FormatterKind};

fn main() {
    let base = "\
   0:\t8fa20010 \tlw\tv0,16(sp)\n\
   4:\t00000000 \tnop\n";

    let current = "\
   0:\t8fa20014 \tlw\tv0,20(sp)\n\
   4:\t00000000 \tnop\n";

    let config = Config {
        formatter_kind: FormatterKind::Html,
        ..Config::new()
    };

    match run_diff(base, current, &config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("diff failed: {e}"),
    }
}
