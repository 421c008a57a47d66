//! `lossless-verify` — round-trip a JSON document through a type descriptor
//! and report every path that did not survive.
//!
//! Exit status: 0 when lossless, 1 when mismatches were found, 2 on error.

use clap::Parser;
use json_lossless::cli::{render, run, Args};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(report) => {
            let text = render(&report, args.emit);
            if let Err(e) = io::stdout().write_all(text.as_bytes()) {
                eprintln!("{e}");
                return ExitCode::from(2);
            }
            if report.is_lossless() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
