//! `lossless-verify` — check that a document survives a decode/encode round
//! trip against a type descriptor.
//!
//! Usage:
//!   lossless-verify --schema <type.json> [document.json] [--order declared|document] [--emit]
//!
//! The document is read from stdin when no path is given.

use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::codec::{CodecOptions, FieldOrder};
use crate::descriptor::TypeDescriptor;
use crate::dynamic::DynamicCodec;
use crate::error::LosslessError;
use crate::verify::{verify, Report};

#[derive(Debug, Parser)]
#[command(
    name = "lossless-verify",
    about = "Check that unknown fields survive a decode/encode round trip"
)]
pub struct Args {
    /// JSON type descriptor of the target record type.
    #[arg(long)]
    pub schema: PathBuf,
    /// Document to check; read from stdin when omitted.
    pub document: Option<PathBuf>,
    /// Field order of the re-encoded document.
    #[arg(long, value_enum, default_value_t = Order::Declared)]
    pub order: Order,
    /// Print the re-encoded document.
    #[arg(long)]
    pub emit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Order {
    Declared,
    Document,
}

impl From<Order> for FieldOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Declared => FieldOrder::Declared,
            Order::Document => FieldOrder::Document,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{what} is not valid JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Lossless(#[from] LosslessError),
}

/// Parses a descriptor and a document and verifies the round trip.
pub fn verify_text(schema: &str, document: &str, order: FieldOrder) -> Result<Report, CliError> {
    let descriptor: TypeDescriptor =
        serde_json::from_str(schema).map_err(|source| CliError::Json {
            what: "type descriptor",
            source,
        })?;
    let document: Value = serde_json::from_str(document).map_err(|source| CliError::Json {
        what: "document",
        source,
    })?;
    let codec = DynamicCodec::with_options(
        descriptor,
        CodecOptions::default().with_field_order(order),
    );
    Ok(verify(&codec, &document)?)
}

/// Renders a report the way the binary prints it: the encoded document when
/// asked for, then one `<kind> <pointer>` line per mismatch.
pub fn render(report: &Report, emit: bool) -> String {
    let mut out = String::new();
    if emit {
        out.push_str(&serde_json::to_string_pretty(&report.encoded).unwrap_or_default());
        out.push('\n');
    }
    for mismatch in &report.mismatches {
        out.push_str(&mismatch.to_string());
        out.push('\n');
    }
    out
}

/// Runs the command. Returns the report; the caller decides the exit code.
pub fn run(args: &Args) -> Result<Report, CliError> {
    let schema = read_file(&args.schema)?;
    let document = match &args.document {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".into(),
                    source,
                })?;
            buf
        }
    };
    verify_text(&schema, &document, args.order.into())
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}
