//! Command-line interface for docmeta.
//!
//! Parsing is clap's job; the cross-argument rules the parser cannot express
//! (write/meta pairing, single write target) live in [`Cli::validate`]. The
//! core pipelines only ever see validated argument combinations.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::codec::Format;
use crate::ops::MetadataSource;

/// Sentinel meaning "standard stream" in file positions.
const STDIO_SENTINEL: &str = "-";

/// docmeta - read/write embedded document metadata
#[derive(Parser, Debug)]
#[command(name = "docmeta")]
#[command(about = "Read/write JSON metadata embedded in PDF documents")]
#[command(version)]
pub struct Cli {
    /// Location of documents to read
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Specify metadata output format
    #[arg(long = "type", value_enum, default_value_t = Format::Json, group = "format")]
    pub r#type: Format,

    /// Output metadata in JSON, same as --type json
    #[arg(short, long, group = "format")]
    pub json: bool,

    /// Output metadata in YAML, same as --type yaml
    #[arg(short, long, group = "format")]
    pub yaml: bool,

    /// Location of document to be written
    #[arg(short, long, value_name = "FILE")]
    pub write: Option<PathBuf>,

    /// Location of metadata; a bare -m reads from stdin
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = STDIO_SENTINEL
    )]
    pub meta: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Effective output format after the -j/-y shorthands.
    pub fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else if self.yaml {
            Format::Yaml
        } else {
            self.r#type
        }
    }

    /// Metadata source for the write pipeline, when one was given.
    pub fn metadata_source(&self) -> Option<MetadataSource> {
        self.meta.as_ref().map(|path| {
            if path == Path::new(STDIO_SENTINEL) {
                MetadataSource::Stdin
            } else {
                MetadataSource::File(path.clone())
            }
        })
    }

    /// Validate the argument combination before any pipeline runs.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() && self.write.is_none() {
            bail!("You must specify a file to read or write.");
        }
        if self.meta.is_some() != self.write.is_some() {
            bail!("Both --meta and --write must be specified at the same time.");
        }
        if self.write.is_some() && self.files.len() != 1 {
            bail!("Writing requires exactly one input document.");
        }
        Ok(())
    }
}
