//! Read and write pipelines composing the guard, the engine, and the codec.
//!
//! All operations are synchronous and blocking. The library reports failures
//! through [`MetaError`] and never terminates the process; exit codes are the
//! caller's business.

use log::{info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use crate::codec::{self, DecodedTag, Format};
use crate::engine::Engine;
use crate::error::{MetaError, Result};
use crate::guard;

/// Where the metadata text for a write comes from.
#[derive(Debug, Clone)]
pub enum MetadataSource {
    /// Metadata read from a file on disk.
    File(PathBuf),
    /// Metadata piped through standard input.
    Stdin,
}

impl MetadataSource {
    /// Read the whole metadata text.
    ///
    /// Standard input is rejected when it is an interactive terminal with
    /// nothing piped in.
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            Self::File(path) => Ok(fs::read_to_string(path)?),
            Self::Stdin => {
                let mut stdin = io::stdin();
                if stdin.is_terminal() {
                    return Err(MetaError::NoMetadataInput);
                }
                let mut buffer = String::new();
                stdin.read_to_string(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

/// Result of a read request.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Rendered metadata of a single document.
    Rendered(String),
    /// Per-file outcomes of a batch read.
    Batch(Vec<BatchOutcome>),
}

/// Outcome of one document inside a batch read.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The document that was read.
    pub source: PathBuf,
    /// The sibling file the rendered metadata was persisted to, or the
    /// failure for this document.
    pub result: Result<PathBuf>,
}

/// Read metadata from one or more documents.
///
/// A single document yields its rendered metadata text. More than one
/// document runs the batch procedure, persisting sibling files and
/// collecting per-file outcomes.
pub fn read<P: AsRef<Path>>(engine: &Engine, files: &[P], format: Format) -> Result<ReadOutcome> {
    match files {
        [] => Err(MetaError::NoInputFiles),
        [file] => {
            let payload = read_single(engine, file.as_ref())?;
            Ok(ReadOutcome::Rendered(codec::render(&payload, format)?))
        }
        _ => Ok(ReadOutcome::Batch(read_batch(engine, files, format)?)),
    }
}

/// Read the metadata payload embedded in a single document.
///
/// A document without the custom tag yields an empty object; a tag that
/// cannot be parsed is an error.
pub fn read_single(engine: &Engine, file: &Path) -> Result<Value> {
    let file = guard::resolve(file, true)?;
    guard::check_allowed(&file)?;

    let output = engine.execute(["-j".as_ref(), file.as_os_str()])?;
    if !output.success {
        return Err(MetaError::EngineReadFailed {
            code: output.exit_code,
        });
    }

    match codec::decode_engine_output(&output.stdout) {
        DecodedTag::Present(payload) => Ok(payload),
        DecodedTag::Empty => Ok(Value::Object(Map::new())),
        DecodedTag::Malformed(reason) => Err(MetaError::MalformedTag(reason)),
    }
}

/// Read metadata from several documents, persisting each rendered payload to
/// a sibling file named after the document's stem.
///
/// A failure on one document does not abort the rest; every document gets an
/// outcome.
pub fn read_batch<P: AsRef<Path>>(
    engine: &Engine,
    files: &[P],
    format: Format,
) -> Result<Vec<BatchOutcome>> {
    if files.is_empty() {
        return Err(MetaError::NoInputFiles);
    }
    info!("Batch reading {} documents", files.len());

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let file = file.as_ref();
        let result = read_batch_entry(engine, file, format);
        if let Err(err) = &result {
            warn!("Batch read failed for {}: {err}", file.display());
        }
        outcomes.push(BatchOutcome {
            source: file.to_path_buf(),
            result,
        });
    }
    Ok(outcomes)
}

fn read_batch_entry(engine: &Engine, file: &Path, format: Format) -> Result<PathBuf> {
    let payload = read_single(engine, file)?;
    let rendered = codec::render(&payload, format)?;
    let target = sibling_path(file, format);
    fs::write(&target, rendered)?;
    Ok(target)
}

/// Sibling file a batch read writes next to the source document.
pub fn sibling_path(file: &Path, format: Format) -> PathBuf {
    file.with_extension(format.sibling_extension())
}

/// Inject a metadata payload into a copy of `input` written at `output`.
///
/// The envelope text goes through a uniquely named temporary file that is
/// removed on every exit path. The engine's `+=` merge keeps unrelated tags
/// and only adds or overwrites the custom tag.
pub fn write_single(
    engine: &Engine,
    input: &Path,
    output: &Path,
    metadata: &MetadataSource,
) -> Result<()> {
    if output == Path::new("-") {
        return Err(MetaError::UnsupportedDestination);
    }
    let input = guard::resolve(input, true)?;
    guard::check_allowed(&input)?;
    let output = guard::resolve(output, false)?;
    guard::check_allowed(&output)?;

    let raw = metadata.read_to_string()?;
    let payload = codec::load(&raw)?;
    let envelope = codec::encode_engine_input(&payload, None)?;

    // Unique per call; deleted when the handle drops, on every exit path.
    let mut artifact = tempfile::Builder::new()
        .prefix("docmeta_")
        .suffix(".json")
        .tempfile()?;
    artifact.write_all(envelope.as_bytes())?;
    artifact.write_all(b"\n")?;
    artifact.flush()?;
    info!(
        "Injecting metadata into {} via {}",
        output.display(),
        artifact.path().display()
    );

    let merge_arg = format!("-j+={}", artifact.path().display());
    let result = engine.execute([
        merge_arg.as_ref(),
        "-o".as_ref(),
        output.as_os_str(),
        input.as_os_str(),
    ])?;
    if !result.success {
        return Err(MetaError::EngineWriteFailed {
            code: result.exit_code,
        });
    }
    Ok(())
}
