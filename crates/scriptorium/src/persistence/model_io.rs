//! # Model Blob IO

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use bincode::Options;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{SCResult, ScriptoriumError},
    indexer::{CharIndexer, LanguageIndexer},
    substitution::{
        BasicGlyphSubstitutionModel,
        GlyphSubstitutionModel,
        SubstitutionContext,
        SubstitutionModelOptions,
        SubstitutionPrior,
    },
};

/// The blob header.
pub const MODEL_MAGIC: &[u8] = b"SCRIPTORIUM-GSM\n";

/// The schema version this build reads and writes.
pub const MODEL_VERSION: u32 = 1;

/// The largest decompressed body accepted by [`load_model`].
pub const MAX_MODEL_BODY_BYTES: u64 = 256 << 20;

/// The body codec: ``bincode``'s fixed-width default layout with a size limit.
fn body_codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(MAX_MODEL_BODY_BYTES)
}

/// The serialized body of a model blob.
#[derive(Serialize, Deserialize)]
struct ModelRecord {
    chars: CharIndexer,
    languages: LanguageIndexer,
    options: SubstitutionModelOptions,
    prior: SubstitutionPrior,
    contexts: Vec<(SubstitutionContext, Vec<f64>)>,
}

/// Write a model blob.
///
/// Pending (un-normalized) counts are not saved.
///
/// ## Arguments
/// * `model` - the model.
/// * `writer` - the destination.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn save_model<W: Write>(
    model: &BasicGlyphSubstitutionModel,
    mut writer: W,
) -> SCResult<()> {
    if !model.pending_counts().is_empty() {
        log::warn!(
            "saving model with {} un-normalized contexts; they are dropped",
            model.pending_counts().num_contexts()
        );
    }

    let record = ModelRecord {
        chars: model.character_indexer().clone(),
        languages: model.language_indexer().clone(),
        options: *model.options(),
        prior: model.prior().clone(),
        contexts: model
            .trained_contexts()
            .into_iter()
            .map(|(context, probs)| (context, probs.to_vec()))
            .collect(),
    };

    writer.write_all(MODEL_MAGIC)?;
    writer.write_all(&MODEL_VERSION.to_le_bytes())?;

    let mut gzip = GzEncoder::new(writer, Compression::default());
    body_codec().serialize_into(&mut gzip, &record)?;
    gzip.finish()?.flush()?;
    Ok(())
}

/// Read a model blob.
///
/// ## Errors
/// * [`ScriptoriumError::IncompatibleModelVersion`] if the magic or schema
///   version does not match this build.
/// * [`ScriptoriumError::Codec`] for a malformed body, or one that would
///   exceed [`MAX_MODEL_BODY_BYTES`].
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn load_model<R: Read>(mut reader: R) -> SCResult<BasicGlyphSubstitutionModel> {
    let mut magic = [0u8; MODEL_MAGIC.len()];
    reader
        .read_exact(&mut magic)
        .map_err(|_| incompatible(None))?;
    if magic != MODEL_MAGIC {
        return Err(incompatible(None));
    }

    let mut version = [0u8; 4];
    reader
        .read_exact(&mut version)
        .map_err(|_| incompatible(None))?;
    let version = u32::from_le_bytes(version);
    if version != MODEL_VERSION {
        return Err(incompatible(Some(version)));
    }

    let record: ModelRecord = body_codec().deserialize_from(GzDecoder::new(reader))?;
    BasicGlyphSubstitutionModel::from_trained(
        record.chars,
        record.languages,
        record.options,
        record.prior,
        record.contexts,
    )
}

fn incompatible(found: Option<u32>) -> ScriptoriumError {
    ScriptoriumError::IncompatibleModelVersion {
        found,
        expected: MODEL_VERSION,
    }
}

/// Write a model blob to a file.
pub fn save_model_path<P: AsRef<Path>>(
    model: &BasicGlyphSubstitutionModel,
    path: P,
) -> SCResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    save_model(model, writer)
}

/// Read a model blob from a file.
pub fn load_model_path<P: AsRef<Path>>(path: P) -> SCResult<BasicGlyphSubstitutionModel> {
    let reader = BufReader::new(File::open(path)?);
    load_model(reader)
}
