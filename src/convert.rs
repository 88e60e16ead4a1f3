//! End-to-end conversion: bytes in, [`LevelData`] out.
//!
//! Every stage runs to completion before the next begins, and the first error
//! aborts the whole conversion.

use crate::config::ConvertOptions;
use crate::error::{ConvertError, Result};
use crate::formats::manager::{get_manager, ImportContext};
use crate::level::LevelData;
use crate::palette::BlockDictionary;
use crate::section::sectionize;
use crate::volume::VolumeSource;
use serde_json::Value;
use tracing::info;

fn parse(data: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(data)?)
}

/// Sectionize any volume source and wrap the result.
pub fn assemble<S: VolumeSource + ?Sized>(source: &S, options: &ConvertOptions) -> LevelData {
    let sections = sectionize(source, options.out_of_range_id);
    info!("Assembled level data with {} sections", sections.len());
    LevelData::new(sections)
}

/// Convert `document` with the importer registered as `format`.
fn convert_as(
    format: &str,
    document: &Value,
    dictionary: Option<&BlockDictionary>,
    options: &ConvertOptions,
) -> Result<LevelData> {
    let context = ImportContext {
        dictionary,
        options,
    };
    let volume = get_manager().import_as(format, document, &context)?;
    Ok(assemble(volume.as_ref(), options))
}

/// Convert a dense `[[[id]]]` document.
pub fn convert_dense(data: &[u8], options: &ConvertOptions) -> Result<LevelData> {
    convert_as("dense", &parse(data)?, None, options)
}

/// Convert a paletted structure document using `dictionary` for name lookup.
pub fn convert_structure(
    data: &[u8],
    dictionary: &BlockDictionary,
    options: &ConvertOptions,
) -> Result<LevelData> {
    convert_as("structure", &parse(data)?, Some(dictionary), options)
}

/// Detect the input format and convert it.
pub fn convert(
    data: &[u8],
    dictionary: Option<&BlockDictionary>,
    options: &ConvertOptions,
) -> Result<LevelData> {
    let document = parse(data)?;
    let format = get_manager()
        .detect_format(&document)
        .ok_or(ConvertError::UnknownFormat)?;
    info!("Detected {} input", format);
    convert_as(&format, &document, dictionary, options)
}
