use crate::error::{ConvertError, Result};
use crate::formats::manager::{ImportContext, VolumeImporter};
use crate::schema::dense_volume_schema;
use crate::volume::{DenseVolume, VolumeSource};
use crate::BlockId;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Validate and decode a `[[[id]]]` document into a rectangular volume.
pub fn decode(document: &Value) -> Result<DenseVolume> {
    dense_volume_schema()
        .validate(document)
        .map_err(|violation| ConvertError::Schema {
            document: "input file",
            violation,
        })?;

    let raw = Vec::<Vec<Vec<i64>>>::deserialize(document)?;
    let mut rows: Vec<Vec<Vec<BlockId>>> = Vec::with_capacity(raw.len());
    for (x, row) in raw.into_iter().enumerate() {
        let mut out_row = Vec::with_capacity(row.len());
        for (y, col) in row.into_iter().enumerate() {
            let col = col
                .into_iter()
                .enumerate()
                .map(|(z, id)| {
                    BlockId::try_from(id).map_err(|_| ConvertError::BlockIdOutOfRange {
                        path: format!("/{}/{}/{}", x, y, z),
                        value: id,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            out_row.push(col);
        }
        rows.push(out_row);
    }

    DenseVolume::from_nested(&rows)
}

/// Decode and pad to a 16-aligned grid.
pub fn import_dense(document: &Value, padding_id: BlockId) -> Result<DenseVolume> {
    let volume = decode(document)?;
    let padded = volume.normalize(padding_id);
    info!(
        "Read dense volume {:?}, padded to {:?}",
        volume.size(),
        padded.size()
    );
    Ok(padded)
}

pub struct DenseFormat;

impl VolumeImporter for DenseFormat {
    fn name(&self) -> String {
        "dense".to_string()
    }

    fn detect(&self, document: &Value) -> bool {
        document.is_array()
    }

    fn import(
        &self,
        document: &Value,
        context: &ImportContext<'_>,
    ) -> Result<Box<dyn VolumeSource>> {
        Ok(Box::new(import_dense(document, context.options.padding_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_dense() {
        let volume = decode(&json!([[[1, 2]], [[3, 4]]])).unwrap();
        assert_eq!(volume.size(), (2, 1, 2));
        assert_eq!(volume.get(1, 0, 0), Some(3));
    }

    #[test]
    fn test_decode_rejects_schema_violation() {
        let err = decode(&json!([[1, 2]])).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Schema {
                document: "input file",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_ragged() {
        assert!(matches!(
            decode(&json!([[[1, 2]], [[3]]])),
            Err(ConvertError::RaggedVolume { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_wide_ids() {
        match decode(&json!([[[1, 4_294_967_296i64]]])) {
            Err(ConvertError::BlockIdOutOfRange { path, .. }) => assert_eq!(path, "/0/0/1"),
            other => panic!("expected out of range id, got {:?}", other),
        }
    }

    #[test]
    fn test_import_dense_pads() {
        let volume = import_dense(&json!([[[1]]]), -1).unwrap();
        assert_eq!(volume.size(), (16, 16, 16));
        assert_eq!(volume.get(0, 0, 0), Some(1));
        assert_eq!(volume.get(0, 0, 1), Some(-1));
    }

    #[test]
    fn test_detect() {
        assert!(DenseFormat.detect(&json!([])));
        assert!(!DenseFormat.detect(&json!({"size": [1, 1, 1]})));
    }
}
