use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PublishError, Result};

/// Flat string metadata supplied alongside a model.
///
/// Keys consumed into the manifest are removed; whatever remains is sent as
/// upload query parameters, in insertion order.
pub type Metadata = IndexMap<String, String>;

/// Type tag of the legacy family that carries a vectorizer pipeline.
pub const LEGACY_MODEL_TYPE: &str = "spark-mllib";

/// Metadata key recording the manifest filename for the upload step.
pub(crate) const MODEL_SPEC_KEY: &str = "modelSpec";

/// Structured description of a saved model, written as `<modelType>.json`
/// next to the model's own artifacts. Field order is the serialized key
/// order, which keeps manifests diff-friendly across saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub model_type: String,
    pub model_class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectorizer: Option<Vec<VectorizerStep>>,
}

/// One step of the feature-vectorization pipeline. Serializes as a
/// single-key object naming the step, e.g. `{"hashingTF": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VectorizerStep {
    #[serde(rename = "lucene-analyzer")]
    LuceneAnalyzer(Value),
    #[serde(rename = "hashingTF")]
    HashingTf(HashingTf),
}

/// Parameters of the hashing term-frequency step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashingTf {
    #[serde(rename = "numFeatures")]
    pub num_features: String,
}

/// Build the manifest for a model, consuming the metadata keys it absorbs.
///
/// Takes ownership of the metadata map and returns the reduced map, so key
/// consumption is part of the visible contract rather than a side effect.
pub fn build_manifest(
    model_id: &str,
    model_type: &str,
    model_class_name: &str,
    mut metadata: Metadata,
) -> Result<(Manifest, Metadata)> {
    // The manifest's own class-name field is authoritative.
    metadata.shift_remove("modelClassName");

    let feature_fields = metadata
        .shift_remove("featureFields")
        .map(|fields| fields.split(',').map(str::to_string).collect::<Vec<_>>());

    let vectorizer = if model_type == LEGACY_MODEL_TYPE {
        Some(build_vectorizer(&mut metadata)?)
    } else {
        None
    };

    let manifest = Manifest {
        id: model_id.to_string(),
        model_type: model_type.to_string(),
        model_class_name: model_class_name.to_string(),
        feature_fields,
        vectorizer,
    };
    Ok((manifest, metadata))
}

/// Assemble the two-step vectorizer for legacy models: the text analyzer
/// followed by the hashing term-frequency stage.
fn build_vectorizer(metadata: &mut Metadata) -> Result<Vec<VectorizerStep>> {
    let analyzer_json = metadata.shift_remove("analyzerJson").ok_or_else(|| {
        PublishError::Manifest(format!(
            "{} models require an analyzerJson metadata entry",
            LEGACY_MODEL_TYPE
        ))
    })?;
    let analyzer: Value = serde_json::from_str(&analyzer_json)
        .map_err(|e| PublishError::Manifest(format!("invalid analyzerJson: {}", e)))?;

    let num_features = metadata.shift_remove("numFeatures").ok_or_else(|| {
        PublishError::Manifest(format!(
            "{} models require a numFeatures metadata entry",
            LEGACY_MODEL_TYPE
        ))
    })?;

    Ok(vec![
        VectorizerStep::LuceneAnalyzer(analyzer),
        VectorizerStep::HashingTf(HashingTf { num_features }),
    ])
}

/// Serialize the manifest to `<model_dir>/<modelType>.json` (UTF-8) and
/// return the path written.
///
/// If serialization fails, the writer is dropped and close-time errors are
/// swallowed so they cannot mask the original failure.
pub fn write_manifest(manifest: &Manifest, model_dir: &Path) -> Result<PathBuf> {
    let path = model_dir.join(format!("{}.json", manifest.model_type));
    debug!("Writing manifest {}", path.display());

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, manifest)
        .map_err(|e| PublishError::Manifest(format!("failed to serialize manifest: {}", e)))?;
    writer.flush()?;

    Ok(path)
}
