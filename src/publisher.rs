use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use log::info;

use crate::archive;
use crate::error::{PublishError, Result};
use crate::host::FusionHost;
use crate::manifest::{self, Metadata};
use crate::model::{self, MlModel};
use crate::staging;
use crate::transport::{Credentials, SessionClient, Transport};
use crate::upload;

const MODEL_TYPE_KEY: &str = "modelType";

/// Artifacts a successful publish leaves behind. Neither the staged
/// directory nor the archive is cleaned up; they are the audit trail.
#[derive(Debug, Clone)]
pub struct PublishedModel {
    pub model_id: String,
    pub model_dir: PathBuf,
    pub archive_path: PathBuf,
}

/// Packages trained models and publishes them to a Fusion blob store.
///
/// The pipeline is strictly linear and blocking: stage a directory, let the
/// model persist itself into it, write the manifest, zip the directory,
/// PUT the archive. Concurrent publishes of the same model id race on the
/// staging directory and archive name; callers serialize per id.
pub struct ModelPublisher<T> {
    host: FusionHost,
    transport: T,
    staging_root: PathBuf,
}

impl ModelPublisher<SessionClient> {
    /// Connect to `host_and_port` (`"fusion"` or `"fusion:8764"`) using the
    /// default cookie-session transport.
    pub fn connect(host_and_port: &str, credentials: Credentials) -> Result<Self> {
        let host = FusionHost::from_str(host_and_port)?;
        let transport = SessionClient::new(&host.origin_url()?, credentials)?;
        Ok(Self::with_transport(host, transport))
    }
}

impl<T: Transport> ModelPublisher<T> {
    /// Build a publisher over a caller-supplied transport.
    pub fn with_transport(host: FusionHost, transport: T) -> Self {
        Self {
            host,
            transport,
            staging_root: PathBuf::from("."),
        }
    }

    /// Stage models and archives under `root` instead of the working
    /// directory.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    /// Run the full pipeline for one model.
    ///
    /// `metadata` keys consumed into the manifest are dropped; everything
    /// left over is transmitted as upload query parameters. Returns the
    /// on-disk artifacts of the publish.
    pub fn publish<C>(
        &self,
        ctx: &C,
        model_id: &str,
        model: &dyn MlModel<C>,
        mut metadata: Metadata,
    ) -> Result<PublishedModel> {
        validate_model_id(model_id)?;

        // Capability check comes before any filesystem mutation.
        let persistence = model::resolve_persistence(model)?;

        let model_type = match metadata.get(MODEL_TYPE_KEY) {
            Some(tag) => tag.clone(),
            None => {
                // The tag stays in the metadata so it reaches the server as
                // a query parameter.
                let tag = persistence.family().default_type_tag().to_string();
                metadata.insert(MODEL_TYPE_KEY.to_string(), tag.clone());
                tag
            }
        };

        let model_dir = staging::prepare_model_dir(&self.staging_root, model_id)?;
        persistence.save(ctx, &model_dir)?;

        let (built, reduced) =
            manifest::build_manifest(model_id, &model_type, model.class_name(), metadata)?;
        let manifest_path = manifest::write_manifest(&built, &model_dir)?;

        let mut metadata = reduced;
        if let Some(name) = manifest_path.file_name() {
            metadata.insert(
                manifest::MODEL_SPEC_KEY.to_string(),
                name.to_string_lossy().into_owned(),
            );
        }

        let archive_path = self.staging_root.join(format!("{}.zip", model_id));
        if archive_path.is_file() {
            fs::remove_file(&archive_path)?;
        }
        archive::zip_dir(&model_dir, &archive_path)?;

        upload::upload_model(&self.transport, &self.host, model_id, &archive_path, &metadata)?;

        info!(
            "Published model {} as {} to {}",
            model_id,
            archive_path.display(),
            self.host
        );
        Ok(PublishedModel {
            model_id: model_id.to_string(),
            model_dir,
            archive_path,
        })
    }
}

/// The model id doubles as a directory name and a URL path segment, so ids
/// that would escape either are rejected up front.
fn validate_model_id(model_id: &str) -> Result<()> {
    if model_id.is_empty() {
        return Err(PublishError::Config("model id must not be empty".to_string()));
    }
    if model_id == "." || model_id == ".." || model_id.contains('/') || model_id.contains('\\') {
        return Err(PublishError::Config(format!(
            "model id {:?} is not a valid path segment",
            model_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_validation() {
        assert!(validate_model_id("my-model_1.2").is_ok());
        assert!(validate_model_id("").is_err());
        assert!(validate_model_id(".").is_err());
        assert!(validate_model_id("..").is_err());
        assert!(validate_model_id("a/b").is_err());
        assert!(validate_model_id("a\\b").is_err());
    }
}
