use std::path::Path;

use log::info;
use url::Url;

use crate::error::{PublishError, Result};
use crate::host::FusionHost;
use crate::manifest::Metadata;
use crate::transport::{Transport, UploadRequest};

/// Media type of the model archive body.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

const BLOB_API_PATH: &str = "/api/apollo/blobs";

/// Build the blob-store URL for `model_id`, attaching every remaining
/// metadata entry as a percent-encoded query parameter in map order.
pub fn blob_url(host: &FusionHost, model_id: &str, metadata: &Metadata) -> Result<Url> {
    let base = format!(
        "http://{}:{}{}/{}",
        host.host, host.port, BLOB_API_PATH, model_id
    );
    let mut url = Url::parse(&base)
        .map_err(|e| PublishError::Config(format!("invalid upload URL {}: {}", base, e)))?;
    if !metadata.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in metadata {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Hand the archived model to the transport for delivery. Transport
/// failures surface unchanged; there is no retry here.
pub(crate) fn upload_model<T: Transport>(
    transport: &T,
    host: &FusionHost,
    model_id: &str,
    archive: &Path,
    metadata: &Metadata,
) -> Result<()> {
    let request = UploadRequest {
        url: blob_url(host, model_id, metadata)?,
        content_type: ARCHIVE_CONTENT_TYPE,
        body_path: archive.to_path_buf(),
    };
    info!("Uploading {} to {}", archive.display(), request.url);
    transport.send(&request)?;
    Ok(())
}
