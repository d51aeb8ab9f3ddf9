//! Packaging and publishing of trained ML models to a Fusion blob store.
//!
//! A publish runs one model through a linear, blocking pipeline:
//!
//! 1. stage a fresh directory for the model id, moving any previous staging
//!    directory aside with a timestamp suffix;
//! 2. let the model persist itself into the directory through one of two
//!    capabilities (legacy context-bound or modern overwrite-style);
//! 3. build a structured manifest from the flat metadata and write it next
//!    to the model's own files as `<modelType>.json`;
//! 4. zip the staged directory;
//! 5. PUT the archive to `/api/apollo/blobs/<model id>` with the remaining
//!    metadata as query parameters, through an authenticated session.
//!
//! The staged directory and the archive are left on disk after the upload
//! as an audit trail.

pub mod archive;
pub mod error;
pub mod host;
pub mod manifest;
pub mod model;
pub mod publisher;
pub mod staging;
pub mod transport;
pub mod upload;

pub use error::{PublishError, Result};
pub use host::FusionHost;
pub use manifest::{HashingTf, Manifest, Metadata, VectorizerStep};
pub use model::{LegacyPersistence, MlModel, ModelFamily, VersionedPersistence};
pub use publisher::{ModelPublisher, PublishedModel};
pub use transport::{Credentials, SessionClient, Transport, TransportError, UploadRequest};
