use std::fs;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::upload::enhance::join_url;
use crate::upload::error::WorkflowError;
use crate::upload::types::{extension_for, ArtifactBlob};

pub const NO_PUBLIC_LOCATION: &str = "no public location configured for enhanced images";

/// Turns enhanced bytes into a URL the checkout service can fetch.
pub trait ArtifactPublisher: Send + Sync {
    fn publish(&self, blob: &ArtifactBlob) -> Result<String, WorkflowError>;
}

/// Used when no public location is configured; every blob is refused.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredPublisher;

impl ArtifactPublisher for UnconfiguredPublisher {
    fn publish(&self, _blob: &ArtifactBlob) -> Result<String, WorkflowError> {
        Err(WorkflowError::Publish(NO_PUBLIC_LOCATION.to_string()))
    }
}

/// Writes the image into a directory served at `public_url`.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    dir: PathBuf,
    public_url: String,
}

impl DirectoryPublisher {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into(),
        }
    }
}

impl ArtifactPublisher for DirectoryPublisher {
    fn publish(&self, blob: &ArtifactBlob) -> Result<String, WorkflowError> {
        fs::create_dir_all(&self.dir).map_err(|e| WorkflowError::Publish(e.to_string()))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(&blob.media_type));
        let path = self.dir.join(&file_name);
        fs::write(&path, &blob.bytes).map_err(|e| WorkflowError::Publish(e.to_string()))?;
        debug!(path = %path.display(), "published enhanced image");

        Ok(join_url(&self.public_url, &file_name))
    }
}
