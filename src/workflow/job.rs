use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::upload::{EnhancedResult, SourceFile, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Idle,
    PreviewReady,
    Enhancing,
    Enhanced,
    CreatingCheckout,
    Redirecting,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PreviewReady => "preview-ready",
            Self::Enhancing => "enhancing",
            Self::Enhanced => "enhanced",
            Self::CreatingCheckout => "creating-checkout",
            Self::Redirecting => "redirecting",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Status plus whatever data only exists in that status.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stage {
    PreviewReady,
    Enhancing,
    Enhanced(EnhancedResult),
    CreatingCheckout(EnhancedResult),
    Redirecting {
        artifact: EnhancedResult,
        checkout_url: String,
    },
    Failed(WorkflowError),
}

impl Stage {
    fn status(&self) -> JobStatus {
        match self {
            Self::PreviewReady => JobStatus::PreviewReady,
            Self::Enhancing => JobStatus::Enhancing,
            Self::Enhanced(_) => JobStatus::Enhanced,
            Self::CreatingCheckout(_) => JobStatus::CreatingCheckout,
            Self::Redirecting { .. } => JobStatus::Redirecting,
            Self::Failed(_) => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadState {
    NotRequested,
    Saving,
    Saved(PathBuf),
    Failed(WorkflowError),
}

/// One submission attempt, from file selection until it is replaced.
#[derive(Debug, Clone)]
pub struct UploadJob<O> {
    id: Uuid,
    generation: u64,
    source: SourceFile,
    preview: Option<String>,
    options: O,
    pub(crate) stage: Stage,
    pub(crate) download: DownloadState,
}

impl<O> UploadJob<O> {
    pub(crate) fn new(generation: u64, source: SourceFile, options: O) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            source,
            preview: None,
            options,
            stage: Stage::PreviewReady,
            download: DownloadState::NotRequested,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn options(&self) -> &O {
        &self.options
    }

    pub fn status(&self) -> JobStatus {
        self.stage.status()
    }

    pub fn enhanced_artifact(&self) -> Option<&EnhancedResult> {
        match &self.stage {
            Stage::Enhanced(artifact)
            | Stage::CreatingCheckout(artifact)
            | Stage::Redirecting { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    pub fn checkout_url(&self) -> Option<&str> {
        match &self.stage {
            Stage::Redirecting { checkout_url, .. } => Some(checkout_url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match &self.stage {
            Stage::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn download(&self) -> &DownloadState {
        &self.download
    }

    pub(crate) fn set_preview(&mut self, preview: String) {
        self.preview = Some(preview);
    }

    pub(crate) fn set_options(&mut self, options: O) {
        self.options = options;
    }

    pub(crate) fn advance(&mut self, next: Stage) {
        self.stage = next;
    }
}
