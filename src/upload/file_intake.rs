use base64::Engine as _;
use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::upload::error::WorkflowError;
use crate::upload::types::{media_type_for, RawFile, SourceFile};

pub const DEFAULT_ACCEPTED: [&str; 7] = [
    "*.jpg", "*.jpeg", "*.png", "*.webp", "*.heic", "*.tif", "*.tiff",
];

/// Checks picked files before they become a job. Purely local.
#[derive(Debug, Clone)]
pub struct FileIntake {
    accepted: Vec<Pattern>,
}

impl Default for FileIntake {
    fn default() -> Self {
        Self {
            accepted: DEFAULT_ACCEPTED
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

impl FileIntake {
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, WorkflowError> {
        let accepted = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| {
                    WorkflowError::validation(format!("invalid file pattern '{}': {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { accepted })
    }

    /// Extensions the picker dialog should offer, derived from the patterns.
    pub fn extensions(&self) -> Vec<String> {
        self.accepted
            .iter()
            .filter_map(|p| p.as_str().strip_prefix("*."))
            .map(str::to_string)
            .collect()
    }

    pub fn select(&self, raw: Option<RawFile>) -> Result<SourceFile, WorkflowError> {
        let raw = raw.ok_or_else(|| WorkflowError::validation("no file selected"))?;

        if raw.bytes.is_empty() {
            return Err(WorkflowError::validation("file is empty"));
        }

        if !self.is_supported(&raw.name) {
            return Err(WorkflowError::validation(format!(
                "unsupported file type: {}",
                raw.name
            )));
        }

        let media_type = raw
            .media_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| media_type_for(&raw.name));

        debug!(name = %raw.name, %media_type, size = raw.bytes.len(), "file accepted");

        Ok(SourceFile {
            name: raw.name,
            media_type,
            bytes: raw.bytes,
        })
    }

    fn is_supported(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.accepted.iter().any(|p| p.matches_with(name, options))
    }
}

/// Renders the original photo as a `data:` URI the view can display.
pub fn preview_data_uri(source: &SourceFile) -> String {
    format!(
        "data:{};base64,{}",
        source.media_type,
        base64::engine::general_purpose::STANDARD.encode(&source.bytes)
    )
}
