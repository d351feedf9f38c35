use bytes::Bytes;
use derivative::Derivative;
use std::fs;
use std::path::Path;

use super::error::WorkflowError;

/// A file as handed over by the picker, before validation.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct RawFile {
    pub name: String,
    #[derivative(Debug = "ignore")]
    pub bytes: Bytes,
    pub media_type: Option<String>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn from_path(path: &Path) -> Result<Self, WorkflowError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| WorkflowError::validation(format!("invalid file name: {}", path.display())))?
            .to_string();

        let bytes = fs::read(path).map_err(|e| {
            WorkflowError::validation(format!("could not read {}: {}", path.display(), e))
        })?;

        Ok(Self::new(name, bytes))
    }
}

/// The validated photo a job was created from. Never changes after intake.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct SourceFile {
    pub name: String,
    pub media_type: String,
    #[derivative(Debug = "ignore")]
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("photo")
    }
}

/// Options a deployment lets the user pick before enhancing.
///
/// The controller never looks inside; it only asks for the multipart fields.
pub trait ProcessingOptions: Clone + Send + Sync + 'static {
    fn form_fields(&self) -> Vec<(&'static str, String)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhanceMode {
    #[default]
    Standard,
    Bracketed,
}

impl EnhanceMode {
    pub const ALL: [EnhanceMode; 2] = [EnhanceMode::Standard, EnhanceMode::Bracketed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Bracketed => "bracketed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Bracketed => "Bracketed HDR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    #[default]
    LocalCv,
    SwinIr,
    Both,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::LocalCv, Engine::SwinIr, Engine::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalCv => "localcv",
            Self::SwinIr => "swinir",
            Self::Both => "both",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LocalCv => "Local CV",
            Self::SwinIr => "SwinIR",
            Self::Both => "Both (AI + CV)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnhanceOptions {
    pub mode: EnhanceMode,
    pub engine: Engine,
}

impl ProcessingOptions for EnhanceOptions {
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("imageType", self.mode.as_str().to_string()),
            ("method", self.engine.as_str().to_string()),
        ]
    }
}

/// Enhanced image bytes returned directly by the service.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct ArtifactBlob {
    #[derivative(Debug = "ignore")]
    pub bytes: Bytes,
    pub media_type: String,
}

/// The enhanced image, however the service chose to hand it back.
#[derive(Debug, Clone, PartialEq)]
pub enum EnhancedResult {
    Url(String),
    Blob(ArtifactBlob),
}

impl EnhancedResult {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Blob(_) => "blob",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub redirect_url: String,
}

const MEDIA_TYPES: [(&str, &str); 8] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("gif", "image/gif"),
];

pub fn media_type_for(name: &str) -> String {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    MEDIA_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, media_type)| media_type.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

pub fn extension_for(media_type: &str) -> &'static str {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    MEDIA_TYPES
        .iter()
        .find(|(_, candidate)| candidate.eq_ignore_ascii_case(essence))
        .map(|(ext, _)| *ext)
        .unwrap_or("jpg")
}
