mod checkout;
mod enhance;
mod error;
mod file_intake;
mod publish;
mod types;

pub use checkout::CheckoutClient;
pub use enhance::EnhancementClient;
pub use error::WorkflowError;
pub use file_intake::{preview_data_uri, FileIntake, DEFAULT_ACCEPTED};
pub use publish::{ArtifactPublisher, DirectoryPublisher, UnconfiguredPublisher, NO_PUBLIC_LOCATION};
pub use types::{
    extension_for, media_type_for, ArtifactBlob, CheckoutSession, EnhanceMode, EnhanceOptions,
    EnhancedResult, Engine, ProcessingOptions, RawFile, SourceFile,
};
