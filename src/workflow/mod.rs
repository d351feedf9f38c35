mod controller;
mod job;
mod policy;

pub use controller::WorkflowController;
pub use job::{DownloadState, JobStatus, UploadJob};
pub use policy::{CheckoutMode, WorkflowPolicy};
