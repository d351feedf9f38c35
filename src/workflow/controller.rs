use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use super::job::{DownloadState, JobStatus, Stage, UploadJob};
use super::policy::{CheckoutMode, WorkflowPolicy};
use crate::config::AppConfig;
use crate::upload::{
    extension_for, preview_data_uri, ArtifactPublisher, CheckoutClient, CheckoutSession,
    EnhancedResult, EnhancementClient, FileIntake, ProcessingOptions, RawFile, SourceFile,
    WorkflowError,
};

enum Outcome {
    Preview(Option<String>),
    Enhanced(Result<EnhancedResult, WorkflowError>),
    Checkout(Result<CheckoutSession, WorkflowError>),
    Download(Result<PathBuf, WorkflowError>),
}

/// A finished piece of background work, tagged with the job it was started for.
struct Completion {
    generation: u64,
    outcome: Outcome,
}

/// Drives one upload job at a time through intake, enhancement and checkout.
///
/// Network calls run on a private runtime; their results queue up until the
/// owner calls [`poll`](Self::poll) or [`settle`](Self::settle). Results that
/// belong to a job which has since been replaced are dropped.
pub struct WorkflowController<O: ProcessingOptions> {
    runtime: Runtime,
    intake: FileIntake,
    enhancer: EnhancementClient,
    checkout: CheckoutClient,
    publisher: Arc<dyn ArtifactPublisher>,
    policy: WorkflowPolicy,
    options: O,
    job: Option<UploadJob<O>>,
    generation: u64,
    in_flight: usize,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl<O: ProcessingOptions> WorkflowController<O> {
    pub fn new(config: &AppConfig, options: O) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("speed-edit-io")
            .enable_all()
            .build()
            .context("Failed to start the background runtime")?;

        let http = config.http_client()?;
        let (sender, receiver) = channel();

        Ok(Self {
            runtime,
            intake: FileIntake::default(),
            enhancer: EnhancementClient::new(
                http.clone(),
                &config.base_url,
                &config.enhance_path,
                &config.file_field,
            ),
            checkout: CheckoutClient::new(http, &config.base_url, &config.checkout_path),
            publisher: config.publisher(),
            policy: config.policy(),
            options,
            job: None,
            generation: 0,
            in_flight: 0,
            sender,
            receiver,
        })
    }

    pub fn with_intake(mut self, intake: FileIntake) -> Self {
        self.intake = intake;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn ArtifactPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    pub fn job(&self) -> Option<&UploadJob<O>> {
        self.job.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.job
            .as_ref()
            .map_or(JobStatus::Idle, |job| job.status())
    }

    pub fn options(&self) -> &O {
        &self.options
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.status(),
            JobStatus::Enhancing | JobStatus::CreatingCheckout
        )
    }

    pub fn can_start_enhancement(&self) -> bool {
        self.status() == JobStatus::PreviewReady
    }

    pub fn can_start_checkout(&self) -> bool {
        self.policy.offers_checkout() && self.status() == JobStatus::Enhanced
    }

    pub fn can_save_artifact(&self) -> bool {
        self.policy.allow_download
            && self.job.as_ref().is_some_and(|job| {
                job.enhanced_artifact().is_some() && *job.download() != DownloadState::Saving
            })
    }

    /// Starts a new job from a picked file. A rejected file leaves the
    /// current job exactly as it was.
    pub fn select_file(&mut self, raw: Option<RawFile>) -> Result<JobStatus, WorkflowError> {
        let source = self.intake.select(raw).map_err(|err| {
            warn!(error = %err, "file rejected");
            err
        })?;
        self.begin_job(source);
        Ok(self.status())
    }

    /// Re-selects the current job's file as a fresh job, using the options
    /// currently chosen on the controller.
    pub fn restart(&mut self) -> bool {
        let Some(job) = self.job.as_ref() else {
            return false;
        };
        let source = job.source().clone();
        self.begin_job(source);
        true
    }

    pub fn set_options(&mut self, options: O) {
        if let Some(job) = self.job.as_mut() {
            if job.status() == JobStatus::PreviewReady {
                job.set_options(options.clone());
            }
        }
        self.options = options;
    }

    pub fn start_enhancement(&mut self) -> bool {
        let (generation, source, options) = match self.job.as_mut() {
            Some(job) if job.status() == JobStatus::PreviewReady => {
                job.advance(Stage::Enhancing);
                (job.generation(), job.source().clone(), job.options().clone())
            }
            _ => {
                debug!(status = %self.status(), "enhancement not available");
                return false;
            }
        };

        info!(generation, file = %source.name, "enhancement started");
        let client = self.enhancer.clone();
        self.spawn(
            generation,
            async move { Outcome::Enhanced(client.submit(&source, &options).await) },
            |err| Outcome::Enhanced(Err(err)),
        );
        true
    }

    pub fn start_checkout(&mut self) -> bool {
        if !self.policy.offers_checkout() {
            debug!("checkout disabled by policy");
            return false;
        }

        let (generation, artifact) = match self.job.as_mut() {
            Some(job) => match &job.stage {
                Stage::Enhanced(artifact) => {
                    let artifact = artifact.clone();
                    job.advance(Stage::CreatingCheckout(artifact.clone()));
                    (job.generation(), artifact)
                }
                _ => {
                    debug!(status = %job.status(), "checkout not available");
                    return false;
                }
            },
            None => return false,
        };

        info!(generation, kind = artifact.kind(), "checkout started");
        let client = self.checkout.clone();
        let publisher = Arc::clone(&self.publisher);
        self.spawn(
            generation,
            async move { Outcome::Checkout(publish_and_checkout(client, publisher, artifact).await) },
            |err| Outcome::Checkout(Err(err)),
        );
        true
    }

    /// Writes the enhanced image into `dir` as `enhanced-<name>.<ext>`.
    pub fn save_artifact(&mut self, dir: PathBuf) -> bool {
        if !self.can_save_artifact() {
            return false;
        }
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        let Some(artifact) = job.enhanced_artifact().cloned() else {
            return false;
        };

        job.download = DownloadState::Saving;
        let generation = job.generation();
        let stem = job.source().stem().to_string();
        let client = self.enhancer.clone();

        self.spawn(
            generation,
            async move { Outcome::Download(save_to_dir(client, artifact, dir, stem).await) },
            |err| Outcome::Download(Err(err)),
        );
        true
    }

    /// Applies every result that has arrived so far without blocking.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Blocks until no background work is left or `timeout` elapses.
    /// Returns `false` on timeout.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) => self.apply(completion),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false
                }
            }
        }
        true
    }

    fn begin_job(&mut self, source: SourceFile) {
        self.generation += 1;
        let generation = self.generation;

        if let Some(previous) = self.job.as_ref() {
            debug!(
                previous = previous.generation(),
                status = %previous.status(),
                "job superseded"
            );
        }

        let job = UploadJob::new(generation, source.clone(), self.options.clone());
        info!(generation, job_id = %job.id(), file = %source.name, "job created");
        self.job = Some(job);

        self.spawn(
            generation,
            async move {
                let preview = tokio::task::spawn_blocking(move || preview_data_uri(&source))
                    .await
                    .ok();
                Outcome::Preview(preview)
            },
            |_| Outcome::Preview(None),
        );
    }

    /// Runs `task` in the background. A panicking task still completes,
    /// with the outcome `on_abort` builds from the panic.
    fn spawn<F>(&mut self, generation: u64, task: F, on_abort: fn(WorkflowError) -> Outcome)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.in_flight += 1;
        let handle = self.runtime.spawn(task);
        self.runtime.spawn(async move {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(generation, error = %err, "background task aborted");
                    on_abort(WorkflowError::protocol(format!(
                        "background task failed: {}",
                        err
                    )))
                }
            };
            let _ = sender.send(Completion {
                generation,
                outcome,
            });
        });
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let Some(job) = self.job.as_mut() else {
            return;
        };
        if job.generation() != completion.generation {
            debug!(
                stale = completion.generation,
                current = job.generation(),
                "discarding result of superseded job"
            );
            return;
        }

        let mut follow_with_checkout = false;
        match completion.outcome {
            Outcome::Preview(Some(preview)) => job.set_preview(preview),
            Outcome::Preview(None) => warn!(generation = job.generation(), "preview could not be rendered"),
            Outcome::Enhanced(result) => {
                if job.status() != JobStatus::Enhancing {
                    warn!(status = %job.status(), "enhancement result arrived out of order");
                    return;
                }
                match result {
                    Ok(artifact) => {
                        info!(generation = job.generation(), kind = artifact.kind(), "photo enhanced");
                        job.advance(Stage::Enhanced(artifact));
                        follow_with_checkout = self.policy.checkout == CheckoutMode::Automatic;
                    }
                    Err(err) => {
                        warn!(generation = job.generation(), error = %err, "enhancement failed");
                        job.advance(Stage::Failed(err));
                    }
                }
            }
            Outcome::Checkout(result) => {
                let artifact = match &job.stage {
                    Stage::CreatingCheckout(artifact) => artifact.clone(),
                    _ => {
                        warn!(status = %job.status(), "checkout result arrived out of order");
                        return;
                    }
                };
                match result {
                    Ok(session) => {
                        info!(generation = job.generation(), url = %session.redirect_url, "checkout session created");
                        job.advance(Stage::Redirecting {
                            artifact,
                            checkout_url: session.redirect_url,
                        });
                    }
                    Err(err) => {
                        warn!(generation = job.generation(), error = %err, "checkout failed");
                        job.advance(Stage::Failed(err));
                    }
                }
            }
            Outcome::Download(result) => {
                job.download = match result {
                    Ok(path) => {
                        info!(path = %path.display(), "enhanced image saved");
                        DownloadState::Saved(path)
                    }
                    Err(err) => {
                        warn!(error = %err, "saving enhanced image failed");
                        DownloadState::Failed(err)
                    }
                };
            }
        }

        if follow_with_checkout {
            self.start_checkout();
        }
    }
}

async fn publish_and_checkout(
    client: CheckoutClient,
    publisher: Arc<dyn ArtifactPublisher>,
    artifact: EnhancedResult,
) -> Result<CheckoutSession, WorkflowError> {
    let reference = match artifact {
        EnhancedResult::Url(url) => url,
        EnhancedResult::Blob(blob) => tokio::task::spawn_blocking(move || publisher.publish(&blob))
            .await
            .map_err(|e| WorkflowError::Publish(e.to_string()))??,
    };
    client.create_session(&reference).await
}

async fn save_to_dir(
    client: EnhancementClient,
    artifact: EnhancedResult,
    dir: PathBuf,
    stem: String,
) -> Result<PathBuf, WorkflowError> {
    let blob = match artifact {
        EnhancedResult::Blob(blob) => blob,
        EnhancedResult::Url(url) => client.fetch_artifact(&url).await?,
    };

    let path = dir.join(format!(
        "enhanced-{}.{}",
        stem,
        extension_for(&blob.media_type)
    ));
    tokio::fs::write(&path, &blob.bytes)
        .await
        .map_err(|e| WorkflowError::Io(e.to_string()))?;
    Ok(path)
}
