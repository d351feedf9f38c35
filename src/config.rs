//! Process-wide settings, read once at start-up.
//!
//! Values come from `SPEED_EDIT_*` environment variables; a `.env` file in the
//! working directory is loaded first when present.

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::upload::{ArtifactPublisher, DirectoryPublisher, UnconfiguredPublisher};
use crate::workflow::{CheckoutMode, WorkflowPolicy};

pub const ENV_PREFIX: &str = "SPEED_EDIT_";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment address shared by the enhance and checkout endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_enhance_path")]
    pub enhance_path: String,

    #[serde(default = "default_checkout_path")]
    pub checkout_path: String,

    /// Multipart field carrying the photo (`file` or `image` depending on backend).
    #[serde(default = "default_file_field")]
    pub file_field: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub checkout_mode: CheckoutMode,

    #[serde(default = "default_allow_download")]
    pub allow_download: bool,

    /// Directory enhanced blobs are written to before checkout. Requires
    /// `public_url`.
    pub publish_dir: Option<PathBuf>,

    /// Address the checkout service can fetch `publish_dir` from.
    pub public_url: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_enhance_path() -> String {
    "/enhance".to_string()
}

fn default_checkout_path() -> String {
    "/payment/create-checkout".to_string()
}

fn default_file_field() -> String {
    "file".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_allow_download() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            enhance_path: default_enhance_path(),
            checkout_path: default_checkout_path(),
            file_field: default_file_field(),
            request_timeout_secs: default_timeout_secs(),
            checkout_mode: CheckoutMode::default(),
            allow_download: default_allow_download(),
            publish_dir: None,
            public_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: AppConfig = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("Failed to read SPEED_EDIT_* settings")?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("Base URL must be http or https: {}", self.base_url);
        }

        for (name, path) in [
            ("enhance path", &self.enhance_path),
            ("checkout path", &self.checkout_path),
        ] {
            if !path.starts_with('/') {
                bail!("The {} must start with '/': {}", name, path);
            }
        }

        if self.file_field.trim().is_empty() {
            bail!("The file field name must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("The request timeout must be at least one second");
        }

        match (&self.publish_dir, &self.public_url) {
            (Some(_), None) => bail!("A publish directory needs a public URL"),
            (None, Some(_)) => bail!("A public URL needs a publish directory"),
            (_, Some(public_url)) => {
                let url = Url::parse(public_url)
                    .with_context(|| format!("Invalid public URL: {}", public_url))?;
                if !matches!(url.scheme(), "http" | "https") {
                    bail!("Public URL must be http or https: {}", public_url);
                }
            }
            (None, None) => {}
        }
        Ok(())
    }

    pub fn policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            checkout: self.checkout_mode,
            allow_download: self.allow_download,
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")
    }

    pub fn publisher(&self) -> Arc<dyn ArtifactPublisher> {
        match (&self.publish_dir, &self.public_url) {
            (Some(dir), Some(public_url)) => {
                Arc::new(DirectoryPublisher::new(dir.clone(), public_url.clone()))
            }
            _ => Arc::new(UnconfiguredPublisher),
        }
    }
}
