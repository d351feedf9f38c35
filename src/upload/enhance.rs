use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::upload::error::WorkflowError;
use crate::upload::types::{
    media_type_for, ArtifactBlob, EnhancedResult, ProcessingOptions, SourceFile,
};

const MISSING_RESULT: &str = "missing enhanced result";

/// The JSON replies the enhancement backends are known to send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnhanceReply {
    /// `{ "enhanced_url": "/enhanced/abc.jpg" }`
    RelativePath { enhanced_url: String },
    /// `{ "enhancedUrl": "https://cdn.example/abc.jpg" }`
    AbsoluteUrl {
        #[serde(rename = "enhancedUrl")]
        enhanced_url: String,
    },
}

impl EnhanceReply {
    fn into_location(self) -> String {
        match self {
            Self::RelativePath { enhanced_url } | Self::AbsoluteUrl { enhanced_url } => {
                enhanced_url
            }
        }
    }
}

/// Talks to the enhancement service and hides which reply shape it used.
#[derive(Debug, Clone)]
pub struct EnhancementClient {
    http: Client,
    base_url: String,
    endpoint: String,
    file_field: String,
}

impl EnhancementClient {
    pub fn new(http: Client, base_url: &str, path: &str, file_field: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            endpoint: join_url(&base_url, path),
            base_url,
            http,
            file_field: file_field.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn submit<O: ProcessingOptions>(
        &self,
        source: &SourceFile,
        options: &O,
    ) -> Result<EnhancedResult, WorkflowError> {
        let part = Part::bytes(source.bytes.to_vec())
            .file_name(source.name.clone())
            .mime_str(&source.media_type)
            .map_err(|e| {
                WorkflowError::validation(format!(
                    "invalid media type {}: {}",
                    source.media_type, e
                ))
            })?;

        let mut form = Form::new().part(self.file_field.clone(), part);
        for (name, value) in options.form_fields() {
            form = form.text(name, value);
        }

        info!(endpoint = %self.endpoint, file = %source.name, size = source.size(), "submitting photo for enhancement");

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let content_type = header_value(&response);
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "enhancement request rejected");
            return Err(WorkflowError::from_response(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        let result = normalize(&self.base_url, content_type.as_deref(), body)?;
        debug!(kind = result.kind(), "enhancement response normalized");
        Ok(result)
    }

    /// Downloads a URL artifact so it can be saved locally.
    pub async fn fetch_artifact(&self, url: &str) -> Result<ArtifactBlob, WorkflowError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let content_type = header_value(&response);
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(WorkflowError::from_response(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }
        if body.is_empty() {
            return Err(WorkflowError::protocol("empty enhanced image"));
        }

        let media_type = content_type
            .filter(|ct| !is_json(ct))
            .unwrap_or_else(|| media_type_for(url_path(url)));

        Ok(ArtifactBlob {
            bytes: body,
            media_type,
        })
    }
}

fn header_value(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
}

fn is_text(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("text/"))
}

fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Maps any of the known reply shapes onto one `EnhancedResult`.
pub(crate) fn normalize(
    base_url: &str,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<EnhancedResult, WorkflowError> {
    match content_type {
        Some(ct) if is_json(ct) => from_json(base_url, &body),
        Some(ct) if is_text(ct) => {
            Err(WorkflowError::protocol(MISSING_RESULT))
        }
        Some(ct) => from_binary(ct, body),
        None if looks_like_json_object(&body) => from_json(base_url, &body),
        None => from_binary("application/octet-stream", body),
    }
}

fn looks_like_json_object(body: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<serde_json::Value>(body),
        Ok(serde_json::Value::Object(_))
    )
}

fn from_json(base_url: &str, body: &[u8]) -> Result<EnhancedResult, WorkflowError> {
    let reply: EnhanceReply =
        serde_json::from_slice(body).map_err(|_| WorkflowError::protocol(MISSING_RESULT))?;
    resolve(base_url, &reply.into_location()).map(EnhancedResult::Url)
}

fn from_binary(content_type: &str, body: Bytes) -> Result<EnhancedResult, WorkflowError> {
    if body.is_empty() {
        return Err(WorkflowError::protocol(MISSING_RESULT));
    }
    Ok(EnhancedResult::Blob(ArtifactBlob {
        bytes: body,
        media_type: content_type.to_string(),
    }))
}

fn resolve(base_url: &str, location: &str) -> Result<String, WorkflowError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(WorkflowError::protocol(MISSING_RESULT));
    }

    // Protocol-relative locations keep the base's scheme.
    if location.starts_with("//") {
        let base = Url::parse(base_url).map_err(|_| WorkflowError::protocol(MISSING_RESULT))?;
        return Url::parse(&format!("{}:{}", base.scheme(), location))
            .ok()
            .filter(|url| url.host().is_some())
            .map(String::from)
            .ok_or_else(|| WorkflowError::protocol(MISSING_RESULT));
    }

    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {
            Ok(location.to_string())
        }
        Ok(_) => Err(WorkflowError::protocol(MISSING_RESULT)),
        Err(_) => Ok(join_url(base_url, location)),
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
