use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::upload::enhance::join_url;
use crate::upload::error::WorkflowError;
use crate::upload::types::CheckoutSession;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    image_url: &'a str,
}

#[derive(Deserialize)]
struct CheckoutReply {
    url: Option<String>,
}

/// Asks the checkout service for a hosted payment page.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    http: Client,
    endpoint: String,
}

impl CheckoutClient {
    pub fn new(http: Client, base_url: &str, path: &str) -> Self {
        Self {
            http,
            endpoint: join_url(base_url, path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `artifact_reference` must already be addressable by the service.
    pub async fn create_session(
        &self,
        artifact_reference: &str,
    ) -> Result<CheckoutSession, WorkflowError> {
        info!(endpoint = %self.endpoint, "creating checkout session");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&CheckoutRequest {
                image_url: artifact_reference,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "checkout request rejected");
            return Err(WorkflowError::from_response(status.as_u16(), &body));
        }

        let redirect_url = serde_json::from_str::<CheckoutReply>(&body)
            .ok()
            .and_then(|reply| reply.url)
            .filter(|url| is_redirect_target(url))
            .ok_or_else(|| WorkflowError::protocol("missing checkout url"))?;

        Ok(CheckoutSession { redirect_url })
    }
}

fn is_redirect_target(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
