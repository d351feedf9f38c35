//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use speed_edit::config::AppConfig;
use speed_edit::upload::{EnhanceOptions, RawFile};
use speed_edit::workflow::{CheckoutMode, WorkflowController};
use std::time::Duration;

pub const SETTLE: Duration = Duration::from_secs(10);

pub fn config(base_url: &str, checkout_mode: CheckoutMode) -> AppConfig {
    AppConfig {
        checkout_mode,
        request_timeout_secs: 5,
        ..AppConfig::with_base_url(base_url)
    }
}

pub fn controller(base_url: &str) -> WorkflowController<EnhanceOptions> {
    controller_with(config(base_url, CheckoutMode::Manual))
}

pub fn controller_with(config: AppConfig) -> WorkflowController<EnhanceOptions> {
    WorkflowController::new(&config, EnhanceOptions::default()).expect("controller")
}

pub fn photo(name: &str, contents: &str) -> Option<RawFile> {
    Some(RawFile::new(name, contents.as_bytes().to_vec()))
}

/// An address nothing listens on.
pub fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
