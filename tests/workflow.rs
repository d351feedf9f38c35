mod common;

use common::{config, controller, controller_with, photo, unreachable_base, SETTLE};
use mockito::{Matcher, Server};
use serde_json::json;
use speed_edit::upload::{
    preview_data_uri, EnhanceMode, EnhanceOptions, EnhancedResult, Engine, FileIntake,
    ProcessingOptions, WorkflowError, NO_PUBLIC_LOCATION,
};
use speed_edit::workflow::{CheckoutMode, DownloadState, JobStatus, WorkflowController};
use std::sync::Arc;

fn mock_enhance_url(server: &mut Server, path: &str) -> mockito::Mock {
    server
        .mock("POST", "/enhance")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "enhanced_url": path }).to_string())
        .create()
}

fn mock_checkout(server: &mut Server, image_url: &str, redirect: &str) -> mockito::Mock {
    server
        .mock("POST", "/payment/create-checkout")
        .match_body(Matcher::Json(json!({ "imageUrl": image_url })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "url": redirect }).to_string())
        .create()
}

#[test]
fn photo_goes_from_upload_to_payment_redirect() {
    let mut server = Server::new();
    let enhanced_url = format!("{}/out/1.jpg", server.url());
    let enhance = mock_enhance_url(&mut server, "/out/1.jpg");
    let checkout = mock_checkout(&mut server, &enhanced_url, "https://pay.example/session/abc");

    let mut workflow = controller(&server.url());
    assert_eq!(workflow.status(), JobStatus::Idle);

    assert_eq!(
        workflow.select_file(photo("photo.jpg", "jpeg")),
        Ok(JobStatus::PreviewReady)
    );
    assert!(workflow.start_enhancement());
    assert_eq!(workflow.status(), JobStatus::Enhancing);
    assert!(workflow.settle(SETTLE));

    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::Enhanced);
    assert_eq!(
        job.enhanced_artifact(),
        Some(&EnhancedResult::Url(enhanced_url.clone()))
    );
    assert_eq!(job.preview(), Some("data:image/jpeg;base64,anBlZw=="));

    assert!(workflow.start_checkout());
    assert_eq!(workflow.status(), JobStatus::CreatingCheckout);
    assert!(workflow.settle(SETTLE));

    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::Redirecting);
    assert_eq!(job.checkout_url(), Some("https://pay.example/session/abc"));
    assert_eq!(job.enhanced_artifact(), Some(&EnhancedResult::Url(enhanced_url)));
    assert!(job.error().is_none());

    enhance.assert();
    checkout.assert();
}

#[test]
fn selecting_a_new_file_clears_previous_results() {
    let mut server = Server::new();
    mock_enhance_url(&mut server, "/out/1.jpg");

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("first.jpg", "one")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    let first_generation = workflow.job().unwrap().generation();
    assert_eq!(workflow.status(), JobStatus::Enhanced);

    workflow.select_file(photo("second.jpg", "two")).unwrap();

    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::PreviewReady);
    assert_eq!(job.source().name, "second.jpg");
    assert!(job.generation() > first_generation);
    assert!(job.enhanced_artifact().is_none());
    assert!(job.checkout_url().is_none());
    assert!(job.error().is_none());
}

#[test]
fn missing_file_keeps_current_job() {
    let mut workflow = controller(&unreachable_base());

    assert_eq!(
        workflow.select_file(None),
        Err(WorkflowError::validation("no file selected"))
    );
    assert_eq!(workflow.status(), JobStatus::Idle);

    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    let generation = workflow.job().unwrap().generation();

    assert!(workflow.select_file(None).is_err());
    assert!(workflow.select_file(photo("notes.txt", "text")).is_err());

    let job = workflow.job().unwrap();
    assert_eq!(job.generation(), generation);
    assert_eq!(job.source().name, "photo.jpg");
    assert_eq!(job.status(), JobStatus::PreviewReady);
}

#[test]
fn checkout_is_only_offered_once_enhanced() {
    let mut server = Server::new();
    mock_enhance_url(&mut server, "/out/1.jpg");
    let checkout = server
        .mock("POST", "/payment/create-checkout")
        .expect(0)
        .create();

    let mut workflow = controller(&server.url());
    assert!(!workflow.start_checkout());

    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    assert!(!workflow.can_start_checkout());
    assert!(!workflow.start_checkout());
    assert_eq!(workflow.status(), JobStatus::PreviewReady);

    workflow.start_enhancement();
    assert!(!workflow.start_checkout());
    assert!(!workflow.start_enhancement());
    assert_eq!(workflow.status(), JobStatus::Enhancing);

    assert!(workflow.settle(SETTLE));
    assert!(workflow.can_start_checkout());
    checkout.assert();
}

#[test]
fn enhancement_needs_a_file() {
    let mut workflow = controller(&unreachable_base());
    assert!(!workflow.can_start_enhancement());
    assert!(!workflow.start_enhancement());
    assert_eq!(workflow.status(), JobStatus::Idle);
}

#[test]
fn every_reply_shape_reaches_enhanced() {
    let replies: [(&str, Vec<u8>); 3] = [
        ("application/json", br#"{"enhanced_url":"/out/1.jpg"}"#.to_vec()),
        ("application/json", br#"{"enhancedUrl":"https://cdn.example/1.jpg"}"#.to_vec()),
        ("image/jpeg", b"enhanced-bytes".to_vec()),
    ];

    for (content_type, body) in replies {
        let mut server = Server::new();
        server
            .mock("POST", "/enhance")
            .with_status(200)
            .with_header("content-type", content_type)
            .with_body(body)
            .create();

        let mut workflow = controller(&server.url());
        workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
        workflow.start_enhancement();
        assert!(workflow.settle(SETTLE));

        let job = workflow.job().unwrap();
        assert_eq!(job.status(), JobStatus::Enhanced, "reply {}", content_type);
        assert!(job.enhanced_artifact().is_some());
    }
}

#[test]
fn enhancement_rejection_fails_with_server_status() {
    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .with_status(503)
        .with_body("upstream unavailable")
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error().and_then(WorkflowError::status_code), Some(503));
    assert!(job.enhanced_artifact().is_none());
}

#[test]
fn checkout_rejection_fails_with_server_status() {
    let mut server = Server::new();
    mock_enhance_url(&mut server, "/out/1.jpg");
    server
        .mock("POST", "/payment/create-checkout")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Stripe is unavailable"}"#)
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    workflow.start_checkout();
    assert!(workflow.settle(SETTLE));

    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(
        job.error(),
        Some(&WorkflowError::Server {
            status: 500,
            message: Some("Stripe is unavailable".to_string())
        })
    );
    assert!(job.enhanced_artifact().is_none());
    assert!(job.checkout_url().is_none());
}

#[test]
fn empty_reply_fails_with_protocol_error() {
    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    assert_eq!(workflow.status(), JobStatus::Failed);
    assert_eq!(
        workflow.job().unwrap().error(),
        Some(&WorkflowError::protocol("missing enhanced result"))
    );
}

#[test]
fn unreachable_service_fails_with_network_error() {
    let mut workflow = controller(&unreachable_base());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    assert_eq!(workflow.status(), JobStatus::Failed);
    assert!(matches!(
        workflow.job().unwrap().error(),
        Some(WorkflowError::Network(_))
    ));
}

#[test]
fn result_of_superseded_job_is_discarded() {
    let mut server = Server::new();
    let first = server
        .mock("POST", "/enhance")
        .match_body(Matcher::Regex("first-photo".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enhanced_url":"/out/first.jpg"}"#)
        .expect(1)
        .create();
    let second = server
        .mock("POST", "/enhance")
        .match_body(Matcher::Regex("second-photo".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enhanced_url":"/out/second.jpg"}"#)
        .expect(1)
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("first.jpg", "first-photo")).unwrap();
    workflow.start_enhancement();
    workflow.select_file(photo("second.jpg", "second-photo")).unwrap();

    assert!(workflow.settle(SETTLE));
    first.assert();
    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::PreviewReady);
    assert_eq!(job.source().name, "second.jpg");
    assert!(job.enhanced_artifact().is_none());

    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    second.assert();
    assert_eq!(
        workflow.job().unwrap().enhanced_artifact(),
        Some(&EnhancedResult::Url(format!("{}/out/second.jpg", server.url())))
    );
}

#[test]
fn stale_result_never_lands_on_an_enhancing_job() {
    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .match_body(Matcher::Regex("first-photo".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enhanced_url":"/out/first.jpg"}"#)
        .create();
    server
        .mock("POST", "/enhance")
        .match_body(Matcher::Regex("second-photo".to_string()))
        .with_status(500)
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("first.jpg", "first-photo")).unwrap();
    workflow.start_enhancement();
    workflow.select_file(photo("second.jpg", "second-photo")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error().and_then(WorkflowError::status_code), Some(500));
}

#[test]
fn preview_of_superseded_job_is_discarded() {
    let mut workflow = controller(&unreachable_base());
    workflow.select_file(photo("first.png", "first")).unwrap();
    workflow.select_file(photo("second.png", "second")).unwrap();
    assert!(workflow.settle(SETTLE));

    let job = workflow.job().unwrap();
    assert_eq!(job.preview(), Some(preview_data_uri(job.source()).as_str()));
    assert_eq!(job.preview(), Some("data:image/png;base64,c2Vjb25k"));
}

#[test]
fn automatic_checkout_follows_enhancement() {
    let mut server = Server::new();
    let enhanced_url = format!("{}/out/1.jpg", server.url());
    mock_enhance_url(&mut server, "/out/1.jpg");
    let checkout = mock_checkout(&mut server, &enhanced_url, "https://pay.example/session/auto");

    let mut workflow = controller_with(config(&server.url(), CheckoutMode::Automatic));
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    checkout.assert();
    assert_eq!(workflow.status(), JobStatus::Redirecting);
    assert_eq!(
        workflow.job().unwrap().checkout_url(),
        Some("https://pay.example/session/auto")
    );
}

#[test]
fn disabled_checkout_stops_at_enhanced() {
    let mut server = Server::new();
    mock_enhance_url(&mut server, "/out/1.jpg");

    let mut workflow = controller_with(config(&server.url(), CheckoutMode::Disabled));
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    assert_eq!(workflow.status(), JobStatus::Enhanced);
    assert!(!workflow.can_start_checkout());
    assert!(!workflow.start_checkout());
    assert_eq!(workflow.status(), JobStatus::Enhanced);
}

fn mock_blob_enhance(server: &mut Server) -> mockito::Mock {
    server
        .mock("POST", "/enhance")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(b"PNGDATA".to_vec())
        .create()
}

#[test]
fn blob_is_published_before_checkout() {
    let mut server = Server::new();
    mock_blob_enhance(&mut server);
    let checkout = server
        .mock("POST", "/payment/create-checkout")
        .match_body(Matcher::Regex(
            r#"^\{"imageUrl":"https://static\.example/enhanced/[0-9a-f-]+\.png"\}$"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url":"https://pay.example/session/blob"}"#)
        .create();
    let dir = tempfile::tempdir().unwrap();

    let mut settings = config(&server.url(), CheckoutMode::Manual);
    settings.publish_dir = Some(dir.path().to_path_buf());
    settings.public_url = Some("https://static.example/enhanced/".to_string());
    let mut workflow = controller_with(settings);
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    assert_eq!(workflow.job().unwrap().enhanced_artifact().unwrap().kind(), "blob");

    workflow.start_checkout();
    assert!(workflow.settle(SETTLE));

    checkout.assert();
    assert_eq!(workflow.status(), JobStatus::Redirecting);
    let published: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(published.len(), 1);
    let path = published[0].as_ref().unwrap().path();
    assert_eq!(std::fs::read(path).unwrap(), b"PNGDATA");
}

#[test]
fn blob_checkout_needs_a_public_location() {
    let mut server = Server::new();
    mock_blob_enhance(&mut server);
    let checkout = server
        .mock("POST", "/payment/create-checkout")
        .expect(0)
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    assert!(workflow.start_checkout());
    assert!(workflow.settle(SETTLE));

    checkout.assert();
    assert_eq!(workflow.status(), JobStatus::Failed);
    assert_eq!(
        workflow.job().unwrap().error(),
        Some(&WorkflowError::Publish(NO_PUBLIC_LOCATION.to_string()))
    );
}

#[test]
fn failing_publisher_fails_the_job() {
    struct Unavailable;
    impl speed_edit::upload::ArtifactPublisher for Unavailable {
        fn publish(
            &self,
            _blob: &speed_edit::upload::ArtifactBlob,
        ) -> Result<String, WorkflowError> {
            Err(WorkflowError::Publish("bucket offline".to_string()))
        }
    }

    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(b"PNGDATA".to_vec())
        .create();
    let checkout = server
        .mock("POST", "/payment/create-checkout")
        .expect(0)
        .create();

    let mut workflow = controller(&server.url()).with_publisher(Arc::new(Unavailable));
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    workflow.start_checkout();
    assert!(workflow.settle(SETTLE));

    checkout.assert();
    assert_eq!(
        workflow.job().unwrap().error(),
        Some(&WorkflowError::Publish("bucket offline".to_string()))
    );
}

#[test]
fn enhanced_blob_is_saved_locally() {
    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(b"PNGDATA".to_vec())
        .create();
    let dir = tempfile::tempdir().unwrap();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("kitchen.jpg", "jpeg")).unwrap();
    assert!(!workflow.save_artifact(dir.path().to_path_buf()));

    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    assert!(workflow.save_artifact(dir.path().to_path_buf()));
    assert!(workflow.settle(SETTLE));

    let expected = dir.path().join("enhanced-kitchen.png");
    assert_eq!(
        workflow.job().unwrap().download(),
        &DownloadState::Saved(expected.clone())
    );
    assert_eq!(std::fs::read(expected).unwrap(), b"PNGDATA");
    assert_eq!(workflow.status(), JobStatus::Enhanced);
}

#[test]
fn enhanced_url_is_downloaded_and_saved() {
    let mut server = Server::new();
    mock_enhance_url(&mut server, "/out/1.jpg");
    server
        .mock("GET", "/out/1.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(b"ENHANCED".to_vec())
        .create();
    let dir = tempfile::tempdir().unwrap();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("porch.jpeg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    workflow.save_artifact(dir.path().to_path_buf());
    assert!(workflow.settle(SETTLE));

    assert_eq!(
        std::fs::read(dir.path().join("enhanced-porch.jpg")).unwrap(),
        b"ENHANCED"
    );
}

#[test]
fn download_is_refused_when_gated_behind_payment() {
    let mut server = Server::new();
    mock_enhance_url(&mut server, "/out/1.jpg");
    let dir = tempfile::tempdir().unwrap();

    let mut settings = config(&server.url(), CheckoutMode::Manual);
    settings.allow_download = false;
    let mut workflow = controller_with(settings);
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));

    assert!(!workflow.can_save_artifact());
    assert!(!workflow.save_artifact(dir.path().to_path_buf()));
    assert_eq!(workflow.job().unwrap().download(), &DownloadState::NotRequested);
}

#[test]
fn restart_after_failure_resubmits_same_photo_and_options() {
    let mut server = Server::new();
    let failing = server
        .mock("POST", "/enhance")
        .with_status(502)
        .expect(1)
        .create();

    let mut workflow = controller(&server.url());
    workflow.set_options(EnhanceOptions {
        mode: EnhanceMode::Bracketed,
        engine: Engine::Both,
    });
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    assert_eq!(workflow.status(), JobStatus::Failed);
    failing.assert();
    let failed_generation = workflow.job().unwrap().generation();

    server.reset();
    let retried = server
        .mock("POST", "/enhance")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="imageType"\r\n\r\nbracketed"#.to_string()),
            Matcher::Regex(r#"name="method"\r\n\r\nboth"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enhanced_url":"/out/retry.jpg"}"#)
        .create();

    assert!(workflow.restart());
    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::PreviewReady);
    assert!(job.generation() > failed_generation);
    assert!(job.error().is_none());

    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    retried.assert();
    assert_eq!(workflow.status(), JobStatus::Enhanced);
}

#[test]
fn options_only_change_a_job_that_has_not_started() {
    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enhanced_url":"/out/1.jpg"}"#)
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();

    let hdr = EnhanceOptions {
        mode: EnhanceMode::Bracketed,
        engine: Engine::LocalCv,
    };
    workflow.set_options(hdr);
    assert_eq!(workflow.job().unwrap().options(), &hdr);

    workflow.start_enhancement();
    workflow.set_options(EnhanceOptions::default());
    assert_eq!(workflow.job().unwrap().options(), &hdr);
    assert!(workflow.settle(SETTLE));
}

#[test]
fn custom_intake_patterns_apply() {
    let mut workflow = controller(&unreachable_base())
        .with_intake(FileIntake::with_patterns(&["*.png"]).unwrap());

    assert!(workflow.select_file(photo("photo.jpg", "jpeg")).is_err());
    assert_eq!(
        workflow.select_file(photo("photo.png", "png")),
        Ok(JobStatus::PreviewReady)
    );
}

#[test]
fn options_chosen_after_failure_apply_on_restart() {
    let mut server = Server::new();
    server
        .mock("POST", "/enhance")
        .match_body(Matcher::Regex(r#"name="imageType"\r\n\r\nstandard"#.to_string()))
        .with_status(502)
        .create();
    let retried = server
        .mock("POST", "/enhance")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="imageType"\r\n\r\nbracketed"#.to_string()),
            Matcher::Regex(r#"name="method"\r\n\r\nswinir"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enhanced_url":"/out/retry.jpg"}"#)
        .create();

    let mut workflow = controller(&server.url());
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    assert_eq!(workflow.status(), JobStatus::Failed);

    let chosen = EnhanceOptions {
        mode: EnhanceMode::Bracketed,
        engine: Engine::SwinIr,
    };
    workflow.set_options(chosen);
    assert!(workflow.restart());
    assert_eq!(workflow.options(), &chosen);
    assert_eq!(workflow.job().unwrap().options(), &chosen);

    workflow.start_enhancement();
    assert!(workflow.settle(SETTLE));
    retried.assert();
    assert_eq!(workflow.status(), JobStatus::Enhanced);
}

#[derive(Clone)]
struct BrokenOptions;

impl ProcessingOptions for BrokenOptions {
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        panic!("options could not be rendered");
    }
}

#[test]
fn panicking_enhancement_still_fails_the_job() {
    let mut server = Server::new();
    let enhance = server.mock("POST", "/enhance").expect(0).create();

    let mut workflow =
        WorkflowController::new(&config(&server.url(), CheckoutMode::Manual), BrokenOptions)
            .unwrap();
    workflow.select_file(photo("photo.jpg", "jpeg")).unwrap();
    assert!(workflow.start_enhancement());
    assert!(workflow.settle(SETTLE));

    enhance.assert();
    let job = workflow.job().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(matches!(
        job.error(),
        Some(WorkflowError::Protocol(cause)) if cause.starts_with("background task failed")
    ));
}
