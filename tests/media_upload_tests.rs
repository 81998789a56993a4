// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Certificate upload and doctor application submission tests.

use curapets::error::ClientError;
use curapets::models::{ApplicationForm, LocalFile};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

mod common;
use common::create_test_app;

const TOKEN: &str = "access-token";

/// Matches requests that carry no `Authorization` header.
struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn bio() -> String {
    "Companion animal vet with ten years of clinical practice in Lagos and Accra.".to_string()
}

fn pdf(name: &str) -> LocalFile {
    LocalFile::new(name, "application/pdf", b"%PDF-1.7 test".to_vec())
}

async fn mount_signature(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/generate-cloudinary-signature/"))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signature": "sig-123",
            "timestamp": 1767225600,
            "api_key": "key-1",
            "cloud_name": "curapets"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_upload_then_submit_application() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);
    mount_signature(&server).await;

    let remote = format!("{}/media/curapets/doctor_certificates/license.pdf", server.uri());

    Mock::given(method("POST"))
        .and(path("/media/v1_1/curapets/auto/upload"))
        .and(NoAuthorization)
        .and(body_string_contains("sig-123"))
        .and(body_string_contains("doctor_certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "secure_url": remote })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/applications/"))
        .and(header("authorization", "Bearer access-token"))
        .and(body_string_contains("name=\"certificates[]\""))
        .and(body_string_contains(remote.as_str()))
        .and(body_string_contains("Dermatologist"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let certificates = t
        .app
        .media
        .upload_certificates(TOKEN, 0, &[pdf("license.pdf")])
        .await
        .unwrap();

    assert_eq!(certificates.len(), 1);
    assert_eq!(certificates[0].remote_url, remote);
    assert_eq!(certificates[0].original_name, "license.pdf");
    assert!(!certificates[0].is_image());

    let mut form = ApplicationForm::new(&bio(), "Dermatologist");
    for certificate in certificates {
        form.add_certificate(certificate);
    }
    t.app.media.submit_application(TOKEN, &form).await.unwrap();
}

#[tokio::test]
async fn test_rejected_upload_blocks_submission() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);
    mount_signature(&server).await;

    Mock::given(method("POST"))
        .and(path("/media/v1_1/curapets/auto/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid Signature sig-123" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/applications/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = t
        .app
        .media
        .upload_certificates(TOKEN, 0, &[pdf("license.pdf"), pdf("degree.pdf")])
        .await
        .unwrap_err();

    // A media host 401 is an upload failure, not a session failure
    match err {
        ClientError::Upload(message) => assert!(message.contains("Invalid Signature")),
        other => panic!("expected upload error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_outside_media_host_is_rejected() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);
    mount_signature(&server).await;

    Mock::given(method("POST"))
        .and(path("/media/v1_1/curapets/auto/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://elsewhere.example/127.0.0.1/license.pdf"
        })))
        .mount(&server)
        .await;

    let err = t
        .app
        .media
        .upload_certificates(TOKEN, 0, &[pdf("license.pdf")])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Upload(_)));
}

#[tokio::test]
async fn test_bad_files_are_rejected_before_upload() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    let exe = LocalFile::new("setup.exe", "application/octet-stream", vec![0; 16]);
    let err = t
        .app
        .media
        .upload_certificates(TOKEN, 0, &[pdf("license.pdf"), exe])
        .await
        .unwrap_err();
    match err {
        ClientError::Validation(errors) => assert!(errors["certificates"].contains("setup.exe")),
        other => panic!("expected validation error, got {:?}", other),
    }

    let too_many: Vec<LocalFile> = (0..3).map(|i| pdf(&format!("c{}.pdf", i))).collect();
    let err = t
        .app
        .media
        .upload_certificates(TOKEN, 3, &too_many)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_submission_after_upload_returns_error() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);
    mount_signature(&server).await;

    let remote = format!("{}/media/curapets/license.pdf", server.uri());
    Mock::given(method("POST"))
        .and(path("/media/v1_1/curapets/auto/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "secure_url": remote })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/applications/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!(["You already have a pending application."])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut form = ApplicationForm::new(&bio(), "Pediatrician");
    for certificate in t
        .app
        .media
        .upload_certificates(TOKEN, 0, &[pdf("license.pdf")])
        .await
        .unwrap()
    {
        form.add_certificate(certificate);
    }

    let err = t.app.media.submit_application(TOKEN, &form).await.unwrap_err();
    assert_eq!(err.user_message(), "You already have a pending application.");
}

#[tokio::test]
async fn test_invalid_application_is_never_sent() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    let form = ApplicationForm::new("Too short", "Surgeon");
    let err = t.app.media.submit_application(TOKEN, &form).await.unwrap_err();

    match err {
        ClientError::Validation(errors) => {
            assert!(errors.contains_key("bio"));
            assert!(errors.contains_key("specialization"));
            assert!(errors.contains_key("certificates"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
