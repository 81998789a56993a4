// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct uploads to the third-party media host.
//!
//! Flow for doctor certificates:
//! 1. Check the picked files locally (type, size, count)
//! 2. Fetch a signed upload ticket from the backend (bearer auth)
//! 3. POST each file straight to the media host (no bearer header)
//! 4. Submit the application with the resulting URLs
//!
//! Steps 3 and 4 are not transactional. If the submission fails after files
//! were uploaded, the remote files are orphaned; this is logged, not hidden.

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::application::{check_certificate_files, is_on_media_host};
use crate::models::{ApplicationForm, Certificate, FieldErrors, LocalFile};
use crate::services::api::ApiClient;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};

/// Media host folder for doctor certificates.
pub const CERTIFICATE_FOLDER: &str = "doctor_certificates";

/// Signed upload parameters issued by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadSignature {
    pub signature: String,
    #[serde(deserialize_with = "number_or_string")]
    pub timestamp: String,
    pub api_key: String,
    pub cloud_name: String,
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaErrorResponse {
    error: MediaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct MediaErrorDetail {
    message: String,
}

/// Uploads files to the media host and submits doctor applications.
#[derive(Clone)]
pub struct MediaUploader {
    api: ApiClient,
    upload_url: String,
    media_host: String,
}

impl MediaUploader {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            upload_url: config.media_upload_url.trim_end_matches('/').to_string(),
            media_host: config.media_host.clone(),
        }
    }

    /// Upload one file and return its `secure_url`.
    pub async fn upload(&self, token: &str, file: &LocalFile, folder: &str) -> Result<String> {
        let ticket = self
            .api
            .upload_signature(token, folder)
            .await
            .map_err(|e| match e {
                ClientError::Unauthorized => e,
                other => ClientError::Upload(format!(
                    "could not get upload signature: {}",
                    other.user_message()
                )),
            })?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let body = Form::new()
            .part("file", part)
            .text("folder", folder.to_string())
            .text("timestamp", ticket.timestamp.clone())
            .text("api_key", ticket.api_key.clone())
            .text("signature", ticket.signature.clone());

        let url = format!("{}/{}/auto/upload", self.upload_url, ticket.cloud_name);

        // No bearer header: the media host must never see the session token
        let response = self
            .api
            .http()
            .post(&url)
            .multipart(body)
            .send()
            .await
            .map_err(|e| ClientError::Upload(format!("{}: {}", file.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<MediaErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            tracing::warn!(file = %file.name, status = status.as_u16(), %detail, "Media upload rejected");
            return Err(ClientError::Upload(format!("{}: {}", file.name, detail)));
        }

        let uploaded: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Upload(format!("{}: invalid response: {}", file.name, e)))?;

        let secure_url = uploaded
            .secure_url
            .ok_or_else(|| ClientError::Upload(format!("{}: no URL returned", file.name)))?;

        if !is_on_media_host(&secure_url, &self.media_host) {
            return Err(ClientError::Upload(format!(
                "{}: uploaded URL is not on {}",
                file.name, self.media_host
            )));
        }

        tracing::info!(file = %file.name, size = file.size(), "Uploaded file to media host");
        Ok(secure_url)
    }

    /// Check and upload certificate files in order.
    ///
    /// Any failure stops the batch. Files uploaded before the failure are
    /// orphaned on the media host and logged.
    pub async fn upload_certificates(
        &self,
        token: &str,
        already_attached: usize,
        files: &[LocalFile],
    ) -> Result<Vec<Certificate>> {
        check_certificate_files(already_attached, files).map_err(|message| {
            ClientError::Validation(FieldErrors::from([("certificates".to_string(), message)]))
        })?;

        let mut uploaded = Vec::with_capacity(files.len());
        for file in files {
            match self.upload(token, file, CERTIFICATE_FOLDER).await {
                Ok(remote_url) => uploaded.push(Certificate {
                    remote_url,
                    original_name: file.name.clone(),
                    size: file.size(),
                    mime_type: file.mime_type.clone(),
                }),
                Err(e) => {
                    log_orphans(&uploaded, "certificate upload batch failed");
                    return Err(e);
                }
            }
        }
        Ok(uploaded)
    }

    /// Validate and submit a doctor application with already-uploaded certificates.
    pub async fn submit_application(&self, token: &str, form: &ApplicationForm) -> Result<()> {
        let errors = form.validate_fields(&self.media_host);
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }

        match self.api.submit_application(token, form).await {
            Ok(()) => {
                tracing::info!(
                    certificates = form.certificates.len(),
                    specialization = %form.specialization,
                    "Doctor application submitted"
                );
                Ok(())
            }
            Err(e) => {
                log_orphans(&form.certificates, "application submission failed");
                Err(e)
            }
        }
    }
}

fn log_orphans(certificates: &[Certificate], reason: &str) {
    if certificates.is_empty() {
        return;
    }
    let urls: Vec<&str> = certificates.iter().map(|c| c.remote_url.as_str()).collect();
    tracing::warn!(orphaned = ?urls, reason, "Uploaded files left orphaned on media host");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_timestamp_number_or_string() {
        let sig: UploadSignature = serde_json::from_str(
            r#"{"signature": "abc", "timestamp": 1767225600, "api_key": "k", "cloud_name": "c"}"#,
        )
        .unwrap();
        assert_eq!(sig.timestamp, "1767225600");

        let sig: UploadSignature = serde_json::from_str(
            r#"{"signature": "abc", "timestamp": "1767225600", "api_key": "k", "cloud_name": "c"}"#,
        )
        .unwrap();
        assert_eq!(sig.timestamp, "1767225600");
    }
}
