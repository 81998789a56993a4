// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Doctor application form and certificate metadata.

use super::{FieldErrors, LocalFile};
use serde::{Deserialize, Serialize};

/// Certificate file types accepted by the backend.
pub const CERTIFICATE_MIME_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Largest accepted certificate, 5 MiB.
pub const MAX_CERTIFICATE_BYTES: u64 = 5 * 1024 * 1024;

/// Most certificates one application may carry.
pub const MAX_CERTIFICATES: usize = 5;

const MIN_BIO_CHARS: usize = 50;
const MAX_BIO_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specialization {
    Pediatrician,
    Cardiologist,
    Dermatologist,
}

impl Specialization {
    pub const ALL: [Specialization; 3] = [
        Specialization::Pediatrician,
        Specialization::Cardiologist,
        Specialization::Dermatologist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::Pediatrician => "Pediatrician",
            Specialization::Cardiologist => "Cardiologist",
            Specialization::Dermatologist => "Dermatologist",
        }
    }
}

impl std::str::FromStr for Specialization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialization::ALL
            .into_iter()
            .find(|spec| spec.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown specialization '{}'", s.trim()))
    }
}

/// A certificate already uploaded to the media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub remote_url: String,
    pub original_name: String,
    pub size: u64,
    pub mime_type: String,
}

impl Certificate {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Whether `url` is an http(s) URL whose host is `media_host` or a subdomain of it.
pub fn is_on_media_host(url: &str, media_host: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let host = host.to_ascii_lowercase();
    let media_host = media_host.trim().trim_end_matches('.').to_ascii_lowercase();
    !media_host.is_empty()
        && (host == media_host
            || host
                .strip_suffix(media_host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.')))
}

/// Reject a batch of picked files before anything is uploaded.
///
/// `already_attached` counts certificates uploaded earlier in this form.
pub fn check_certificate_files(already_attached: usize, files: &[LocalFile]) -> Result<(), String> {
    let invalid: Vec<&str> = files
        .iter()
        .filter(|f| {
            !CERTIFICATE_MIME_TYPES.contains(&f.mime_type.as_str()) || f.size() > MAX_CERTIFICATE_BYTES
        })
        .map(|f| f.name.as_str())
        .collect();

    if !invalid.is_empty() {
        return Err(format!(
            "Invalid files: {}. Only PDF, JPG, and PNG files under 5MB are allowed.",
            invalid.join(", ")
        ));
    }

    if already_attached + files.len() > MAX_CERTIFICATES {
        return Err(format!(
            "Cannot upload more than {} certificates.",
            MAX_CERTIFICATES
        ));
    }

    Ok(())
}

/// Doctor application form.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub bio: String,
    /// Raw selection; checked against [`Specialization::ALL`] on validate
    pub specialization: String,
    pub certificates: Vec<Certificate>,
}

impl ApplicationForm {
    pub fn new(bio: &str, specialization: &str) -> Self {
        Self {
            bio: bio.trim().to_string(),
            specialization: specialization.trim().to_string(),
            certificates: Vec::new(),
        }
    }

    pub fn add_certificate(&mut self, certificate: Certificate) {
        self.certificates.push(certificate);
    }

    pub fn remove_certificate(&mut self, index: usize) -> Option<Certificate> {
        (index < self.certificates.len()).then(|| self.certificates.remove(index))
    }

    pub fn certificate_urls(&self) -> Vec<&str> {
        self.certificates
            .iter()
            .map(|c| c.remote_url.as_str())
            .collect()
    }

    /// `media_host` is the hostname every certificate URL must live on.
    pub fn validate_fields(&self, media_host: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let bio_chars = self.bio.chars().count();
        let bio_error = if bio_chars == 0 {
            Some("Bio is required".to_string())
        } else if bio_chars < MIN_BIO_CHARS {
            Some(format!("Bio must be at least {} characters", MIN_BIO_CHARS))
        } else if bio_chars > MAX_BIO_CHARS {
            Some(format!("Bio must not exceed {} characters", MAX_BIO_CHARS))
        } else {
            None
        };
        if let Some(message) = bio_error {
            errors.insert("bio".to_string(), message);
        }

        if self.specialization.is_empty() {
            errors.insert(
                "specialization".to_string(),
                "Specialization is required".to_string(),
            );
        } else if self.specialization.parse::<Specialization>().is_err() {
            errors.insert(
                "specialization".to_string(),
                "Please select a valid specialization".to_string(),
            );
        }

        if self.certificates.is_empty() {
            errors.insert(
                "certificates".to_string(),
                "At least one certificate is required".to_string(),
            );
        } else if self.certificates.len() > MAX_CERTIFICATES {
            errors.insert(
                "certificates".to_string(),
                format!("Cannot upload more than {} certificates.", MAX_CERTIFICATES),
            );
        } else if self
            .certificates
            .iter()
            .any(|c| !is_on_media_host(&c.remote_url, media_host))
        {
            errors.insert(
                "certificates".to_string(),
                "All certificates must be hosted on the media host".to_string(),
            );
        }

        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Response of `GET /api/applications/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub status: ApplicationState,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}
