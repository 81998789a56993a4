// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CuraPets backend API client.
//!
//! Thin typed wrapper over the REST endpoints. Every authenticated call takes
//! the bearer token explicitly; token lifecycle lives in
//! [`crate::services::session`] and [`crate::services::auth`].
//!
//! Error mapping:
//! - 401 → [`ClientError::Unauthorized`]
//! - other non-2xx → [`ClientError::Api`] with the best message the body offers
//! - transport failures and timeouts → [`ClientError::Network`]

use crate::config::Config;
use crate::error::{extract_error_message, ClientError, Result};
use crate::models::{
    ApplicationForm, ApplicationStatus, Appointment, AppointmentStatus, BookingForm, DoctorProfile,
    DoctorProfileUpdate, LoginForm, LoginResponse, Notification, Pet, PetForm, RefreshResponse,
    SignupForm, User,
};
use crate::services::media::UploadSignature;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// CuraPets API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying HTTP client, shared with the media uploader.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    pub async fn login(&self, form: &LoginForm) -> Result<LoginResponse> {
        let response = self
            .http
            .post(self.url("/api/user/login/"))
            .json(form)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/user/signup/"))
            .json(form)
            .send()
            .await?;
        check_response(response).await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let body = serde_json::json!({ "refresh": refresh_token });
        let response = self
            .http
            .post(self.url("/api/token/refresh/"))
            .json(&body)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn me(&self, token: &str) -> Result<User> {
        self.get_json("/api/user/me/", token).await
    }

    // ─── Pets ────────────────────────────────────────────────────────────────

    pub async fn list_pets(&self, token: &str) -> Result<Vec<Pet>> {
        self.get_json("/api/pets/", token).await
    }

    pub async fn get_pet(&self, token: &str, pet_id: u64) -> Result<Pet> {
        self.get_json(&format!("/api/pets/{}/", pet_id), token).await
    }

    /// Create a pet; sent as multipart when a photo is attached.
    pub async fn create_pet(&self, token: &str, form: &PetForm) -> Result<Pet> {
        let request = self.http.post(self.url("/api/pets/")).bearer_auth(token);
        let response = pet_body(request, form)?.send().await?;
        check_response_json(response).await
    }

    pub async fn update_pet(&self, token: &str, pet_id: u64, form: &PetForm) -> Result<Pet> {
        let request = self
            .http
            .put(self.url(&format!("/api/pets/{}/", pet_id)))
            .bearer_auth(token);
        let response = pet_body(request, form)?.send().await?;
        check_response_json(response).await
    }

    // ─── Doctor profiles ─────────────────────────────────────────────────────

    pub async fn list_doctor_profiles(&self, token: &str) -> Result<Vec<DoctorProfile>> {
        self.get_json("/api/doctorprofiles/", token).await
    }

    pub async fn my_doctor_profile(&self, token: &str) -> Result<DoctorProfile> {
        self.get_json("/api/doctorprofiles/me/", token).await
    }

    pub async fn update_my_doctor_profile(
        &self,
        token: &str,
        update: &DoctorProfileUpdate,
    ) -> Result<DoctorProfile> {
        self.send_json(reqwest::Method::PUT, "/api/doctorprofiles/me/", token, update)
            .await
    }

    // ─── Doctor applications ─────────────────────────────────────────────────

    /// Submit a doctor application. Certificates must already be uploaded;
    /// only their URLs are sent.
    pub async fn submit_application(&self, token: &str, form: &ApplicationForm) -> Result<()> {
        let mut body = Form::new()
            .text("bio", form.bio.clone())
            .text("specialization", form.specialization.clone());
        for url in form.certificate_urls() {
            body = body.text("certificates[]", url.to_string());
        }

        let response = self
            .http
            .post(self.url("/api/applications/"))
            .bearer_auth(token)
            .multipart(body)
            .send()
            .await?;
        check_response(response).await
    }

    pub async fn application_status(&self, token: &str) -> Result<ApplicationStatus> {
        self.get_json("/api/applications/status", token).await
    }

    // ─── Appointments ────────────────────────────────────────────────────────

    pub async fn list_appointments(&self, token: &str) -> Result<Vec<Appointment>> {
        self.get_json("/api/appointments/", token).await
    }

    /// Accepted appointments from today on (pet owner view).
    pub async fn upcoming_appointments(&self, token: &str) -> Result<Vec<Appointment>> {
        self.get_json("/api/appointments/upcoming/", token).await
    }

    /// Today's accepted appointments (doctor view).
    pub async fn today_appointments(&self, token: &str) -> Result<Vec<Appointment>> {
        self.get_json("/api/appointments/today/", token).await
    }

    /// Pending requests awaiting a decision (doctor view).
    pub async fn appointment_requests(&self, token: &str) -> Result<Vec<Appointment>> {
        self.get_json("/api/appointments/requests/", token).await
    }

    pub async fn get_appointment(&self, token: &str, appointment_id: u64) -> Result<Appointment> {
        self.get_json(&format!("/api/appointments/{}/", appointment_id), token)
            .await
    }

    pub async fn book_appointment(&self, token: &str, form: &BookingForm) -> Result<Appointment> {
        self.send_json(
            reqwest::Method::POST,
            "/api/appointments/",
            token,
            &form.to_request(),
        )
        .await
    }

    pub async fn update_appointment_status(
        &self,
        token: &str,
        appointment_id: u64,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let body = serde_json::json!({ "status": status });
        self.send_json(
            reqwest::Method::PATCH,
            &format!("/api/appointments/{}/", appointment_id),
            token,
            &body,
        )
        .await
    }

    /// Only pending appointments can be cancelled; the backend answers 403 otherwise.
    pub async fn cancel_appointment(&self, token: &str, appointment_id: u64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/appointments/{}/", appointment_id)))
            .bearer_auth(token)
            .send()
            .await?;
        check_response(response).await
    }

    // ─── Notifications ───────────────────────────────────────────────────────

    /// Most recent notifications, newest first.
    pub async fn list_notifications(&self, token: &str) -> Result<Vec<Notification>> {
        self.get_json("/api/notifications/", token).await
    }

    pub async fn mark_notification_read(&self, token: &str, notification_id: u64) -> Result<()> {
        let response = self
            .http
            .patch(self.url(&format!(
                "/api/notifications/{}/mark-read/",
                notification_id
            )))
            .bearer_auth(token)
            .send()
            .await?;
        check_response(response).await
    }

    pub async fn mark_all_notifications_read(&self, token: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/notifications/mark-all-read/"))
            .bearer_auth(token)
            .send()
            .await?;
        check_response(response).await
    }

    // ─── Media ───────────────────────────────────────────────────────────────

    /// Signed upload parameters for a media host folder.
    pub async fn upload_signature(&self, token: &str, folder: &str) -> Result<UploadSignature> {
        let response = self
            .http
            .get(self.url("/api/generate-cloudinary-signature/"))
            .query(&[("folder", folder)])
            .bearer_auth(token)
            .send()
            .await?;
        check_response_json(response).await
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// Generic authenticated GET with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        check_response_json(response).await
    }

    /// Authenticated request with a JSON body and JSON response.
    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        check_response_json(response).await
    }
}

/// JSON body without a photo, multipart with one.
fn pet_body(request: reqwest::RequestBuilder, form: &PetForm) -> Result<reqwest::RequestBuilder> {
    let Some(photo) = &form.photo else {
        let body = serde_json::json!({
            "name": form.name,
            "species": form.species,
            "breed": form.breed,
            "age": form.age,
        });
        return Ok(request.json(&body));
    };

    let mut multipart = Form::new();
    for (name, value) in form.text_fields() {
        multipart = multipart.text(name, value);
    }
    let part = Part::bytes(photo.bytes.clone())
        .file_name(photo.name.clone())
        .mime_str(&photo.mime_type)?;
    Ok(request.multipart(multipart.part("image", part)))
}

/// Map a non-success response to a [`ClientError`].
pub(crate) async fn error_for_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 401 {
        tracing::debug!("Backend rejected bearer token (401)");
        return ClientError::Unauthorized;
    }

    let message = extract_error_message(&body);
    tracing::debug!(status = status.as_u16(), %message, "Backend request failed");
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Check response status and return error if not successful.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(error_for_response(response).await)
}

/// Check response and parse JSON body.
pub(crate) async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_for_response(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Network(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_normalized_base() {
        let config = Config::default()
            .with_api_base_url("https://api.curapets.test/")
            .unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.curapets.test");
        assert_eq!(client.url("/api/pets/"), "https://api.curapets.test/api/pets/");
    }
}
