// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Appointment model and the booking form.

use super::availability::{format_hhmm, parse_hhmm, Weekday};
use super::{validate_form, DoctorProfile, FieldErrors};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Appointment status. Unrecognized values read as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Declined,
    Rescheduled,
}

impl AppointmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Accepted => "Accepted",
            AppointmentStatus::Rejected => "Rejected",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Declined => "Declined",
            AppointmentStatus::Rescheduled => "Rescheduled",
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "accepted" | "accept" => Ok(AppointmentStatus::Accepted),
            "rejected" | "reject" => Ok(AppointmentStatus::Rejected),
            "completed" | "complete" => Ok(AppointmentStatus::Completed),
            "declined" | "decline" => Ok(AppointmentStatus::Declined),
            "rescheduled" => Ok(AppointmentStatus::Rescheduled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(AppointmentStatus::Pending))
    }
}

/// Appointment as returned by `/api/appointments/`.
///
/// `time` is the backend's display string ("Today, 10:00 AM").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    #[serde(default)]
    pub pet: Option<u64>,
    #[serde(default, rename = "petName")]
    pub pet_name: Option<String>,
    #[serde(default, rename = "petImage")]
    pub pet_image: Option<String>,
    #[serde(default, rename = "patientName")]
    pub patient_name: Option<String>,
    pub doctor: u64,
    #[serde(default, rename = "doctorName")]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reason: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Book appointment form; serialized as the `POST /api/appointments/` body.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct BookingForm {
    pub doctor: u64,
    pub pet: Option<u64>,
    #[validate(length(max = 100, message = "Title must be 100 characters or fewer"))]
    pub title: String,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
    pub date: String,
    pub time: String,
}

impl BookingForm {
    pub fn new(doctor: u64, pet: Option<u64>, title: &str, reason: &str, date: &str, time: &str) -> Self {
        Self {
            doctor,
            pet,
            title: title.trim().to_string(),
            reason: reason.trim().to_string(),
            date: date.trim().to_string(),
            time: time.trim().to_string(),
        }
    }

    /// `today` is injected so the past-date rule is testable.
    pub fn validate_fields(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = validate_form(self);

        match NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            Ok(date) if date < today => {
                errors.insert(
                    "date".to_string(),
                    "Cannot schedule appointments in the past.".to_string(),
                );
            }
            Ok(_) => {}
            Err(_) => {
                errors.insert("date".to_string(), "Enter a date as YYYY-MM-DD".to_string());
            }
        }

        if parse_hhmm(&self.time).is_none() {
            errors.insert("time".to_string(), "Enter a time as HH:MM".to_string());
        }

        errors
    }

    /// Normalized body (`HH:MM` zero-padded).
    pub fn to_request(&self) -> Self {
        let mut body = self.clone();
        if let Some(minutes) = parse_hhmm(&self.time) {
            body.time = format_hhmm(minutes);
        }
        body
    }

    /// Warning when the slot falls outside the doctor's published hours.
    ///
    /// Advisory only: the backend owns conflict resolution.
    pub fn availability_warning(&self, profile: &DoctorProfile) -> Option<String> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        let minutes = parse_hhmm(&self.time)?;
        let day = Weekday::ALL[date.weekday().num_days_from_monday() as usize];

        (!profile.is_available_at(day, minutes)).then(|| {
            format!(
                "{} is not listed as available on {} at {}",
                profile.display_name(),
                day,
                format_hhmm(minutes)
            )
        })
    }
}
