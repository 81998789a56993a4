// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models and form state for the application.

pub mod application;
pub mod appointment;
pub mod availability;
pub mod doctor;
pub mod file;
pub mod notification;
pub mod pet;
pub mod user;

pub use application::{ApplicationForm, ApplicationState, ApplicationStatus, Certificate, Specialization};
pub use appointment::{Appointment, AppointmentStatus, BookingForm};
pub use availability::{
    AvailabilityEditor, AvailabilityError, AvailabilitySubmission, TimeRange, TimeSlot, Weekday,
};
pub use doctor::{DoctorProfile, DoctorProfileUpdate, ProfileForm};
pub use file::LocalFile;
pub use notification::Notification;
pub use pet::{Pet, PetForm, Species};
pub use user::{LoginForm, LoginResponse, RefreshResponse, Role, SignupForm, User};

use std::collections::BTreeMap;

/// Field key → message, as shown next to form inputs.
pub type FieldErrors = BTreeMap<String, String>;

/// Flatten `validator` output into field-keyed messages (first message per field).
pub fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            Some((field.to_string(), message))
        })
        .collect()
}

/// Run `validator` on a form and convert failures into field-keyed messages.
pub(crate) fn validate_form<T: validator::Validate>(form: &T) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors(&errors),
    }
}
