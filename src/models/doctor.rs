// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Doctor profile model and the profile edit form.

use super::availability::{AvailabilityEditor, AvailabilitySubmission, TimeRange, TimeSlot, Weekday};
use super::{FieldErrors, User};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Doctor profile from `/api/doctorprofiles/`.
///
/// Days and times are kept as the backend sent them; the editor parses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    #[serde(default)]
    pub doctor: Option<User>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub available_days: Vec<String>,
    #[serde(default)]
    pub available_times: BTreeMap<String, Vec<TimeSlot>>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DoctorProfile {
    pub fn display_name(&self) -> String {
        match &self.doctor {
            Some(user) => format!("Dr. {}", user.full_name()),
            None => "Dr. (unknown)".to_string(),
        }
    }

    pub fn availability(&self) -> AvailabilityEditor {
        AvailabilityEditor::from_profile(&self.available_days, &self.available_times)
    }

    /// Whether any slot on `day` covers `minutes` since midnight.
    pub fn is_available_at(&self, day: Weekday, minutes: u16) -> bool {
        if !self
            .available_days
            .iter()
            .any(|d| d.parse::<Weekday>().ok() == Some(day))
        {
            return false;
        }

        self.available_times
            .iter()
            .filter(|(d, _)| d.parse::<Weekday>().ok() == Some(day))
            .flat_map(|(_, slots)| slots.iter())
            .filter_map(TimeRange::from_slot)
            .any(|range| range.contains(minutes))
    }
}

/// Body of `PUT /api/doctorprofiles/me/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorProfileUpdate {
    pub bio: String,
    pub specialization: String,
    pub years_experience: u32,
    pub address: String,
    #[serde(flatten)]
    pub availability: AvailabilitySubmission,
}

/// Doctor profile edit form.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub bio: String,
    pub specialization: String,
    pub years_experience: u32,
    pub address: String,
    pub availability: AvailabilityEditor,
}

impl ProfileForm {
    /// Prefill the form from the stored profile.
    pub fn from_profile(profile: &DoctorProfile) -> Self {
        Self {
            bio: profile.bio.clone(),
            specialization: profile.specialization.clone(),
            years_experience: profile.years_experience,
            address: profile.address.clone(),
            availability: profile.availability(),
        }
    }

    pub fn validate_fields(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let required = [
            ("bio", &self.bio, "Bio is required"),
            ("specialization", &self.specialization, "Specialization is required"),
            ("address", &self.address, "Address is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(field.to_string(), message.to_string());
            }
        }

        errors.extend(self.availability.validate());
        errors
    }

    pub fn to_update(&self) -> DoctorProfileUpdate {
        DoctorProfileUpdate {
            bio: self.bio.trim().to_string(),
            specialization: self.specialization.trim().to_string(),
            years_experience: self.years_experience,
            address: self.address.trim().to_string(),
            availability: self.availability.to_submission(),
        }
    }
}
