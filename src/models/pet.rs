// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pet model and the add/edit pet form.

use super::{validate_form, FieldErrors, LocalFile};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Photo types the backend accepts for pet and profile images.
pub const PHOTO_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Largest accepted photo, 5 MiB.
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    #[serde(other)]
    Other,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Other => "other",
        }
    }
}

impl std::str::FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" => Ok(Species::Dog),
            "cat" => Ok(Species::Cat),
            "bird" => Ok(Species::Bird),
            "other" => Ok(Species::Other),
            other => Err(format!(
                "unknown species '{}' (expected dog, cat, bird or other)",
                other
            )),
        }
    }
}

/// Pet as returned by `/api/pets/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: u64,
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub breed: String,
    pub age: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Add/edit pet form.
#[derive(Debug, Clone, Validate)]
pub struct PetForm {
    #[validate(length(max = 100, message = "Pet name must be at most 100 characters"))]
    pub name: String,
    pub species: Species,
    #[validate(length(max = 100, message = "Breed must be at most 100 characters"))]
    pub breed: String,
    #[validate(range(min = 1, message = "Valid age is required"))]
    pub age: u32,
    pub photo: Option<LocalFile>,
}

impl PetForm {
    pub fn new(name: &str, species: Species, breed: &str, age: u32) -> Self {
        Self {
            name: name.trim().to_string(),
            species,
            breed: breed.trim().to_string(),
            age,
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: LocalFile) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn validate_fields(&self) -> FieldErrors {
        let mut errors = validate_form(self);
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Pet name is required".to_string());
        }
        if self.breed.trim().is_empty() {
            errors.insert("breed".to_string(), "Breed is required".to_string());
        }
        if let Some(message) = self.photo.as_ref().and_then(check_photo) {
            errors.insert("image".to_string(), message);
        }
        errors
    }

    /// Text fields of the multipart body.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("species", self.species.as_str().to_string()),
            ("breed", self.breed.clone()),
            ("age", self.age.to_string()),
        ]
    }
}

/// Size wins over type, as both are shown in the same slot.
pub fn check_photo(photo: &LocalFile) -> Option<String> {
    if photo.size() > MAX_PHOTO_BYTES {
        return Some("Photo must be smaller than 5MB".to_string());
    }
    if !PHOTO_MIME_TYPES.contains(&photo.mime_type.as_str()) {
        return Some("Photo must be a JPG, PNG, GIF, or WEBP image".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_form_required_fields() {
        let errors = PetForm::new("  ", Species::Dog, "", 0).validate_fields();
        assert_eq!(errors["name"], "Pet name is required");
        assert_eq!(errors["breed"], "Breed is required");
        assert_eq!(errors["age"], "Valid age is required");
    }

    #[test]
    fn test_pet_form_too_long_fields() {
        let long = "x".repeat(101);
        let errors = PetForm::new(&long, Species::Cat, &long, 2).validate_fields();
        assert_eq!(errors["name"], "Pet name must be at most 100 characters");
        assert_eq!(errors["breed"], "Breed must be at most 100 characters");

        let edge = "x".repeat(100);
        assert!(PetForm::new(&edge, Species::Cat, &edge, 2)
            .validate_fields()
            .is_empty());
    }

    #[test]
    fn test_pet_photo_checks() {
        let form = PetForm::new("Buddy", Species::Dog, "Golden Retriever", 3)
            .with_photo(LocalFile::new("buddy.bmp", "image/bmp", vec![0; 10]));
        assert_eq!(
            form.validate_fields()["image"],
            "Photo must be a JPG, PNG, GIF, or WEBP image"
        );

        let big = LocalFile::new("buddy.png", "image/png", vec![0; (MAX_PHOTO_BYTES + 1) as usize]);
        let form = PetForm::new("Buddy", Species::Dog, "Golden Retriever", 3).with_photo(big);
        assert_eq!(form.validate_fields()["image"], "Photo must be smaller than 5MB");
    }

    #[test]
    fn test_unknown_species_decodes_as_other() {
        let pet: Pet = serde_json::from_str(
            r#"{"id": 1, "name": "Nibbles", "species": "hamster", "age": 1}"#,
        )
        .unwrap();
        assert_eq!(pet.species, Species::Other);
        assert_eq!(pet.breed, "");
    }
}
