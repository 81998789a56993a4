// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model, auth payloads and the login/signup forms.

use super::{validate_form, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role, decides which dashboard and navigation a user gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Pet owner
    #[default]
    User,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "owner" => Ok(Role::User),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Current user as returned by `GET /api/user/me/`.
///
/// Fetched, never locally authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub profilepicture: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// The backend sends ids as numbers on `/me/` but as strings on login.
pub(crate) fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

/// Response of `POST /api/user/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Response of `POST /api/token/refresh/`.
///
/// `refresh` is only present when the backend rotates refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// ─── Forms ───────────────────────────────────────────────────

/// Login form.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// "Remember me": durable token tier instead of the ephemeral one
    #[serde(skip)]
    pub remember: bool,
}

impl LoginForm {
    pub fn new(email: &str, password: &str, remember: bool) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
            remember,
        }
    }

    pub fn validate_fields(&self) -> FieldErrors {
        validate_form(self)
    }
}

/// Signup form; field limits mirror the backend serializer.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub firstname: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub lastname: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    #[serde(skip)]
    pub accepted_terms: bool,
}

impl SignupForm {
    pub fn new(
        email: &str,
        firstname: &str,
        lastname: &str,
        password: &str,
        role: Role,
        accepted_terms: bool,
    ) -> Self {
        Self {
            email: email.trim().to_string(),
            firstname: firstname.trim().to_string(),
            lastname: lastname.trim().to_string(),
            password: password.to_string(),
            role,
            accepted_terms,
        }
    }

    pub fn validate_fields(&self) -> FieldErrors {
        let mut errors = validate_form(self);
        if !self.accepted_terms {
            errors.insert(
                "terms".to_string(),
                "You must accept the terms to continue".to_string(),
            );
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_number_or_string() {
        let user: User = serde_json::from_str(
            r#"{"id": 7, "email": "a@b.co", "firstname": "Ada", "lastname": "L", "role": "doctor"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Doctor);

        let user: User = serde_json::from_str(
            r#"{"id": "8", "email": "a@b.co", "firstname": "Ada", "lastname": "L"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "8");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.profilepicture, None);
    }

    #[test]
    fn test_login_form_validation() {
        let errors = LoginForm::new("not-an-email", "", false).validate_fields();
        assert!(errors.contains_key("email"));
        assert_eq!(errors["password"], "Password is required");

        assert!(LoginForm::new(" vet@curapets.io ", "pw", true)
            .validate_fields()
            .is_empty());
    }

    #[test]
    fn test_signup_requires_terms_and_long_password() {
        let form = SignupForm::new("o@p.io", "Olu", "Ade", "short", Role::User, false);
        let errors = form.validate_fields();
        assert_eq!(errors["password"], "Password must be at least 8 characters");
        assert!(errors.contains_key("terms"));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert!("admin".parse::<Role>().is_err());
    }
}
