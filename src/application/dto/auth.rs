use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::use_cases::auth::register::RegisterRequest;
use crate::application::validation::{ValidationErrors, check_max_chars};

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_NAME_CHARS: usize = 50;

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Clone, Default)]
pub struct RegisterDto {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl RegisterDto {
    pub fn validate(self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.unwrap_or_default().trim().to_string();
        if email.is_empty() {
            errors.push("email", "is required");
        } else if !RE_EMAIL.is_match(&email) {
            errors.push("email", "must be a valid email address");
        }
        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_CHARS {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_CHARS} characters"),
            );
        }
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        check_max_chars(&mut errors, "name", name.as_deref(), MAX_NAME_CHARS);
        errors.into_result(RegisterRequest {
            email,
            password,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_input() {
        let req = RegisterDto {
            email: Some(" learner@example.com ".into()),
            password: Some("correct horse".into()),
            name: Some("".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(req.email, "learner@example.com");
        assert!(req.name.is_none());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let err = RegisterDto {
            email: Some("not-an-email".into()),
            password: Some("short".into()),
            name: None,
        }
        .validate()
        .unwrap_err();
        assert!(err.has_field("email"));
        assert!(err.has_field("password"));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = RegisterDto::default().validate().unwrap_err();
        assert!(err.has_field("email"));
        assert!(err.has_field("password"));
    }
}
