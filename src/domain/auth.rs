use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::Error;

pub const MIN_PASSWORD_LENGTH: u64 = 6;

#[derive(Debug, Clone, Validate, Deserialize, Serialize)]
pub struct LoginRequest {
    #[validate(custom(function = validate_email_syntax))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Validate, Deserialize, Serialize)]
pub struct RegisterRequest {
    #[validate(custom(function = validate_email_syntax))]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        RegisterRequest {
            email: email.into(),
            username: None,
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain.
pub fn validate_email_syntax(email: &str) -> Result<(), ValidationError> {
    let well_formed = !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .char_indices()
                        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
            }
            None => false,
        };
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// Turns field failures into one caller-facing message. Email is reported first.
pub fn validation_error(errors: ValidationErrors) -> Error {
    let fields = errors.field_errors();
    let message = if fields.contains_key("email") {
        "Enter a valid email".to_string()
    } else if fields.contains_key("confirm_password") {
        "Passwords do not match".to_string()
    } else if fields.contains_key("password") {
        format!("Password must be at least {MIN_PASSWORD_LENGTH} characters")
    } else {
        errors.to_string()
    };
    Error::Validation(message)
}
