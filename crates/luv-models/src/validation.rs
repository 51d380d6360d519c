//! Custom validation rules for `#[validate(custom(...))]`.

use std::borrow::Cow;

use validator::ValidationError;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 50;
pub const DISPLAY_NAME_MAX_LENGTH: usize = 100;

const PASSWORD_RULES: &str = "Password must be at least 8 characters long and contain at least one lowercase letter, one uppercase letter, one number, and one special character";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// At least 8 characters with a lowercase letter, an uppercase letter, a digit
/// and a symbol.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LENGTH
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

pub fn validate_strong_password(password: &str) -> Result<(), ValidationError> {
    if is_strong_password(password) {
        Ok(())
    } else {
        Err(error("strong_password", PASSWORD_RULES))
    }
}

pub fn is_valid_username(username: &str) -> bool {
    (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < USERNAME_MIN_LENGTH {
        return Err(error(
            "username_length",
            "Username must be at least 3 characters long",
        ));
    }
    if username.len() > USERNAME_MAX_LENGTH {
        return Err(error(
            "username_length",
            "Username must not exceed 50 characters",
        ));
    }
    if !is_valid_username(username) {
        return Err(error(
            "username_chars",
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}
