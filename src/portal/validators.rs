//! Field rules for every form in the portal. All functions are pure: they trim
//! the raw input, check it, and hand back the value that should go on the wire.
//! Nothing here touches the network or the session.

use regex::Regex;
use std::fmt;

/// Form field a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mobile,
    Email,
    Otp,
    Aadhaar,
    Pan,
    Terms,
    Name,
    Address,
    City,
    Pincode,
    Username,
    Password,
    NewPassword,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Email => "email",
            Self::Otp => "otp",
            Self::Aadhaar => "aadhaar",
            Self::Pan => "pan",
            Self::Terms => "terms",
            Self::Name => "name",
            Self::Address => "address",
            Self::City => "city",
            Self::Pincode => "pincode",
            Self::Username => "username",
            Self::Password => "password",
            Self::NewPassword => "new_password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level rejection with the message shown next to the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: &'static str,
}

impl ValidationError {
    const fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(value))
}

/// Ten digits, leading 6-9.
///
/// # Errors
/// Returns a [`ValidationError`] for anything else.
pub fn mobile(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if matches(r"^[6-9][0-9]{9}$", value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(
            Field::Mobile,
            "Enter a valid 10-digit mobile",
        ))
    }
}

/// # Errors
/// Returns a [`ValidationError`] when the address is not `local@domain.tld`.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if matches(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(
            Field::Email,
            "Enter a valid email address",
        ))
    }
}

/// Six digit one-time password.
///
/// # Errors
/// Wrong length is reported before non-digit characters.
pub fn otp(raw: &str) -> Result<String, ValidationError> {
    fixed_digits(
        raw,
        6,
        ValidationError::new(Field::Otp, "Enter 6-digit OTP"),
        ValidationError::new(Field::Otp, "OTP must be digits only"),
    )
}

/// Twelve digit Aadhaar number.
///
/// # Errors
/// Wrong length is reported before non-digit characters.
pub fn aadhaar(raw: &str) -> Result<String, ValidationError> {
    fixed_digits(
        raw,
        12,
        ValidationError::new(Field::Aadhaar, "Enter 12-digit Aadhaar"),
        ValidationError::new(Field::Aadhaar, "Aadhaar must be digits only"),
    )
}

fn fixed_digits(
    raw: &str,
    len: usize,
    wrong_length: ValidationError,
    not_digits: ValidationError,
) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.chars().count() != len {
        return Err(wrong_length);
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(not_digits);
    }
    Ok(value.to_string())
}

/// PAN in the `ABCDE1234F` shape, accepted in any case and returned upper-cased.
///
/// # Errors
/// Returns a [`ValidationError`] when the shape does not match.
pub fn pan(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim().to_ascii_uppercase();
    if matches(r"^[A-Z]{5}[0-9]{4}[A-Z]$", &value) {
        Ok(value)
    } else {
        Err(ValidationError::new(
            Field::Pan,
            "Enter valid PAN (ABCDE1234F)",
        ))
    }
}

/// # Errors
/// Returns a [`ValidationError`] unless the terms checkbox is ticked.
pub fn terms(accepted: bool) -> Result<(), ValidationError> {
    if accepted {
        Ok(())
    } else {
        Err(ValidationError::new(Field::Terms, "Accept terms to continue"))
    }
}

fn at_least(raw: &str, min: usize, error: ValidationError) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.chars().count() < min {
        return Err(error);
    }
    Ok(value.to_string())
}

/// Full name on the profile page, usually the PAN registered name.
///
/// # Errors
/// Returns a [`ValidationError`] for names shorter than 2 characters.
pub fn profile_name(raw: &str) -> Result<String, ValidationError> {
    at_least(raw, 2, ValidationError::new(Field::Name, "Enter your name"))
}

/// # Errors
/// Returns a [`ValidationError`] for addresses shorter than 5 characters.
pub fn address(raw: &str) -> Result<String, ValidationError> {
    at_least(raw, 5, ValidationError::new(Field::Address, "Enter address"))
}

/// # Errors
/// Returns a [`ValidationError`] for cities shorter than 2 characters.
pub fn city(raw: &str) -> Result<String, ValidationError> {
    at_least(raw, 2, ValidationError::new(Field::City, "Enter city"))
}

/// Six digit postal PIN code.
///
/// # Errors
/// Returns a [`ValidationError`] for anything else.
pub fn pincode(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if matches(r"^[0-9]{6}$", value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(Field::Pincode, "Enter 6-digit PIN"))
    }
}

/// Retail login usernames, e.g. `RA176900435`.
///
/// # Errors
/// Short usernames are reported before invalid characters.
pub fn login_username(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.chars().count() < 6 {
        return Err(ValidationError::new(Field::Username, "Enter your username"));
    }
    if !matches(r"^[A-Za-z0-9_-]+$", value) {
        return Err(ValidationError::new(Field::Username, "Invalid username"));
    }
    Ok(value.to_string())
}

/// Passwords are checked for length only and never trimmed.
///
/// # Errors
/// Returns a [`ValidationError`] for passwords shorter than 6 characters.
pub fn login_password(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() || raw.chars().count() < 6 {
        return Err(ValidationError::new(Field::Password, "Enter your password"));
    }
    Ok(())
}

/// Username typed on the forgot-password page.
///
/// # Errors
/// Returns a [`ValidationError`] for usernames shorter than 3 characters.
pub fn recovery_username(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.chars().count() < 3 {
        return Err(ValidationError::new(Field::Username, "Enter your username"));
    }
    Ok(value.to_string())
}

/// # Errors
/// Returns a [`ValidationError`] for passwords shorter than 8 characters.
pub fn new_password(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() || raw.chars().count() < 8 {
        return Err(ValidationError::new(
            Field::NewPassword,
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}
