//! Form rules checked before any remote call is issued.
//!
//! Each `*Input` type is what a form posts; `validate()` either returns the
//! typed value that is safe to send, or a [`FieldErrors`] map rendered inline
//! next to the offending fields. A failed validation never reaches the
//! network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// Characters that satisfy the "special character" password rule.
pub const PASSWORD_SPECIAL_CHARS: &str = "#?!@$%^&*-";

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Display name length bounds (inclusive).
pub const NAME_LENGTH: (usize, usize) = (2, 30);

/// Egyptian mobile numbers are 11 digits.
pub const PHONE_DIGITS: usize = 11;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Please enter a valid email")]
    InvalidEmail,

    #[error(
        "Password must contain at least 8 characters, including uppercase, lowercase, number, and special character"
    )]
    WeakPassword,

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} can't be more than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Must be only numbers")]
    NotNumeric,

    #[error("Phone number must be 11 digits")]
    InvalidPhone,
}

/// Validation failures keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, ValidationError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`. The first error per field is kept.
    pub fn insert(&mut self, field: &'static str, error: ValidationError) {
        self.0.entry(field).or_insert(error);
    }

    /// Run one field check, recording its error and returning its value.
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.insert(field, error);
                None
            }
        }
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<String> {
        self.0.get(field).map(ToString::to_string)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn required<'a>(label: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(label))
    } else {
        Ok(trimmed)
    }
}

/// Required, syntactically valid email.
///
/// # Errors
///
/// Returns `Required` for blank input and `InvalidEmail` otherwise.
pub fn email(value: &str) -> Result<Email, ValidationError> {
    let value = required("Email", value)?;
    Email::parse(value).map_err(|_| ValidationError::InvalidEmail)
}

/// Required password meeting the strength policy.
///
/// The policy: at least [`PASSWORD_MIN_LENGTH`] characters with an
/// uppercase letter, a lowercase letter, a digit, and one of
/// [`PASSWORD_SPECIAL_CHARS`].
///
/// # Errors
///
/// Returns `Required` for empty input and `WeakPassword` otherwise.
pub fn password(value: &str) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required("Password"));
    }

    let strong = value.chars().count() >= PASSWORD_MIN_LENGTH
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if strong {
        Ok(value.to_owned())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Required display name within [`NAME_LENGTH`].
///
/// # Errors
///
/// Returns `Required`, `TooShort` or `TooLong`.
pub fn name(value: &str) -> Result<String, ValidationError> {
    let value = required("Name", value)?;
    let len = value.chars().count();
    let (min, max) = NAME_LENGTH;
    if len < min {
        Err(ValidationError::TooShort { field: "Name", min })
    } else if len > max {
        Err(ValidationError::TooLong { field: "Name", max })
    } else {
        Ok(value.to_owned())
    }
}

/// Required 11-digit phone number.
///
/// # Errors
///
/// Returns `Required` or `InvalidPhone`.
pub fn phone(value: &str) -> Result<String, ValidationError> {
    let value = required("Phone number", value)?;
    if value.len() == PHONE_DIGITS && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_owned())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Required, digits-only reset code.
///
/// # Errors
///
/// Returns `Required` or `NotNumeric`.
pub fn reset_code(value: &str) -> Result<String, ValidationError> {
    let value = required("Reset Code", value)?;
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_owned())
    } else {
        Err(ValidationError::NotNumeric)
    }
}

/// Required text of at least `min` characters.
///
/// # Errors
///
/// Returns `Required` or `TooShort`.
pub fn min_length(label: &'static str, value: &str, min: usize) -> Result<String, ValidationError> {
    let value = required(label, value)?;
    if value.chars().count() < min {
        Err(ValidationError::TooShort { field: label, min })
    } else {
        Ok(value.to_owned())
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Sign-in form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated sign-in credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl SignInInput {
    /// # Errors
    ///
    /// Returns the per-field failures when any rule is broken.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check("email", email(&self.email));
        let password = errors.check("password", password(&self.password));

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(errors),
        }
    }
}

/// Registration form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "rePassword")]
    pub re_password: String,
    #[serde(default)]
    pub phone: String,
}

/// Validated registration, serialized in the remote sign-up shape.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: String,
    #[serde(rename = "rePassword")]
    pub re_password: String,
    pub phone: String,
}

impl SignUpInput {
    /// # Errors
    ///
    /// Returns the per-field failures when any rule is broken.
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", name(&self.name));
        let email = errors.check("email", email(&self.email));
        let password = errors.check("password", password(&self.password));
        let phone = errors.check("phone", phone(&self.phone));

        if self.re_password.is_empty() {
            errors.insert("rePassword", ValidationError::Required("Password confirmation"));
        } else if self.re_password != self.password {
            errors.insert("rePassword", ValidationError::PasswordMismatch);
        }

        match (name, email, password, phone) {
            (Some(name), Some(email), Some(password), Some(phone)) if errors.is_empty() => {
                Ok(Registration {
                    name,
                    email,
                    re_password: password.clone(),
                    password,
                    phone,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Forgot-password form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordInput {
    #[serde(default)]
    pub email: String,
}

impl ForgotPasswordInput {
    /// # Errors
    ///
    /// Returns the per-field failures when any rule is broken.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check("email", email(&self.email)).ok_or(errors)
    }
}

/// Reset-code form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetCodeInput {
    #[serde(default, rename = "resetCode")]
    pub reset_code: String,
}

impl ResetCodeInput {
    /// # Errors
    ///
    /// Returns the per-field failures when any rule is broken.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .check("resetCode", reset_code(&self.reset_code))
            .ok_or(errors)
    }
}

/// Reset-password form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordInput {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
}

/// Validated password reset, serialized in the remote shape.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub email: Email,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

impl ResetPasswordInput {
    /// # Errors
    ///
    /// Returns the per-field failures when any rule is broken.
    pub fn validate(&self) -> Result<PasswordReset, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check("email", email(&self.email));
        let new_password = errors.check("newPassword", password(&self.new_password));

        match (email, new_password) {
            (Some(email), Some(new_password)) => Ok(PasswordReset {
                email,
                new_password,
            }),
            _ => Err(errors),
        }
    }
}

/// Checkout shipping form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingInput {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
}

/// Validated shipping address, serialized in the remote shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub details: String,
    pub city: String,
    pub phone: String,
}

impl ShippingInput {
    /// Minimum address details length.
    pub const DETAILS_MIN: usize = 10;
    /// Minimum city name length.
    pub const CITY_MIN: usize = 3;

    /// # Errors
    ///
    /// Returns the per-field failures when any rule is broken.
    pub fn validate(&self) -> Result<ShippingAddress, FieldErrors> {
        let mut errors = FieldErrors::new();
        let details = errors.check(
            "details",
            min_length("Details", &self.details, Self::DETAILS_MIN),
        );
        let city = errors.check("city", min_length("City", &self.city, Self::CITY_MIN));
        let phone = errors.check("phone", phone(&self.phone));

        match (details, city, phone) {
            (Some(details), Some(city), Some(phone)) => Ok(ShippingAddress {
                details,
                city,
                phone,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG: &str = "Passw0rd!";

    #[test]
    fn test_password_policy() {
        assert!(password(STRONG).is_ok());
        assert_eq!(password(""), Err(ValidationError::Required("Password")));
        // missing special character
        assert_eq!(password("Passw0rdd"), Err(ValidationError::WeakPassword));
        // missing uppercase
        assert_eq!(password("passw0rd!"), Err(ValidationError::WeakPassword));
        // missing lowercase
        assert_eq!(password("PASSW0RD!"), Err(ValidationError::WeakPassword));
        // missing digit
        assert_eq!(password("Password!"), Err(ValidationError::WeakPassword));
        // too short
        assert_eq!(password("Pa0!abc"), Err(ValidationError::WeakPassword));
    }

    #[test]
    fn test_name_bounds() {
        assert!(name("Al").is_ok());
        assert!(name(&"a".repeat(30)).is_ok());
        assert_eq!(
            name("A"),
            Err(ValidationError::TooShort {
                field: "Name",
                min: 2
            })
        );
        assert_eq!(
            name(&"a".repeat(31)),
            Err(ValidationError::TooLong {
                field: "Name",
                max: 30
            })
        );
        assert_eq!(name("  "), Err(ValidationError::Required("Name")));
    }

    #[test]
    fn test_phone() {
        assert_eq!(phone("01012345678").unwrap(), "01012345678");
        assert_eq!(phone("0101234567"), Err(ValidationError::InvalidPhone));
        assert_eq!(phone("0101234567a"), Err(ValidationError::InvalidPhone));
        assert_eq!(phone(""), Err(ValidationError::Required("Phone number")));
    }

    #[test]
    fn test_reset_code() {
        assert_eq!(reset_code(" 123456 ").unwrap(), "123456");
        assert_eq!(reset_code("12a456"), Err(ValidationError::NotNumeric));
        assert_eq!(reset_code(""), Err(ValidationError::Required("Reset Code")));
    }

    #[test]
    fn test_sign_in_collects_every_field_error() {
        let input = SignInInput {
            email: "not-an-email".to_string(),
            password: "weak".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email").unwrap(), "Please enter a valid email");
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_sign_in_valid() {
        let input = SignInInput {
            email: "user@example.com".to_string(),
            password: STRONG.to_string(),
        };
        let credentials = input.validate().unwrap();
        assert_eq!(credentials.email.as_str(), "user@example.com");
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let input = SignUpInput {
            name: "Mona".to_string(),
            email: "mona@example.com".to_string(),
            password: STRONG.to_string(),
            re_password: "Different1!".to_string(),
            phone: "01012345678".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("rePassword").unwrap(), "Passwords don't match");
    }

    #[test]
    fn test_sign_up_serializes_remote_shape() {
        let input = SignUpInput {
            name: "Mona".to_string(),
            email: "mona@example.com".to_string(),
            password: STRONG.to_string(),
            re_password: STRONG.to_string(),
            phone: "01012345678".to_string(),
        };
        let registration = input.validate().unwrap();
        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["rePassword"], STRONG);
        assert_eq!(json["email"], "mona@example.com");
    }

    #[test]
    fn test_shipping_rules() {
        let input = ShippingInput {
            details: "short".to_string(),
            city: "Ca".to_string(),
            phone: "123".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(
            errors.get("details").unwrap(),
            "Details must be at least 10 characters"
        );
        assert_eq!(errors.get("city").unwrap(), "City must be at least 3 characters");
        assert_eq!(errors.get("phone").unwrap(), "Phone number must be 11 digits");

        let input = ShippingInput {
            details: "12 Nile Street, Apt 4".to_string(),
            city: "Cairo".to_string(),
            phone: "01012345678".to_string(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_reset_password_uses_remote_field_names() {
        let input = ResetPasswordInput {
            email: "user@example.com".to_string(),
            new_password: "bad".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.contains("newPassword"));
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("email", ValidationError::Required("Email"));
        errors.insert("email", ValidationError::InvalidEmail);
        assert_eq!(errors.get("email").unwrap(), "Email is required");
    }
}
