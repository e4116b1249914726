use super::{NewUser, ValidationError, ValidationResult};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Most units of one product a single cart line may hold
pub const MAX_LINE_QUANTITY: u32 = 1000;

impl Validate for NewUser {
    fn validate(&self) -> ValidationResult<()> {
        validate_required("nombre", &self.name, MAX_NAME_LENGTH)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_required("contrasena", &self.password, MAX_PASSWORD_LENGTH)?;
        Ok(())
    }
}

/// Reject blank values and values longer than `max_length` characters
pub fn validate_required(field: &str, value: &str, max_length: usize) -> ValidationResult<()> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    let length = trimmed.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length,
            actual_length: length,
        });
    }

    Ok(())
}

/// Validate an email address: one `@` with text on both sides, no whitespace
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("correo", email, MAX_EMAIL_LENGTH)?;

    let trimmed = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "correo".to_string(),
        expected: "user@domain".to_string(),
    };

    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

/// Validate a phone number: digits plus common separators
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_required("telefono", phone, MAX_PHONE_LENGTH)?;

    let valid = phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "telefono".to_string(),
            expected: "digits".to_string(),
        });
    }

    Ok(())
}

/// Validate a requested cart line quantity against `1..=MAX_LINE_QUANTITY`
pub fn validate_line_quantity(quantity: i64) -> ValidationResult<u32> {
    match u32::try_from(quantity) {
        Ok(quantity) if (1..=MAX_LINE_QUANTITY).contains(&quantity) => Ok(quantity),
        _ => Err(ValidationError::OutOfRange {
            field: "cantidad".to_string(),
            min: "1".to_string(),
            max: MAX_LINE_QUANTITY.to_string(),
            value: quantity.to_string(),
        }),
    }
}

/// Validate a rotation week index
pub fn validate_rotation_week(week: u32) -> ValidationResult<()> {
    if !(1..=6).contains(&week) {
        return Err(ValidationError::OutOfRange {
            field: "week".to_string(),
            min: "1".to_string(),
            max: "6".to_string(),
            value: week.to_string(),
        });
    }
    Ok(())
}
