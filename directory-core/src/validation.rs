//! Field-level business rules for user input.
//!
//! Every check is pure and returns the first failing rule. Rules run in a fixed
//! order: name, email, role.

use crate::models::{CreateUserRequest, Role, UpdateUserRequest};
use std::fmt;
use thiserror::Error;
use validator::ValidateEmail;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MIN_CHARS: usize = 5;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const RESTRICTED_NAME_SYMBOLS: [char; 10] = ['!', '@', '#', '$', '%', '^', '&', '*', '(', ')'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Role,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Role => "role",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: Field },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: Field, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },

    #[error("name contains restricted symbol '{symbol}'")]
    RestrictedSymbol { symbol: char },

    #[error("email has incorrect format")]
    InvalidEmail,

    #[error("role is not valid")]
    InvalidRole { code: i32 },
}

impl ValidationError {
    /// The offending field.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. } => *field,
            ValidationError::RestrictedSymbol { .. } => Field::Name,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::InvalidRole { .. } => Field::Role,
        }
    }
}

/// Validates a create request and returns the parsed role.
pub fn validate_create(request: &CreateUserRequest) -> Result<Role, ValidationError> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_role(request.role)
}

/// Validates the supplied fields of an update request and returns the parsed role.
/// The role is always checked; empty name or email are skipped.
pub fn validate_update(request: &UpdateUserRequest) -> Result<Role, ValidationError> {
    if let Some(name) = request.supplied_name() {
        validate_name(name)?;
    }
    if let Some(email) = request.supplied_email() {
        validate_email(email)?;
    }
    validate_role(request.role)
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    check_length(Field::Name, name, NAME_MIN_CHARS, NAME_MAX_CHARS)?;

    match name.chars().find(|c| RESTRICTED_NAME_SYMBOLS.contains(c)) {
        Some(symbol) => Err(ValidationError::RestrictedSymbol { symbol }),
        None => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    check_length(Field::Email, email, EMAIL_MIN_CHARS, EMAIL_MAX_CHARS)?;

    if email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_role(code: i32) -> Result<Role, ValidationError> {
    Role::from_code(code)
        .filter(|role| role.is_assignable())
        .ok_or(ValidationError::InvalidRole { code })
}

fn check_length(field: Field, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let chars = value.chars().count();
    if chars == 0 {
        return Err(ValidationError::Required { field });
    }
    if chars < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if chars > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, role: i32) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            role,
        }
    }

    /// Builds a syntactically valid address of exactly `len` characters.
    fn email_of_len(len: usize) -> String {
        let domain = "example.com";
        let local = "a".repeat(len - domain.len() - 1);
        format!("{local}@{domain}")
    }

    #[test]
    fn test_name_length_boundaries() {
        assert_eq!(
            validate_name("B"),
            Err(ValidationError::TooShort { field: Field::Name, min: 2 })
        );
        assert!(validate_name("Bo").is_ok());
        assert!(validate_name(&"n".repeat(100)).is_ok());
        assert_eq!(
            validate_name(&"n".repeat(101)),
            Err(ValidationError::TooLong { field: Field::Name, max: 100 })
        );
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        assert!(validate_name(&"\u{00e9}".repeat(100)).is_ok());
    }

    #[test]
    fn test_name_restricted_symbols() {
        for symbol in RESTRICTED_NAME_SYMBOLS {
            let name = format!("Bo{symbol}");
            assert_eq!(
                validate_name(&name),
                Err(ValidationError::RestrictedSymbol { symbol })
            );
        }
        assert!(validate_name("Jean-Luc O'Neil").is_ok());
    }

    #[test]
    fn test_email_boundaries() {
        assert_eq!(
            validate_email("a@bc"),
            Err(ValidationError::TooShort { field: Field::Email, min: 5 })
        );
        assert!(validate_email("a@b.c").is_ok());
        assert!(validate_email(&email_of_len(60)).is_ok());

        let local = "a".repeat(60);
        let host = "b".repeat(35);
        let longest = format!("{local}@{host}.com");
        assert_eq!(longest.len(), 100);
        assert!(validate_email(&longest).is_ok());

        let too_long = format!("{local}@{host}x.com");
        assert_eq!(
            validate_email(&too_long),
            Err(ValidationError::TooLong { field: Field::Email, max: 100 })
        );
    }

    #[test]
    fn test_email_format() {
        assert_eq!(validate_email("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("two@@example.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_role_rules() {
        assert_eq!(validate_role(1), Ok(Role::Admin));
        assert_eq!(validate_role(2), Ok(Role::User));
        assert_eq!(validate_role(0), Err(ValidationError::InvalidRole { code: 0 }));
        assert_eq!(validate_role(999), Err(ValidationError::InvalidRole { code: 999 }));
        assert_eq!(validate_role(-1).unwrap_err().to_string(), "role is not valid");
    }

    #[test]
    fn test_create_requires_name_and_email() {
        assert_eq!(
            validate_create(&request("", "b@x.com", 2)),
            Err(ValidationError::Required { field: Field::Name })
        );
        assert_eq!(
            validate_create(&request("Bo", "", 2)),
            Err(ValidationError::Required { field: Field::Email })
        );
    }

    #[test]
    fn test_create_reports_first_failure_only() {
        let err = validate_create(&request("B", "bad", 999)).unwrap_err();
        assert_eq!(err.field(), Field::Name);
        assert_eq!(err.to_string(), "name must be at least 2 characters");
    }

    #[test]
    fn test_update_skips_empty_fields() {
        let update = UpdateUserRequest {
            id: 5,
            name: Some(String::new()),
            email: Some(String::new()),
            role: 1,
        };
        assert_eq!(validate_update(&update), Ok(Role::Admin));

        let bad_role = UpdateUserRequest { id: 5, role: 999, ..Default::default() };
        assert_eq!(validate_update(&bad_role), Err(ValidationError::InvalidRole { code: 999 }));

        let bad_name = UpdateUserRequest {
            id: 5,
            name: Some("x(".to_string()),
            role: 2,
            ..Default::default()
        };
        assert_eq!(
            validate_update(&bad_name),
            Err(ValidationError::RestrictedSymbol { symbol: '(' })
        );
    }
}
