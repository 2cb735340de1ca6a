//! Request validation.
//!
//! Each request shape has an ordered list of [`Rule`]s. All rules run, and
//! every failure is reported, so a client can fix every field in one round
//! trip.

use serde::{Deserialize, Serialize};

use user_apis_core::{Email, Username};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Full name length bounds (characters, after trimming).
pub const FULL_NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=50;

pub const EMAIL_MESSAGE: &str = "Please provide a valid email address";
pub const PASSWORD_LENGTH_MESSAGE: &str = "Password must be at least 6 characters long";
pub const PASSWORD_COMPLEXITY_MESSAGE: &str =
    "Password must contain at least one uppercase letter, one lowercase letter, and one number";

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Request field the rule applies to (wire name).
    pub field: &'static str,
    /// Human-readable explanation.
    pub message: &'static str,
}

/// Every rule that failed for a request, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {} violation(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    /// A single violation.
    #[must_use]
    pub fn single(field: &'static str, message: &'static str) -> Self {
        Self(vec![FieldViolation { field, message }])
    }

    /// The violations, in rule order.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }
}

/// A named predicate over a request.
pub struct Rule<T> {
    pub field: &'static str,
    pub message: &'static str,
    pub check: fn(&T) -> bool,
}

/// Run every rule against `input`, collecting all failures.
///
/// # Errors
///
/// Returns `ValidationErrors` listing each failing rule, in order.
pub fn validate<T>(input: &T, rules: &[Rule<T>]) -> Result<(), ValidationErrors> {
    let violations: Vec<FieldViolation> = rules
        .iter()
        .filter(|rule| !(rule.check)(input))
        .map(|rule| FieldViolation {
            field: rule.field,
            message: rule.message,
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

// =============================================================================
// Request shapes
// =============================================================================

/// `POST /api/users/register` body.
///
/// Missing fields deserialize as empty strings so they surface as rule
/// violations rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterUserRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `POST /admin/signup` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterAdminRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/users/login` and `POST /admin/login` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub const REGISTER_USER_RULES: &[Rule<RegisterUserRequest>] = &[
    Rule {
        field: "fullName",
        message: "Full name must be between 2 and 50 characters",
        check: |r| full_name_ok(&r.full_name),
    },
    Rule {
        field: "username",
        message: "Username must be between 3 and 30 characters",
        check: |r| username_length_ok(&r.username),
    },
    Rule {
        field: "username",
        message: "Username can only contain letters, numbers, and underscores",
        check: |r| username_charset_ok(&r.username),
    },
    Rule {
        field: "email",
        message: EMAIL_MESSAGE,
        check: |r| Email::parse(&r.email).is_ok(),
    },
    Rule {
        field: "password",
        message: PASSWORD_LENGTH_MESSAGE,
        check: |r| password_length_ok(&r.password),
    },
    Rule {
        field: "password",
        message: PASSWORD_COMPLEXITY_MESSAGE,
        check: |r| password_complexity_ok(&r.password),
    },
];

pub const REGISTER_ADMIN_RULES: &[Rule<RegisterAdminRequest>] = &[
    Rule {
        field: "email",
        message: EMAIL_MESSAGE,
        check: |r| Email::parse(&r.email).is_ok(),
    },
    Rule {
        field: "password",
        message: PASSWORD_LENGTH_MESSAGE,
        check: |r| password_length_ok(&r.password),
    },
    Rule {
        field: "password",
        message: PASSWORD_COMPLEXITY_MESSAGE,
        check: |r| password_complexity_ok(&r.password),
    },
];

pub const LOGIN_RULES: &[Rule<LoginRequest>] = &[
    Rule {
        field: "email",
        message: EMAIL_MESSAGE,
        check: |r| Email::parse(&r.email).is_ok(),
    },
    Rule {
        field: "password",
        message: "Password is required",
        check: |r| !r.password.is_empty(),
    },
];

// =============================================================================
// Predicates
// =============================================================================

fn full_name_ok(name: &str) -> bool {
    FULL_NAME_LENGTH.contains(&name.trim().chars().count())
}

fn username_length_ok(username: &str) -> bool {
    (Username::MIN_LENGTH..=Username::MAX_LENGTH).contains(&username.trim().chars().count())
}

fn username_charset_ok(username: &str) -> bool {
    username
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn password_length_ok(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn password_complexity_ok(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_user() -> RegisterUserRequest {
        RegisterUserRequest {
            full_name: "John Doe".to_owned(),
            username: "johndoe".to_owned(),
            email: "john@example.com".to_owned(),
            password: "Password123".to_owned(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate(&valid_user(), REGISTER_USER_RULES).is_ok());
    }

    #[test]
    fn test_reports_every_violation_in_rule_order() {
        let request = RegisterUserRequest {
            full_name: "T".to_owned(),
            username: "a-".to_owned(),
            email: "invalid-email".to_owned(),
            password: "weak".to_owned(),
        };

        let err = validate(&request, REGISTER_USER_RULES).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                "fullName", "username", "username", "email", "password", "password"
            ]
        );
    }

    #[test]
    fn test_password_complexity() {
        assert!(password_complexity_ok("Password123"));
        assert!(!password_complexity_ok("password123"));
        assert!(!password_complexity_ok("PASSWORD123"));
        assert!(!password_complexity_ok("Passwordabc"));
        assert!(!password_complexity_ok("ÅÅÅÅa1"));
        assert!(!password_complexity_ok("åååÅA1"));
        assert!(password_complexity_ok("ÅÅÅÅaB1"));
    }

    #[test]
    fn test_short_but_complex_password_fails_only_length() {
        let request = RegisterAdminRequest {
            email: "admin@example.com".to_owned(),
            password: "Ab1".to_owned(),
        };
        let err = validate(&request, REGISTER_ADMIN_RULES).unwrap_err();
        assert_eq!(
            err,
            ValidationErrors::single("password", PASSWORD_LENGTH_MESSAGE)
        );
    }

    #[test]
    fn test_full_name_is_trimmed_before_length_check() {
        let mut request = valid_user();
        request.full_name = "  J  ".to_owned();
        assert!(validate(&request, REGISTER_USER_RULES).is_err());
    }

    #[test]
    fn test_login_requires_password_and_email() {
        let err = validate(&LoginRequest::default(), LOGIN_RULES).unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let request: RegisterUserRequest =
            serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(request.email, "a@x.com");
        assert!(request.full_name.is_empty());
        assert!(request.password.is_empty());
    }
}
