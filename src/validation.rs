//! Input rules for registration and leave submission.
//!
//! Each validator collects every failing field before returning, so a client
//! can show all problems at once.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{AppError, FieldErrors};
use crate::models::{LeaveStatus, LeaveType, Role};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub struct RegistrationInput<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub password_confirmation: Option<&'a str>,
    pub role: Option<&'a str>,
}

#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Field rules only; email uniqueness needs the database and is checked by the caller.
pub fn registration(input: &RegistrationInput<'_>) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = input.name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        errors.add("name", "Please enter your name");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.add("name", "Name cannot exceed 255 characters");
    }

    let email = normalize_email(input.email.unwrap_or_default());
    if email.is_empty() {
        errors.add("email", "Please enter your email address");
    } else if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(&email) {
        errors.add("email", "Please enter a valid email address");
    }

    let password = input.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "Please enter a password");
    } else {
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "Password must be at least 6 characters");
        }
        if input.password_confirmation != Some(password) {
            errors.add("password", "Password confirmation does not match");
        }
    }

    let role = match input.role {
        None => Role::default(),
        Some(raw) => Role::parse(raw).unwrap_or_else(|| {
            errors.add("role", "Role must be either admin or employee");
            Role::default()
        }),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidRegistration {
        name: name.to_string(),
        email,
        password: password.to_string(),
        role,
    })
}

/// Emails are compared case-insensitively everywhere; store and look up this form.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub struct LeaveInput<'a> {
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub reason: Option<&'a str>,
    pub leave_type: Option<&'a str>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub leave_type: LeaveType,
}

/// `today` is passed in so the rule is testable; handlers use the current UTC date.
pub fn new_leave(input: &LeaveInput<'_>, today: NaiveDate) -> Result<ValidLeave, AppError> {
    let mut errors = FieldErrors::new();

    let start_date = parse_date(&mut errors, "start_date", "start date", input.start_date);
    if let Some(start) = start_date {
        if start < today {
            errors.add(
                "start_date",
                "The start date field must be a date after or equal to today.",
            );
        }
    }

    let end_date = parse_date(&mut errors, "end_date", "end date", input.end_date);
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            errors.add(
                "end_date",
                "The end date field must be a date after or equal to start date.",
            );
        }
    }

    let reason = input.reason.map(str::trim).unwrap_or_default();
    if reason.is_empty() {
        errors.add("reason", "The reason field is required.");
    }

    let leave_type = match input.leave_type.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            errors.add("type", "The type field is required.");
            None
        }
        Some(raw) => {
            let parsed = LeaveType::parse(raw);
            if parsed.is_none() {
                errors.add("type", "The selected type is invalid.");
            }
            parsed
        }
    };

    match (start_date, end_date, leave_type) {
        (Some(start_date), Some(end_date), Some(leave_type)) if errors.is_empty() => Ok(ValidLeave {
            start_date,
            end_date,
            reason: reason.to_string(),
            leave_type,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

/// Only the two decisions may be requested; `pending` is not a target.
pub fn decision(status: Option<&str>) -> Result<LeaveStatus, AppError> {
    match status.map(str::trim) {
        None | Some("") => Err(AppError::Validation(FieldErrors::single(
            "status",
            "The status field is required.",
        ))),
        Some(raw) => match LeaveStatus::parse(raw) {
            Some(status @ (LeaveStatus::Approved | LeaveStatus::Rejected)) => Ok(status),
            _ => Err(AppError::Validation(FieldErrors::single(
                "status",
                "The selected status is invalid.",
            ))),
        },
    }
}

fn parse_date(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    raw: Option<&str>,
) -> Option<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            errors.add(field, &format!("The {label} field is required."));
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, &format!("The {label} field must be a valid date."));
                None
            }
        },
    }
}
