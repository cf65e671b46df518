//! User accounts.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Role, UserId, ValidationErrors};

/// Minimum allowed nickname length.
pub const NICKNAME_MIN: usize = 3;
/// Maximum allowed nickname length.
pub const NICKNAME_MAX: usize = 32;
/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

static NICKNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn nickname_regex() -> &'static Regex {
    NICKNAME_RE.get_or_init(|| {
        // Length is enforced separately; this constrains allowed characters.
        Regex::new("^[A-Za-z0-9_]+$")
            .unwrap_or_else(|error| panic!("nickname regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Public handle chosen at registration; unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    /// Validate a nickname, returning the failure message on error.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if length < NICKNAME_MIN {
            return Err(format!("nickname must be at least {NICKNAME_MIN} characters"));
        }
        if length > NICKNAME_MAX {
            return Err(format!("nickname must be at most {NICKNAME_MAX} characters"));
        }
        if !nickname_regex().is_match(trimmed) {
            return Err("nickname may only contain letters, numbers, or underscores".to_owned());
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalised (lower-cased) e-mail address; unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an e-mail address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, String> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err("email must not be empty".to_owned());
        }
        if normalised.len() > 254 || !email_regex().is_match(&normalised) {
            return Err("email must be a valid address".to_owned());
        }
        Ok(Self(normalised))
    }

    /// Borrow as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub nickname: Nickname,
    pub email: Email,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub total_points: i64,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated registration input; the password is still plain text.
#[derive(Debug, Clone)]
pub struct Registration {
    nickname: Nickname,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration fields, reporting every failure.
    pub fn try_new(nickname: &str, email: &str, password: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let nickname = Nickname::new(nickname)
            .map_err(|message| errors.push("nickname", message))
            .ok();
        let email = Email::new(email)
            .map_err(|message| errors.push("email", message))
            .ok();
        errors.check(
            password.chars().count() >= PASSWORD_MIN,
            "password",
            format!("password must be at least {PASSWORD_MIN} characters"),
        );
        match (nickname, email) {
            (Some(nickname), Some(email)) if errors.is_empty() => Ok(Self {
                nickname,
                email,
                password: Zeroizing::new(password.to_owned()),
            }),
            _ => Err(errors),
        }
    }

    /// Validated nickname.
    #[must_use]
    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    /// Normalised e-mail.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password to be hashed.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Record handed to the user repository on registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: UserId,
    pub nickname: Nickname,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
