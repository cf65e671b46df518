//! Authentication primitives: login credentials and password hashing.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use zeroize::Zeroizing;

use super::Error;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Login (nickname or e-mail) was blank once trimmed.
    EmptyLogin,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLogin => write!(f, "login must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `login` is trimmed and non-empty; it matches either a nickname or an
///   e-mail address.
/// - `password` is non-empty and keeps caller whitespace.
///
/// # Examples
/// ```
/// use pointsboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "secret").unwrap();
/// assert_eq!(creds.login(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(login: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = login.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyLogin);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            login: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Nickname or e-mail used for lookup.
    #[must_use]
    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    /// Password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Hash a password with Argon2id and a random salt (PHC string format).
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Check `password` against a stored PHC hash. Malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyLogin)]
    #[case("   ", "pw", LoginValidationError::EmptyLogin)]
    #[case("ada", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] login: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(login, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[rstest]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
