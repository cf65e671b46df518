//! Account roles and the request-scoped caller context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::{Error, UserId};

/// Account role. Variants are declared in ascending order of privilege so the
/// derived ordering is the role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registered participant.
    User,
    /// Staff allowed to assign points and run tournaments.
    Assistant,
    /// Manager of one or more vendor stands.
    StandManager,
    /// Full administrative access.
    Admin,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ALL: [Self; 4] = [Self::User, Self::Assistant, Self::StandManager, Self::Admin];

    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::StandManager => "stand_manager",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants at least the privileges of `required`.
    #[must_use]
    pub fn at_least(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

/// Authenticated caller identity passed explicitly into every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    user_id: UserId,
    role: Role,
}

impl RequestContext {
    /// Build a context for an authenticated user.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Authenticated user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Role at the time the request was authenticated.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Fail with `forbidden` unless the caller holds at least `required`.
    pub fn require(&self, required: Role) -> Result<(), Error> {
        if self.role.at_least(required) {
            Ok(())
        } else {
            Err(Error::forbidden(format!("requires {required} role or higher")))
        }
    }

    /// Allow the caller to act on their own resources, or on anyone's with
    /// at least `required`.
    pub fn require_self_or(&self, owner: UserId, required: Role) -> Result<(), Error> {
        if self.user_id == owner {
            Ok(())
        } else {
            self.require(required)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin, Role::StandManager, true)]
    #[case(Role::StandManager, Role::Assistant, true)]
    #[case(Role::Assistant, Role::Assistant, true)]
    #[case(Role::User, Role::Assistant, false)]
    #[case(Role::Assistant, Role::Admin, false)]
    fn hierarchy_is_total_order(#[case] held: Role, #[case] required: Role, #[case] ok: bool) {
        assert_eq!(held.at_least(required), ok);
    }

    #[rstest]
    fn parses_storage_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[rstest]
    fn self_access_skips_role_check() {
        let user = UserId::random();
        let ctx = RequestContext::new(user, Role::User);
        assert!(ctx.require_self_or(user, Role::Admin).is_ok());
        let err = ctx
            .require_self_or(UserId::random(), Role::Assistant)
            .expect_err("other user requires assistant");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
