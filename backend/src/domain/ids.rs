//! Strongly typed entity identifiers.
//!
//! Every aggregate is keyed by a UUID wrapped in its own newtype so a stand id
//! can never be passed where a product id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Registered account identifier.
    UserId
);
define_id!(
    /// Event identifier.
    EventId
);
define_id!(
    /// Tournament identifier.
    TournamentId
);
define_id!(
    /// Vendor stand identifier.
    StandId
);
define_id!(
    /// Product identifier.
    ProductId
);
define_id!(
    /// Claim identifier.
    ClaimId
);
define_id!(
    /// Ledger entry identifier.
    TransactionId
);
define_id!(
    /// Notification identifier.
    NotificationId
);
