//! Strongly typed identifiers.
//!
//! Catalog rows are keyed by integers in the content store; players and
//! sessions by UUID. Wrapping them keeps a step id from being passed where a
//! story id is expected, which matters because `final` steps reference
//! stories.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw integer value.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Identifier of a story.
    StoryId
);
catalog_id!(
    /// Identifier of a flow step.
    StepId
);
catalog_id!(
    /// Identifier of a catalog reward.
    RewardId
);
catalog_id!(
    /// Identifier of a character.
    CharacterId
);
catalog_id!(
    /// Identifier of a media resource.
    MediaId
);

/// Identifier of a player profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a running flow session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generates a fresh session identifier.
    #[must_use]
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&StepId(9)).unwrap();
        assert_eq!(json, "9");
        let back: StoryId = serde_json::from_str("99").unwrap();
        assert_eq!(back, StoryId(99));
    }
}
