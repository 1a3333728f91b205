//! Newtype wrappers for string identifiers, providing compile-time type safety.
//!
//! All newtypes serialize/deserialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for String {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Full 64-character hex identity of a concretized build plan.
    PlanId
);

string_newtype!(
    /// Truncated 12-character prefix of a [`PlanId`], used for display.
    ShortId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_id_display_and_as_ref() {
        let id = PlanId::new("deadbeef");
        assert_eq!(id.to_string(), "deadbeef");
        assert_eq!(id.as_str(), "deadbeef");
        assert_eq!(AsRef::<str>::as_ref(&id), "deadbeef");
    }

    #[test]
    fn plan_id_serde_roundtrip() {
        let id = PlanId::new("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: PlanId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn short_id_from_str() {
        let sid = ShortId::from("abc123def456");
        assert_eq!(sid.as_str(), "abc123def456");
    }

    #[test]
    fn plan_id_into_inner() {
        let id = PlanId::new("abc".to_owned());
        assert_eq!(id.into_inner(), "abc");
    }

    #[test]
    fn plan_id_equality_with_string() {
        let id = PlanId::new("abc123");
        assert_eq!(id, *"abc123");
        assert_eq!(id, "abc123".to_owned());
    }
}
