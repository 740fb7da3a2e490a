//! NewType wrappers for strong typing throughout the service.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing an email where a subject id is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Stable identifier of an identity, carried as the `sub` claim of
    /// issued tokens.
    ///
    /// This is a UUID string generated at registration time. It is distinct
    /// from the database record id, which is an implementation detail of the
    /// identity store and never leaves it.
    SubjectId
);

newtype_string!(
    /// A normalized email address (trimmed, lowercased).
    ///
    /// Construct via [`Email::normalized`] so lookups and uniqueness checks
    /// agree on a single canonical form.
    Email
);

newtype_string!(
    /// Correlation identifier for a single in-flight request.
    ///
    /// Echoed back to the caller in the `X-Request-ID` response header and
    /// stamped on every log line emitted while handling the request.
    RequestId
);

impl Email {
    /// Normalize a raw email string into its canonical form.
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }
}
