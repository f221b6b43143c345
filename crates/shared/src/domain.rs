use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// The server decides which door values it accepts; the panel never
// interprets them.
opaque_id!(DoorId);
opaque_id!(ControlId);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("CSRF token must not be empty")]
pub struct InvalidCsrfToken;

/// Anti-forgery credential handed to the panel by the host page. Forwarded
/// verbatim on every state-changing request, never parsed or rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidCsrfToken> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvalidCsrfToken);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
