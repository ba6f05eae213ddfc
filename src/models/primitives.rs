//! Primitive types and newtypes for type-safe API interactions.
//!
//! This module provides strongly-typed wrappers around string identifiers
//! to prevent mixing up different types of IDs at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
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
    };
}

string_id!(
    /// A strongly-typed account ID, e.g. `acc_00009237aqC8c5umZmrRdh`.
    ///
    /// # Example
    ///
    /// ```
    /// use mondo_rs::AccountId;
    ///
    /// let account = AccountId::new("acc_00009237aqC8c5umZmrRdh");
    /// println!("Account: {}", account);
    /// ```
    AccountId
);

string_id!(
    /// A strongly-typed transaction ID, e.g. `tx_00008zIcpb1TB4yeIFXMzx`.
    TransactionId
);

string_id!(
    /// A strongly-typed merchant ID, e.g. `merch_00008zIcpbAKe8shBxXUtl`.
    MerchantId
);

/// Environment configuration for the Mondo API.
///
/// # Example
///
/// ```
/// use mondo_rs::Environment;
///
/// let env = Environment::Staging;
/// println!("API URL: {}", env.api_base_url());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production API.
    #[default]
    Production,
    /// Staging API, commonly available during hackathons.
    Staging,
}

impl Environment {
    /// Get the base URL for REST API requests. Always ends with `/`.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.getmondo.co.uk/",
            Environment::Staging => "https://staging-api.gmon.io/",
        }
    }

    /// Returns `true` if this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Staging => write!(f, "staging"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown environment: {}",
                other
            ))),
        }
    }
}
