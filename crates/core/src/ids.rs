// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque identifiers handed to us by the job manager and the cloud API.
//!
//! Unlike locally generated identifiers, these come from external systems
//! we do not control the shape of, so they are thin `String` newtypes
//! rather than a fixed-capacity inline buffer.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! define_opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
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

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_opaque_id!(
    /// A cloud load balancer, opaque to everything except the connector.
    LoadBalancerId
);
define_opaque_id!(
    /// A job as known to the job manager.
    JobId
);
define_opaque_id!(
    /// A single running task belonging to a job.
    TaskId
);

/// A dotted-quad container IP address.
///
/// Stored as the original string so it round-trips through the cloud API
/// unchanged; validation only rejects structurally malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpAddress(String);

impl IpAddress {
    /// Parse a dotted-quad string, rejecting anything that isn't four
    /// dot-separated octets of digits.
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidIpAddress> {
        let raw = raw.into();
        let octets: Vec<&str> = raw.split('.').collect();
        if octets.len() != 4 || !octets.iter().all(|o| !o.is_empty() && o.bytes().all(|b| b.is_ascii_digit())) {
            return Err(InvalidIpAddress(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IpAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IpAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid dotted-quad ip address: {0:?}")]
pub struct InvalidIpAddress(String);

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
