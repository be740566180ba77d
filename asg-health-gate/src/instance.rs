/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::str::FromStr;

/// Identifier of the EC2 instance being gated, e.g. `i-0123456789abcdef0`.
///
/// Only emptiness is checked locally. Whether the identifier names a real instance is left to
/// the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    /// Create a new `InstanceId`, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidInstanceId> {
        let id = id.into();
        match id.trim() {
            "" => Err(InvalidInstanceId { _private: () }),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    /// The identifier as sent to AWS
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for InstanceId {
    type Err = InvalidInstanceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The instance identifier was empty.
#[derive(thiserror::Error, Debug)]
#[error("instance id must not be empty")]
pub struct InvalidInstanceId {
    _private: (),
}
