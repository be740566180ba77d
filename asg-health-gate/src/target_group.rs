/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A load balancer target group attached to an Auto Scaling group.
///
/// Target group ARNs have the form
/// `arn:aws:elasticloadbalancing:<region>:<account>:targetgroup/<name>/<id>`; the `<name>`
/// segment is kept alongside the ARN for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    arn: String,
    name: String,
}

impl TargetGroup {
    /// Create a `TargetGroup` from its ARN, deriving its display name.
    pub fn from_arn(arn: impl Into<String>) -> Self {
        let arn = arn.into();
        let name = display_name(&arn).to_owned();
        Self { arn, name }
    }

    /// The full target group ARN
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// Short name used in log output
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TargetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// The segment after the first `/`. An identifier without one is its own name.
fn display_name(arn: &str) -> &str {
    match arn.split('/').nth(1) {
        Some(segment) if !segment.is_empty() => segment,
        _ => arn,
    }
}
