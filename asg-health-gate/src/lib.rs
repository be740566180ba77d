/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Deployment gate that waits for an EC2 instance to report healthy in every load balancer
//! target group attached to its Auto Scaling group.
//!
//! The work happens in three steps, each a thin layer over an AWS API:
//!
//! 1. find the Auto Scaling group that owns the instance ([`group`]),
//! 2. list the target groups that group registers instances into ([`group`]),
//! 3. for each target group, poll until the instance is `healthy` ([`health`]).
//!
//! [`HealthGate`] composes them. Every failure is returned as a [`GateError`] to the caller,
//! which decides how to exit.

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

/// Error types emitted by `asg-health-gate`
pub mod error;

/// Orchestration of group lookup, target group listing and health waits
pub mod gate;

/// Auto Scaling group membership and target group attachments
pub mod group;

/// Waiting for a target to become healthy in a target group
pub mod health;

/// EC2 instance identifiers
pub mod instance;

/// Load balancer target group references
pub mod target_group;

pub use error::GateError;
pub use gate::{GateReport, HealthGate};
pub use instance::InstanceId;
pub use target_group::TargetGroup;
