/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::{Duration, Instant};

use aws_types::SdkConfig;
use tracing::{info, warn};

use crate::error::GateError;
use crate::group::{AutoScalingGroups, ScalingGroups};
use crate::health::{TargetHealth, TargetHealthWaiter, DEFAULT_MAX_WAIT};
use crate::instance::InstanceId;
use crate::target_group::TargetGroup;

/// Fluent style builder for an AWS-backed [HealthGate]
#[derive(Debug, Clone)]
pub struct Builder {
    sdk_config: Option<SdkConfig>,
    max_wait: Duration,
}

impl Builder {
    fn new() -> Self {
        Self {
            sdk_config: None,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Set the configuration used by the Auto Scaling and ELBv2 clients.
    ///
    /// Without one, the clients are built from an empty [SdkConfig] with no region or
    /// credentials; requests then fail when sent rather than at construction.
    pub fn sdk_config(mut self, config: SdkConfig) -> Self {
        self.sdk_config = Some(config);
        self
    }

    /// Maximum time to wait for the instance in each target group.
    ///
    /// Default is 10 minutes.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Consumes the builder and constructs a [HealthGate]
    pub fn build(self) -> HealthGate<AutoScalingGroups, TargetHealthWaiter> {
        self.into()
    }
}

impl From<Builder> for HealthGate<AutoScalingGroups, TargetHealthWaiter> {
    fn from(value: Builder) -> Self {
        let sdk_config = value
            .sdk_config
            .unwrap_or_else(|| SdkConfig::builder().build());
        let groups = AutoScalingGroups::new(aws_sdk_autoscaling::Client::new(&sdk_config));
        let health = TargetHealthWaiter::new(aws_sdk_elasticloadbalancingv2::Client::new(
            &sdk_config,
        ))
        .max_wait(value.max_wait);
        HealthGate::new(groups, health)
    }
}

/// Outcome of a successful [HealthGate::wait_for_instance]
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GateReport {
    /// The instance that was checked
    pub instance_id: InstanceId,
    /// Scaling group that owns the instance
    pub group_name: String,
    /// Target groups the instance is healthy in, in the order they were checked
    pub target_groups: Vec<TargetGroup>,
}

/// Waits for an instance to be healthy in every target group of its scaling group.
///
/// Target groups are waited on one at a time, in the order the scaling group lists them, and
/// the first failure ends the run.
#[derive(Debug, Clone)]
pub struct HealthGate<G, H> {
    groups: G,
    health: H,
}

impl HealthGate<AutoScalingGroups, TargetHealthWaiter> {
    /// Create a new [Builder]
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<G, H> HealthGate<G, H>
where
    G: ScalingGroups,
    H: TargetHealth,
{
    /// Compose a gate from explicit capabilities
    pub fn new(groups: G, health: H) -> Self {
        Self { groups, health }
    }

    /// Block until `instance_id` is healthy in all target groups of its scaling group.
    pub async fn wait_for_instance(
        &self,
        instance_id: &InstanceId,
    ) -> Result<GateReport, GateError> {
        info!(%instance_id, "waiting until instance is healthy in its target groups");

        let group_name = self.groups.describe_group_membership(instance_id).await?;
        info!(%group_name, "found Auto Scaling group");

        let target_groups = self.groups.describe_target_groups(&group_name).await?;
        info!(%group_name, count = target_groups.len(), "listed target groups");

        for target_group in &target_groups {
            info!(%instance_id, %target_group, "waiting for instance to register healthy");
            let start = Instant::now();
            if let Err(err) = self.health.wait_until_healthy(instance_id, target_group).await {
                warn!(
                    %instance_id,
                    %target_group,
                    elapsed = ?start.elapsed(),
                    "instance did not become healthy"
                );
                return Err(err);
            }
            info!(%instance_id, %target_group, elapsed = ?start.elapsed(), "instance healthy");
        }

        info!(%instance_id, "instance healthy in all target groups");
        Ok(GateReport {
            instance_id: instance_id.clone(),
            group_name,
            target_groups,
        })
    }
}
