/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::future::Future;

use tracing::debug;

use crate::error::{self, GateError};
use crate::instance::InstanceId;
use crate::target_group::TargetGroup;

/// Lookups against the service that manages scaling groups.
pub trait ScalingGroups {
    /// Name of the scaling group that owns `instance_id`.
    ///
    /// Returns [`GateError::NotFound`] when the service knows of no group for the instance. If
    /// more than one record comes back, the first one wins.
    fn describe_group_membership(
        &self,
        instance_id: &InstanceId,
    ) -> impl Future<Output = Result<String, GateError>> + Send;

    /// Target groups the scaling group registers its instances into, in service order.
    ///
    /// An empty list is a valid answer.
    fn describe_target_groups(
        &self,
        group_name: &str,
    ) -> impl Future<Output = Result<Vec<TargetGroup>, GateError>> + Send;
}

/// [`ScalingGroups`] backed by the Amazon EC2 Auto Scaling API
#[derive(Debug, Clone)]
pub struct AutoScalingGroups {
    client: aws_sdk_autoscaling::Client,
}

impl AutoScalingGroups {
    /// Wrap an existing Auto Scaling client
    pub fn new(client: aws_sdk_autoscaling::Client) -> Self {
        Self { client }
    }
}

impl ScalingGroups for AutoScalingGroups {
    async fn describe_group_membership(
        &self,
        instance_id: &InstanceId,
    ) -> Result<String, GateError> {
        let resp = self
            .client
            .describe_auto_scaling_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(|source| GateError::DescribeInstances {
                instance_id: instance_id.to_string(),
                source,
            })?;

        let instances = resp.auto_scaling_instances();
        if instances.len() > 1 {
            debug!(
                %instance_id,
                count = instances.len(),
                "multiple Auto Scaling records returned; using the first"
            );
        }

        instances
            .first()
            .and_then(|details| details.auto_scaling_group_name().map(str::to_owned))
            .ok_or_else(|| error::not_found(instance_id.as_str()))
    }

    async fn describe_target_groups(
        &self,
        group_name: &str,
    ) -> Result<Vec<TargetGroup>, GateError> {
        let mut target_groups = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let resp = self
                .client
                .describe_load_balancer_target_groups()
                .auto_scaling_group_name(group_name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|source| GateError::DescribeTargetGroups {
                    group_name: group_name.to_owned(),
                    source,
                })?;

            for attachment in resp.load_balancer_target_groups() {
                match attachment.load_balancer_target_group_arn() {
                    Some(arn) => {
                        debug!(
                            target_group = arn,
                            state = ?attachment.state(),
                            "target group attached"
                        );
                        target_groups.push(TargetGroup::from_arn(arn));
                    }
                    None => debug!(group_name, "skipping target group attachment without an ARN"),
                }
            }

            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        Ok(target_groups)
    }
}
