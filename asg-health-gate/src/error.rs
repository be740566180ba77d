/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use aws_sdk_autoscaling::operation::describe_auto_scaling_instances::DescribeAutoScalingInstancesError;
use aws_sdk_autoscaling::operation::describe_load_balancer_target_groups::DescribeLoadBalancerTargetGroupsError;
use aws_sdk_elasticloadbalancingv2::waiters::target_in_service::WaitUntilTargetInServiceError;

pub(crate) type DescribeInstancesSdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    DescribeAutoScalingInstancesError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;
pub(crate) type DescribeTargetGroupsSdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    DescribeLoadBalancerTargetGroupsError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;

/// Failure to confirm an instance is healthy.
///
/// Every variant is terminal for a run; nothing is retried above the SDK's own retry and
/// waiter behavior.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum GateError {
    /// The instance is unknown to Auto Scaling, or does not belong to a group
    #[error("instance {instance_id} not found, or does not belong to an Auto Scaling group")]
    NotFound {
        /// The instance that was looked up
        instance_id: String,
    },

    /// `DescribeAutoScalingInstances` failed
    #[error("failed to look up the Auto Scaling group of instance {instance_id}")]
    DescribeInstances {
        /// The instance that was looked up
        instance_id: String,
        /// Underlying SDK error
        source: DescribeInstancesSdkError,
    },

    /// `DescribeLoadBalancerTargetGroups` failed
    #[error("failed to list target groups of Auto Scaling group {group_name}")]
    DescribeTargetGroups {
        /// The group whose attachments were listed
        group_name: String,
        /// Underlying SDK error
        source: DescribeTargetGroupsSdkError,
    },

    /// The instance was not healthy within the allowed wait
    #[error(
        "instance {instance_id} was not healthy in target group {target_group} after {max_wait:?}"
    )]
    WaitTimedOut {
        /// The instance being waited on
        instance_id: String,
        /// Display name of the target group
        target_group: String,
        /// The maximum wait that was exceeded
        max_wait: Duration,
    },

    /// Polling target health failed permanently
    #[error("failed waiting for instance {instance_id} to be healthy in target group {target_group}")]
    WaitFailed {
        /// The instance being waited on
        instance_id: String,
        /// Display name of the target group
        target_group: String,
        /// Underlying waiter error
        source: WaitUntilTargetInServiceError,
    },
}

impl GateError {
    /// Returns true if this error is the "instance not in any group" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GateError::NotFound { .. })
    }

    /// Returns true if this error is a health wait that ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GateError::WaitTimedOut { .. })
    }
}

pub(crate) fn not_found(instance_id: &str) -> GateError {
    GateError::NotFound {
        instance_id: instance_id.to_owned(),
    }
}
