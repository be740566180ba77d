/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::future::Future;
use std::time::Duration;

use aws_sdk_elasticloadbalancingv2::client::Waiters;
use aws_sdk_elasticloadbalancingv2::types::TargetDescription;
use aws_sdk_elasticloadbalancingv2::waiters::target_in_service::WaitUntilTargetInServiceError;
use aws_smithy_runtime_api::client::waiters::error::WaiterError;

use crate::error::GateError;
use crate::instance::InstanceId;
use crate::target_group::TargetGroup;

/// Default upper bound on a single target group wait.
///
/// Matches the classic `TargetInService` waiter budget of 40 polls, 15 seconds apart.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);

/// Blocks until a target reports healthy in a target group.
pub trait TargetHealth {
    /// Resolves once `instance_id` is healthy in `target_group`, or fails permanently.
    ///
    /// Polling cadence and the definition of "keep waiting" belong to the implementation; the
    /// caller does not retry.
    fn wait_until_healthy(
        &self,
        instance_id: &InstanceId,
        target_group: &TargetGroup,
    ) -> impl Future<Output = Result<(), GateError>> + Send;
}

/// [`TargetHealth`] backed by the ELBv2 `TargetInService` waiter.
///
/// The waiter polls `DescribeTargetHealth` starting 15 seconds apart with exponential backoff
/// (capped at 120 seconds) until every returned target is `healthy`. The `InvalidInstance`
/// error is treated as "not registered yet" and polled through. Any other error ends the wait.
#[derive(Debug, Clone)]
pub struct TargetHealthWaiter {
    client: aws_sdk_elasticloadbalancingv2::Client,
    max_wait: Duration,
}

impl TargetHealthWaiter {
    /// Wrap an existing ELBv2 client, waiting at most [`DEFAULT_MAX_WAIT`] per target group.
    pub fn new(client: aws_sdk_elasticloadbalancingv2::Client) -> Self {
        Self {
            client,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Maximum time to wait for a single target group before giving up
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

impl TargetHealth for TargetHealthWaiter {
    async fn wait_until_healthy(
        &self,
        instance_id: &InstanceId,
        target_group: &TargetGroup,
    ) -> Result<(), GateError> {
        let target = TargetDescription::builder().id(instance_id.as_str()).build();

        self.client
            .wait_until_target_in_service()
            .target_group_arn(target_group.arn())
            .targets(target)
            .wait(self.max_wait)
            .await
            .map_err(|err| wait_failed(instance_id, target_group, self.max_wait, err))?;
        Ok(())
    }
}

fn wait_failed(
    instance_id: &InstanceId,
    target_group: &TargetGroup,
    max_wait: Duration,
    err: WaitUntilTargetInServiceError,
) -> GateError {
    match err {
        WaiterError::ExceededMaxWait(_) => GateError::WaitTimedOut {
            instance_id: instance_id.to_string(),
            target_group: target_group.name().to_owned(),
            max_wait,
        },
        source => GateError::WaitFailed {
            instance_id: instance_id.to_string(),
            target_group: target_group.name().to_owned(),
            source,
        },
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use aws_sdk_elasticloadbalancingv2::error::ErrorMetadata;
    use aws_sdk_elasticloadbalancingv2::operation::describe_target_health::{
        DescribeTargetHealthError, DescribeTargetHealthOutput,
    };
    use aws_sdk_elasticloadbalancingv2::types::error::TargetGroupNotFoundException;
    use aws_sdk_elasticloadbalancingv2::types::{
        TargetDescription, TargetHealth as TargetHealthState, TargetHealthDescription,
        TargetHealthStateEnum,
    };
    use aws_sdk_elasticloadbalancingv2::Client;
    use aws_smithy_async::time::SystemTimeSource;
    use aws_smithy_mocks::{mock, mock_client, MockResponse, RuleMode};

    use super::{TargetHealth, TargetHealthWaiter};
    use crate::error::GateError;
    use crate::instance::InstanceId;
    use crate::target_group::TargetGroup;

    const WEB_ARN: &str =
        "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/tg-web/0123456789abcdef";
    const API_ARN: &str =
        "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/tg-api/fedcba9876543210";

    fn target_in_state(
        instance_id: &'static str,
        state: TargetHealthStateEnum,
    ) -> DescribeTargetHealthOutput {
        DescribeTargetHealthOutput::builder()
            .target_health_descriptions(
                TargetHealthDescription::builder()
                    .target(TargetDescription::builder().id(instance_id).build())
                    .target_health(TargetHealthState::builder().state(state).build())
                    .build(),
            )
            .build()
    }

    fn healthy(instance_id: &'static str) -> DescribeTargetHealthOutput {
        target_in_state(instance_id, TargetHealthStateEnum::Healthy)
    }

    #[tokio::test]
    async fn test_returns_once_target_is_healthy() {
        let describe = mock!(Client::describe_target_health)
            .match_requests(|req| {
                req.target_group_arn() == Some(WEB_ARN)
                    && req.targets().len() == 1
                    && req.targets()[0].id() == Some("i-0123")
            })
            .then_output(|| healthy("i-0123"));
        let client = mock_client!(aws_sdk_elasticloadbalancingv2, &[&describe]);

        TargetHealthWaiter::new(client)
            .wait_until_healthy(
                &InstanceId::new("i-0123").unwrap(),
                &TargetGroup::from_arn(WEB_ARN),
            )
            .await
            .unwrap();
        assert_eq!(1, describe.num_calls());
    }

    #[tokio::test]
    async fn test_unexpected_error_ends_the_wait() {
        let describe = mock!(Client::describe_target_health).then_error(|| {
            DescribeTargetHealthError::TargetGroupNotFoundException(
                TargetGroupNotFoundException::builder()
                    .message("One or more target groups not found")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_elasticloadbalancingv2, &[&describe]);

        let err = TargetHealthWaiter::new(client)
            .wait_until_healthy(
                &InstanceId::new("i-0123").unwrap(),
                &TargetGroup::from_arn(WEB_ARN),
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, GateError::WaitFailed { ref target_group, .. } if target_group == "tg-web"),
            "{err:?}"
        );
        assert!(!err.is_timeout());
        assert_eq!(1, describe.num_calls());
    }

    // Polls are at least 15 seconds apart; paused time lets the sleep elapse instantly.
    #[tokio::test(start_paused = true)]
    async fn test_polls_through_invalid_instance() {
        let not_registered = mock!(Client::describe_target_health).then_error(|| {
            DescribeTargetHealthError::generic(
                ErrorMetadata::builder()
                    .code("InvalidInstance")
                    .message("The following targets are not valid instances: i-0123")
                    .build(),
            )
        });
        let registered = mock!(Client::describe_target_health).then_output(|| healthy("i-0123"));
        let client = mock_client!(
            aws_sdk_elasticloadbalancingv2,
            RuleMode::Sequential,
            &[&not_registered, &registered]
        );

        TargetHealthWaiter::new(client)
            .wait_until_healthy(
                &InstanceId::new("i-0123").unwrap(),
                &TargetGroup::from_arn(WEB_ARN),
            )
            .await
            .unwrap();
        assert_eq!(1, not_registered.num_calls());
        assert_eq!(1, registered.num_calls());
    }

    // The test config uses a static clock, which never reaches the waiter's deadline.
    #[tokio::test]
    async fn test_unhealthy_target_times_out() {
        let initial = mock!(Client::describe_target_health).then_compute_response(|_| {
            MockResponse::Output(target_in_state(
                "i-0123",
                TargetHealthStateEnum::Initial,
            ))
        });
        let client = mock_client!(
            aws_sdk_elasticloadbalancingv2,
            RuleMode::MatchAny,
            &[&initial],
            |conf| conf.time_source(SystemTimeSource::new())
        );

        let err = TargetHealthWaiter::new(client)
            .max_wait(Duration::from_secs(1))
            .wait_until_healthy(
                &InstanceId::new("i-0123").unwrap(),
                &TargetGroup::from_arn(API_ARN),
            )
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        assert!(
            matches!(
                err,
                GateError::WaitTimedOut { ref target_group, max_wait, .. }
                    if target_group == "tg-api" && max_wait == Duration::from_secs(1)
            ),
            "{err:?}"
        );
        assert!(initial.num_calls() >= 1);
    }
}
