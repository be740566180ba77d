/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::process::ExitCode;
use std::time::Duration;

use asg_health_gate::{HealthGate, InstanceId};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_autoscaling::error::DisplayErrorContext;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "asg-health-gate", version)]
#[command(
    about = "Waits until an EC2 instance is healthy in every target group of its Auto Scaling group."
)]
struct Args {
    /// The ID of the instance
    #[arg(long)]
    instance_id: InstanceId,

    /// The AWS Region. Falls back to the default region provider chain.
    #[arg(long)]
    region: Option<String>,

    /// Named profile from the shared AWS config files
    #[arg(long)]
    profile: Option<String>,

    /// Maximum number of seconds to wait for each target group
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    max_wait: u64,
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Blocks until the instance given by `--instance-id` is healthy in all ELBv2 target groups
/// attached to its Auto Scaling group.
///
/// # Arguments
///
/// * `--instance-id INSTANCE-ID` - The EC2 instance to wait for.
/// * `[--region REGION]` - The Region in which the clients are created.
///   If not supplied, uses the default region provider chain (e.g. **AWS_REGION**).
/// * `[--profile PROFILE]` - Profile to load credentials and Region from.
/// * `[--max-wait SECONDS]` - Per target group wait limit. Defaults to 600.
#[tokio::main]
async fn main() -> ExitCode {
    setup_tracing();
    let args = Args::parse();

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = args.region {
        loader = loader.region(Region::new(region));
    }
    if let Some(profile) = args.profile {
        loader = loader.profile_name(profile);
    }
    let sdk_config = loader.load().await;

    let gate = HealthGate::builder()
        .sdk_config(sdk_config)
        .max_wait(Duration::from_secs(args.max_wait))
        .build();

    match gate.wait_for_instance(&args.instance_id).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", DisplayErrorContext(&err));
            ExitCode::FAILURE
        }
    }
}
