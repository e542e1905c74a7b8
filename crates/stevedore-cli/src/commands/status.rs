//! Status command - classify rollout progress of a deployed application
//!
//! Exit codes mirror the rollout status contract consumed by external
//! pollers: 0 = success, 3 = in progress, 1 = failed.

use console::style;

use stevedore_kube::RolloutStatus;

use crate::config::PlatformConfig;
use crate::error::Result;
use crate::exit_codes;

pub async fn run(config: &PlatformConfig, application: &str, namespace: &str) -> Result<i32> {
    let deployer = super::deployer(config).await?;
    let view = deployer.rollout_status(namespace, application).await?;

    let status = match view.status {
        RolloutStatus::Success => style("Success").green(),
        RolloutStatus::InProgress => style("InProgress").yellow(),
        RolloutStatus::Failed => style("Failed").red(),
    };

    println!("{}/{}: {} - {}", namespace, application, status, view.reason);
    println!(
        "  replicas: {} desired, {} current, {} up-to-date, {} available",
        view.desired, view.current, view.updated, view.available
    );
    for container in &view.containers {
        println!("  container {}: {}", container.name, container.image);
    }

    Ok(match view.status {
        RolloutStatus::Success => exit_codes::SUCCESS,
        RolloutStatus::InProgress => exit_codes::IN_PROGRESS,
        RolloutStatus::Failed => exit_codes::ERROR,
    })
}
