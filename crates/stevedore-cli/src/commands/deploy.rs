//! Deploy command - run the full reconciliation flow for one application

use console::style;

use stevedore_core::DeployRequest;

use crate::config::PlatformConfig;
use crate::error::Result;
use crate::exit_codes;

pub async fn run(config: &PlatformConfig, request: DeployRequest) -> Result<i32> {
    let deployer = super::deployer(config).await?;

    println!(
        "Deploying {} {} to {}",
        style(&request.application).cyan(),
        style(&request.version).yellow(),
        style(&request.namespace).yellow()
    );

    let outcome = deployer.deploy(&request).await?;

    for applied in &outcome.report.applied {
        println!(
            "  {} {} {} ({})",
            style("✓").green(),
            applied.kind,
            applied.name,
            applied.operation
        );
    }
    for failed in &outcome.report.failed {
        println!(
            "  {} {} {}: {}",
            style("✗").red(),
            failed.kind,
            failed.name,
            failed.error
        );
    }

    if outcome.report.is_success() {
        println!("{}", style(outcome.report.summary()).green());
        Ok(exit_codes::SUCCESS)
    } else {
        println!("{}", style(outcome.report.summary()).red());
        Ok(exit_codes::ERROR)
    }
}
