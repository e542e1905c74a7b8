//! Teardown command - decommission an application's full object set

use console::style;

use crate::config::PlatformConfig;
use crate::error::Result;
use crate::exit_codes;

pub async fn run(config: &PlatformConfig, application: &str, namespace: &str) -> Result<i32> {
    let deployer = super::deployer(config).await?;

    println!(
        "Tearing down {} in {}",
        style(application).cyan(),
        style(namespace).yellow()
    );

    let outcomes = deployer.teardown(application, namespace).await;

    let mut failed = false;
    for line in &outcomes {
        let symbol = if line.outcome.starts_with("failed") {
            failed = true;
            style("✗").red()
        } else {
            style("✓").green()
        };
        println!("  {} {}", symbol, line);
    }

    Ok(if failed {
        exit_codes::ERROR
    } else {
        exit_codes::SUCCESS
    })
}
