//! Migrate command - replace an application's old deployment location

use console::style;

use stevedore_kube::{MigrationConfig, MigrationOutcome};

use crate::config::PlatformConfig;
use crate::error::Result;
use crate::exit_codes;

pub async fn run(
    config: &PlatformConfig,
    application: &str,
    old_namespace: &str,
    namespace: &str,
) -> Result<i32> {
    let deployer = super::deployer(config).await?;

    let migration_config = MigrationConfig {
        cluster_domain: config
            .cluster_domain
            .clone()
            .unwrap_or_else(|| "cluster.local".to_string()),
        ..Default::default()
    };

    let outcome = deployer
        .migrate(application, old_namespace, namespace, migration_config)
        .await?;

    match outcome {
        MigrationOutcome::NothingToMigrate => {
            println!(
                "{} no old-location service for {}, nothing to migrate",
                style("✓").green(),
                application
            );
        }
        MigrationOutcome::AlreadyRedirected => {
            println!(
                "{} {} is already redirected, leaving it alone",
                style("✓").green(),
                application
            );
        }
        MigrationOutcome::Migrated {
            redirected_to,
            teardown,
        } => {
            println!(
                "{} redirected {} -> {}",
                style("✓").green(),
                application,
                style(&redirected_to).cyan()
            );
            for line in &teardown {
                println!("  {}", line);
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}
