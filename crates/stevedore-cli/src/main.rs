//! Stevedore CLI - deployment reconciliation for container platforms

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use stevedore_core::{DeployRequest, RegistryCredentials};

mod commands;
mod config;
mod error;
mod exit_codes;

use config::PlatformConfig;

#[derive(Parser)]
#[command(name = "stevedore")]
#[command(author = "Stevedore Contributors")]
#[command(version)]
#[command(about = "Deployment reconciliation engine for container platforms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Platform configuration file
    #[arg(long, global = true, env = "STEVEDORE_CONFIG", default_value = "stevedore.yaml")]
    config: PathBuf,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy an application version into a namespace
    Deploy {
        /// Application name
        #[arg(short, long)]
        application: String,

        /// Version (image tag) to deploy
        #[arg(short, long)]
        version: String,

        /// Target namespace
        #[arg(short, long, default_value = "default")]
        namespace: String,

        /// Network zone for resource binding
        #[arg(short, long, default_value = "internal")]
        zone: String,

        /// Resource-registry environment
        #[arg(short, long, default_value = "p")]
        environment: String,

        /// Registry username
        #[arg(long, env = "STEVEDORE_REGISTRY_USERNAME", default_value = "")]
        registry_username: String,

        /// Registry password
        #[arg(long, env = "STEVEDORE_REGISTRY_PASSWORD", default_value = "", hide_env_values = true)]
        registry_password: String,

        /// Explicit manifest URL; disables the default location fallback
        #[arg(long)]
        manifest_url: Option<String>,

        /// Skip external resource binding
        #[arg(long)]
        skip_resource_binding: bool,
    },

    /// Show rollout status of a deployed application
    Status {
        /// Application name
        #[arg(short, long)]
        application: String,

        /// Namespace
        #[arg(short, long, default_value = "default")]
        namespace: String,
    },

    /// Migrate an application away from its old deployment location
    Migrate {
        /// Application name
        #[arg(short, long)]
        application: String,

        /// Namespace of the old deployment location
        #[arg(long)]
        old_namespace: String,

        /// Namespace of the new deployment location
        #[arg(short, long)]
        namespace: String,
    },

    /// Decommission an application's full object set
    Teardown {
        /// Application name
        #[arg(short, long)]
        application: String,

        /// Namespace
        #[arg(short, long, default_value = "default")]
        namespace: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "stevedore=debug" } else { "stevedore=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> error::Result<i32> {
    let config = PlatformConfig::load(&cli.config)?;

    match cli.command {
        Commands::Deploy {
            application,
            version,
            namespace,
            zone,
            environment,
            registry_username,
            registry_password,
            manifest_url,
            skip_resource_binding,
        } => {
            let mut request = DeployRequest::new(application, version, namespace)
                .with_zone(zone)
                .with_registry(
                    environment,
                    RegistryCredentials::new(registry_username, registry_password),
                );
            if let Some(url) = manifest_url {
                request = request.with_manifest_location(url);
            }
            if skip_resource_binding {
                request = request.skip_resource_binding();
            }
            commands::deploy::run(&config, request).await
        }
        Commands::Status {
            application,
            namespace,
        } => commands::status::run(&config, &application, &namespace).await,
        Commands::Migrate {
            application,
            old_namespace,
            namespace,
        } => commands::migrate::run(&config, &application, &old_namespace, &namespace).await,
        Commands::Teardown {
            application,
            namespace,
        } => commands::teardown::run(&config, &application, &namespace).await,
    }
}
