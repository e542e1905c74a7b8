//! Environment-variable derivation
//!
//! Every resolved resource's property and secret maps become workload
//! environment variables through one deterministic naming transform, so
//! the same resource always yields the same variable name across
//! deployments. Property values inline; secret values are referenced from
//! the application's Secret object.

use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, SecretKeySelector};

use stevedore_core::{ApplicationManifest, DeployRequest};
use stevedore_registry::ResolvedResource;

/// `alias + key`, upper-cased, every non-alphanumeric byte replaced with
/// an underscore.
pub fn env_var_name(alias: &str, key: &str) -> String {
    format!("{}_{}", alias, key)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Build the complete environment for the workload container.
pub(crate) fn environment(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
    resources: &[ResolvedResource],
) -> Vec<EnvVar> {
    let mut env = vec![
        plain("APP_NAME", &request.application),
        plain("APP_VERSION", &request.version),
    ];

    if manifest.cache_cluster {
        env.push(plain(
            "CACHE_HOST",
            &format!("{}-cache", request.application),
        ));
    }

    for resource in resources {
        for (key, value) in &resource.properties {
            env.push(plain(&env_var_name(&resource.name, key), value));
        }
        for key in resource.secrets.keys() {
            let name = env_var_name(&resource.name, key);
            env.push(EnvVar {
                name: name.clone(),
                value: None,
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: request.application.clone(),
                        key: name,
                        optional: None,
                    }),
                    ..Default::default()
                }),
            });
        }
    }

    env
}

fn plain(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}
