//! Built-in default manifest and the non-destructive defaulting merge
//!
//! Defaulting is a field-wise merge: any field left unset in the fetched
//! manifest is filled from the built-in default manifest below. Fields the
//! fetched manifest does set are never overwritten, so merging defaults
//! into a fully-specified manifest is the identity.

use serde_json::{Value, json};

use crate::error::{CoreError, Result};
use crate::manifest::ApplicationManifest;

/// The built-in default manifest as a JSON value.
///
/// Kept as a value rather than a typed struct so the merge can operate
/// field-wise on whatever subset the fetched document provides.
pub fn default_manifest_value() -> Value {
    json!({
        "image": "",
        "port": 8080,
        "healthcheck": {
            "liveness": {
                "path": "/isalive",
                "initialDelay": 20,
                "timeout": 1,
                "period": 10,
                "failureThreshold": 3
            },
            "readiness": {
                "path": "/isready",
                "initialDelay": 20,
                "timeout": 1,
                "period": 10,
                "failureThreshold": 3
            }
        },
        "resources": {
            "limits": { "cpu": "500m", "memory": "512Mi" },
            "requests": { "cpu": "200m", "memory": "256Mi" }
        },
        "replicas": {
            "min": 2,
            "max": 4,
            "cpuThresholdPercentage": 50
        },
        "ingressDisabled": false,
        "metrics": { "enabled": false, "path": "/metrics" },
        "meshEnabled": false,
        "leaderElection": false,
        "cacheCluster": false,
        "secretInjection": false,
        "usedResources": [],
        "exposedResources": [],
        "alerts": []
    })
}

/// Merge a fetched manifest document over the built-in defaults and
/// deserialize the complete result.
pub fn merge_with_defaults(fetched: Value) -> Result<ApplicationManifest> {
    let mut merged = default_manifest_value();
    deep_merge(&mut merged, &fetched);
    serde_json::from_value(merged).map_err(|e| CoreError::ManifestShape {
        message: e.to_string(),
    })
}

/// Deep merge `overlay` into `base`.
///
/// Rules:
/// - Objects: recursive merge
/// - Scalars and arrays: overlay replaces base
/// - Null in the overlay leaves the base value in place
fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base_value, overlay_value) => {
            *base_value = overlay_value.clone();
        }
    }
}
