//! Manifest validation rule set
//!
//! Every rule is independent and all of them are evaluated on every call;
//! a manifest is rejected with the complete list of violations, never just
//! the first one.

use std::collections::BTreeMap;

use crate::manifest::ApplicationManifest;
use crate::quantity::parse_quantity;

/// One rule violation, with the offending manifest fields by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Stable rule name
    pub rule: &'static str,

    /// Human-readable explanation
    pub message: String,

    /// Offending field -> value
    pub fields: BTreeMap<String, String>,
}

impl ValidationFailure {
    fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    fn with_field(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.fields.insert(field.into(), value.to_string());
        self
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)?;
        if !self.fields.is_empty() {
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, " ({})", fields.join(", "))?;
        }
        Ok(())
    }
}

/// Run the full rule set. An empty vec means the manifest is valid.
pub fn validate(manifest: &ApplicationManifest) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    check_image_has_no_tag(manifest, &mut failures);
    check_replicas(manifest, &mut failures);
    check_cpu_threshold(manifest, &mut failures);
    check_memory_quantities(manifest, &mut failures);
    check_resource_references(manifest, &mut failures);
    check_alert_rules(manifest, &mut failures);

    failures
}

/// The version is supplied by the deployment request; a tag baked into the
/// image reference could silently diverge from it.
fn check_image_has_no_tag(manifest: &ApplicationManifest, failures: &mut Vec<ValidationFailure>) {
    let last_segment = manifest
        .image
        .rsplit('/')
        .next()
        .unwrap_or(manifest.image.as_str());

    if last_segment.contains(':') {
        failures.push(
            ValidationFailure::new(
                "imageHasNoTag",
                "image must not carry a tag; the version comes from the deployment request",
            )
            .with_field("image", &manifest.image),
        );
    }
}

fn check_replicas(manifest: &ApplicationManifest, failures: &mut Vec<ValidationFailure>) {
    let replicas = &manifest.replicas;

    if replicas.max == 0 {
        failures.push(
            ValidationFailure::new("replicasMaxSet", "replicas.max must be set and non-zero")
                .with_field("replicas.max", replicas.max),
        );
    }
    if replicas.min == 0 {
        failures.push(
            ValidationFailure::new("replicasMinSet", "replicas.min must be set and non-zero")
                .with_field("replicas.min", replicas.min),
        );
    }
    if replicas.min > replicas.max {
        failures.push(
            ValidationFailure::new(
                "replicasBounds",
                "replicas.min must not exceed replicas.max",
            )
            .with_field("replicas.min", replicas.min)
            .with_field("replicas.max", replicas.max),
        );
    }
}

fn check_cpu_threshold(manifest: &ApplicationManifest, failures: &mut Vec<ValidationFailure>) {
    let threshold = manifest.replicas.cpu_threshold_percentage;
    if !(10..=90).contains(&threshold) {
        failures.push(
            ValidationFailure::new(
                "cpuThresholdRange",
                "replicas.cpuThresholdPercentage must be between 10 and 90",
            )
            .with_field("replicas.cpuThresholdPercentage", threshold),
        );
    }
}

fn check_memory_quantities(manifest: &ApplicationManifest, failures: &mut Vec<ValidationFailure>) {
    let quantities = [
        ("resources.requests.memory", &manifest.resources.requests.memory),
        ("resources.limits.memory", &manifest.resources.limits.memory),
    ];

    for (field, quantity) in quantities {
        if parse_quantity(quantity).is_err() {
            failures.push(
                ValidationFailure::new(
                    "memoryQuantity",
                    "memory quantity does not match the quantity grammar",
                )
                .with_field(field, quantity),
            );
        }
    }
}

fn check_resource_references(
    manifest: &ApplicationManifest,
    failures: &mut Vec<ValidationFailure>,
) {
    for (index, used) in manifest.used_resources.iter().enumerate() {
        if used.alias.is_empty() || used.kind.is_empty() {
            failures.push(
                ValidationFailure::new(
                    "resourceReference",
                    "used resource needs a non-empty alias and type",
                )
                .with_field(format!("usedResources[{}].alias", index), &used.alias)
                .with_field(format!("usedResources[{}].type", index), &used.kind),
            );
        }
    }

    for (index, exposed) in manifest.exposed_resources.iter().enumerate() {
        if exposed.alias.is_empty() || exposed.kind.is_empty() {
            failures.push(
                ValidationFailure::new(
                    "resourceReference",
                    "exposed resource needs a non-empty alias and type",
                )
                .with_field(format!("exposedResources[{}].alias", index), &exposed.alias)
                .with_field(format!("exposedResources[{}].type", index), &exposed.kind),
            );
        }
    }
}

fn check_alert_rules(manifest: &ApplicationManifest, failures: &mut Vec<ValidationFailure>) {
    for (index, rule) in manifest.alerts.iter().enumerate() {
        let action = rule.annotations.get("action").map(String::as_str);
        if rule.alert.is_empty()
            || rule.expr.is_empty()
            || rule.for_duration.is_empty()
            || action.unwrap_or("").is_empty()
        {
            failures.push(
                ValidationFailure::new(
                    "alertRule",
                    "alert rule needs alert, expr, for and an action annotation",
                )
                .with_field(format!("alerts[{}].alert", index), &rule.alert)
                .with_field(format!("alerts[{}].expr", index), &rule.expr)
                .with_field(format!("alerts[{}].for", index), &rule.for_duration)
                .with_field(
                    format!("alerts[{}].annotations.action", index),
                    action.unwrap_or(""),
                ),
            );
        }
    }
}
