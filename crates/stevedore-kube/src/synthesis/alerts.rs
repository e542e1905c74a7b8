//! Alert-rule entry synthesis
//!
//! The manifest's alert rules are rendered into one rule group keyed by
//! application, destined for the shared alert-rules config the applier
//! upserts into.

use serde::Serialize;

use stevedore_core::{AlertRule, ApplicationManifest, DeployRequest};

use super::AlertEntry;

#[derive(Serialize)]
struct RuleGroups<'a> {
    groups: Vec<RuleGroup<'a>>,
}

#[derive(Serialize)]
struct RuleGroup<'a> {
    name: &'a str,
    rules: &'a [AlertRule],
}

pub(crate) fn synthesize_alert_entry(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
) -> Option<AlertEntry> {
    if manifest.alerts.is_empty() {
        return None;
    }

    let groups = RuleGroups {
        groups: vec![RuleGroup {
            name: &request.application,
            rules: &manifest.alerts,
        }],
    };

    let value =
        serde_yaml::to_string(&groups).expect("alert rules serialize to YAML");

    Some(AlertEntry {
        key: format!("{}.yml", request.application),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::merge_with_defaults;

    #[test]
    fn test_no_alerts_means_no_entry() {
        let request = DeployRequest::new("orders", "1.4.2", "production");
        let manifest =
            merge_with_defaults(serde_json::json!({ "image": "example.com/orders" })).unwrap();
        assert!(synthesize_alert_entry(&request, &manifest).is_none());
    }

    #[test]
    fn test_entry_keyed_by_application() {
        let request = DeployRequest::new("orders", "1.4.2", "production");
        let manifest = merge_with_defaults(serde_json::json!({
            "image": "example.com/orders",
            "alerts": [{
                "alert": "OrdersDown",
                "expr": "up == 0",
                "for": "5m",
                "annotations": { "action": "Check the orders pods" }
            }]
        }))
        .unwrap();

        let entry = synthesize_alert_entry(&request, &manifest).unwrap();
        assert_eq!(entry.key, "orders.yml");
        assert!(entry.value.contains("OrdersDown"));
        assert!(entry.value.contains("up == 0"));
        assert!(entry.value.contains("for: 5m"));
        assert!(entry.value.contains("name: orders"));
    }
}
