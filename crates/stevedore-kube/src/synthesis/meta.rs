//! Shared object metadata
//!
//! Name, namespace and labels are computed once and shared by every
//! synthesized object: the name is the application name, the namespace is
//! the deployment target, and the labels carry `app` plus `team` when the
//! owning team is known.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub(crate) fn labels(application: &str, team: Option<&str>) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), application.to_string());
    if let Some(team) = team {
        labels.insert("team".to_string(), team.to_string());
    }
    labels
}

pub(crate) fn object_meta(application: &str, namespace: &str, team: Option<&str>) -> ObjectMeta {
    named_meta(application, namespace, labels(application, team))
}

pub(crate) fn named_meta(
    name: &str,
    namespace: &str,
    labels: BTreeMap<String, String>,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(labels),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_with_team() {
        let labels = labels("orders", Some("commerce"));
        assert_eq!(labels.get("app").unwrap(), "orders");
        assert_eq!(labels.get("team").unwrap(), "commerce");
    }

    #[test]
    fn test_labels_without_team() {
        let labels = labels("orders", None);
        assert_eq!(labels.len(), 1);
        assert!(!labels.contains_key("team"));
    }

    #[test]
    fn test_object_meta() {
        let meta = object_meta("orders", "production", None);
        assert_eq!(meta.name.as_deref(), Some("orders"));
        assert_eq!(meta.namespace.as_deref(), Some("production"));
    }
}
