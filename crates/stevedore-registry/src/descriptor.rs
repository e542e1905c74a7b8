//! Wire types for the resource-registry protocol

use serde::Deserialize;
use std::collections::BTreeMap;

/// A resource as returned by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub alias: Option<String>,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default)]
    pub secrets: BTreeMap<String, SecretRef>,

    #[serde(default)]
    pub files: BTreeMap<String, FileRef>,
}

/// Reference to a secret value, fetched with a second authenticated call.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretRef {
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Reference to a downloadable file, fetched unauthenticated.
#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub filename: String,
    pub fileurl: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_deserializes() {
        let body = r#"{
            "alias": "ordersdb",
            "type": "db",
            "properties": { "url": "jdbc:postgresql://db/orders", "username": "orders" },
            "secrets": { "password": { "ref": "https://registry.example.com/secret/1" } },
            "files": {}
        }"#;

        let descriptor: ResourceDescriptor = serde_json::from_str(body).unwrap();
        assert_eq!(descriptor.alias.as_deref(), Some("ordersdb"));
        assert_eq!(descriptor.kind, "db");
        assert_eq!(descriptor.properties.len(), 2);
        assert_eq!(
            descriptor.secrets["password"].reference,
            "https://registry.example.com/secret/1"
        );
    }

    #[test]
    fn test_missing_maps_default_empty() {
        let descriptor: ResourceDescriptor =
            serde_json::from_str(r#"{ "type": "db" }"#).unwrap();
        assert!(descriptor.properties.is_empty());
        assert!(descriptor.secrets.is_empty());
        assert!(descriptor.files.is_empty());
    }
}
