//! The uniform in-memory resource view produced by the binder

use std::collections::BTreeMap;

/// One bound external resource, ready for the synthesizer.
///
/// Built once per deployment attempt and consumed immutably; ordered maps
/// keep downstream synthesis deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedResource {
    /// Alias the manifest referenced the resource by
    pub name: String,

    /// Registry resource type
    pub kind: String,

    /// Flat key -> value connection properties
    pub properties: BTreeMap<String, String>,

    /// Resolved secret values
    pub secrets: BTreeMap<String, String>,

    /// Named binary certificate blobs, keyed `<alias>_<filename>`
    pub certificates: BTreeMap<String, Vec<u8>>,

    /// Host -> context-root map; only populated for the special
    /// load-balancer-config type
    pub ingresses: BTreeMap<String, String>,
}

impl ResolvedResource {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }
}
