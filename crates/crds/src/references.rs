//! Kubernetes object references for vSphere CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to one key of a `Secret` in the resource's namespace
///
/// Follows the Kubernetes `SecretKeySelector` shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyReference {
    /// Name of the Secret
    pub name: String,

    /// Key within the Secret's data
    #[serde(default = "default_secret_key")]
    pub key: String,
}

fn default_secret_key() -> String {
    "password".to_string()
}

impl SecretKeyReference {
    /// Create a reference to `key` in Secret `name`
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}
