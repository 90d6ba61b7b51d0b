use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The parts of a Google service-account key file that the loaders use.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read service account key at {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("parse service account key at {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(raw)?;
        if let Some(kind) = key.key_type.as_deref() {
            ensure!(
                kind == "service_account",
                "credential type is '{kind}', expected 'service_account'"
            );
        }
        ensure!(!key.project_id.trim().is_empty(), "project_id is empty");
        ensure!(!key.client_email.trim().is_empty(), "client_email is empty");
        Ok(key)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
