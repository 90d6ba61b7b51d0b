use anyhow::{bail, Result};
use fireseed_types::DocumentPath;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::store::{DocumentStore, TreeStore};

pub const TEST_PRIVATE_KEY: &str = include_str!("../testdata/test_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../testdata/test_key.pub.pem");

pub fn test_key(token_uri: &str) -> ServiceAccountKey {
    ServiceAccountKey {
        key_type: Some("service_account".to_string()),
        project_id: "demo-project".to_string(),
        private_key_id: Some("test-key-id".to_string()),
        private_key: TEST_PRIVATE_KEY.to_string(),
        client_email: "loader@demo-project.iam.gserviceaccount.com".to_string(),
        token_uri: token_uri.to_string(),
    }
}

/// In-memory stand-in for both store shapes that records every call.
#[derive(Default)]
pub struct MemoryStore {
    pub documents: Mutex<BTreeMap<String, Value>>,
    pub root: Mutex<Option<Value>>,
    pub calls: Mutex<Vec<String>>,
    /// Fail the write to this address instead of storing it.
    pub fail_on: Option<String>,
}

impl MemoryStore {
    pub fn failing_on(address: &str) -> Self {
        Self {
            fail_on: Some(address.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn document(&self, address: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(address).cloned()
    }

    pub fn root(&self) -> Option<Value> {
        self.root.lock().unwrap().clone()
    }
}

impl DocumentStore for MemoryStore {
    async fn set_document(&self, path: &DocumentPath, body: &Map<String, Value>) -> Result<()> {
        let address = path.to_string();
        self.calls.lock().unwrap().push(address.clone());
        if self.fail_on.as_deref() == Some(address.as_str()) {
            bail!("simulated write failure at {address}");
        }
        self.documents
            .lock()
            .unwrap()
            .insert(address, Value::Object(body.clone()));
        Ok(())
    }
}

impl TreeStore for MemoryStore {
    async fn set_root(&self, tree: &Value) -> Result<()> {
        self.calls.lock().unwrap().push("/".to_string());
        if self.fail_on.as_deref() == Some("/") {
            bail!("simulated write failure at /");
        }
        *self.root.lock().unwrap() = Some(tree.clone());
        Ok(())
    }
}
