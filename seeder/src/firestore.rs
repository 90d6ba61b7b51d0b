use anyhow::{anyhow, bail, Context, Result};
use fireseed_types::encode::document_fields;
use fireseed_types::DocumentPath;
use reqwest::{Client, Url};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::auth::TokenSource;
use crate::store::DocumentStore;

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// Cloud Firestore over its REST API.
pub struct FirestoreClient {
    http: Client,
    base_url: Url,
    project_id: String,
    database: String,
    tokens: TokenSource,
}

impl FirestoreClient {
    pub fn new(
        http: Client,
        base_url: Url,
        project_id: impl Into<String>,
        database: impl Into<String>,
        tokens: TokenSource,
    ) -> Self {
        Self {
            http,
            base_url,
            project_id: project_id.into(),
            database: database.into(),
            tokens,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `.../v1/projects/{project}/databases/{database}/documents/{collection}/{doc}`
    pub fn document_url(&self, path: &DocumentPath) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("firestore base URL {} cannot hold a path", self.base_url))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                &self.project_id,
                "databases",
                &self.database,
                "documents",
                path.collection(),
                path.document(),
            ]);
        Ok(url)
    }
}

impl DocumentStore for FirestoreClient {
    async fn set_document(&self, path: &DocumentPath, body: &Map<String, Value>) -> Result<()> {
        let url = self.document_url(path)?;
        let token = self.tokens.access_token().await?;

        // No updateMask: the stored document is replaced wholesale.
        let res = self
            .http
            .patch(url)
            .bearer_auth(token)
            .json(&json!({ "fields": document_fields(body) }))
            .send()
            .await
            .with_context(|| format!("send write for {path}"))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            bail!("write to {} failed: {} - {}", path, status, text);
        }

        debug!(path = %path, "document written");
        Ok(())
    }
}
