use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::auth::TokenSource;
use crate::store::TreeStore;

/// Firebase Realtime Database over its REST API.
pub struct RealtimeDatabaseClient {
    http: Client,
    database_url: Url,
    /// Database namespace, needed only when talking to the emulator.
    namespace: Option<String>,
    tokens: TokenSource,
}

impl RealtimeDatabaseClient {
    pub fn new(
        http: Client,
        database_url: Url,
        namespace: Option<String>,
        tokens: TokenSource,
    ) -> Self {
        Self {
            http,
            database_url,
            namespace,
            tokens,
        }
    }

    /// Default database URL for a project created after the multi-database rollout.
    pub fn default_url(project_id: &str) -> Result<Url> {
        let raw = format!("https://{project_id}-default-rtdb.firebaseio.com");
        Url::parse(&raw).with_context(|| format!("derive database URL for project '{project_id}'"))
    }

    /// `{database_url}/.json`, plus `?ns=` for the emulator.
    pub fn root_url(&self) -> Result<Url> {
        let mut url = self.database_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("database URL {} cannot hold a path", self.database_url))?
            .pop_if_empty()
            .push(".json");
        if let Some(ns) = &self.namespace {
            url.query_pairs_mut().append_pair("ns", ns);
        }
        Ok(url)
    }
}

impl TreeStore for RealtimeDatabaseClient {
    async fn set_root(&self, tree: &Value) -> Result<()> {
        let url = self.root_url()?;
        let token = self.tokens.access_token().await?;

        let res = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(tree)
            .send()
            .await
            .context("send root overwrite")?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            bail!("root overwrite failed: {} - {}", status, text);
        }

        debug!(url = %self.database_url, "root overwritten");
        Ok(())
    }
}
