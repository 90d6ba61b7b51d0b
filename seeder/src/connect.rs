//! Build authenticated store clients from the config and the service-account file.
//!
//! With an emulator host configured the credential file becomes optional: it is
//! only read for `project_id`, and requests carry the emulator's admin token.

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use tracing::info;

use crate::auth::{TokenSource, DATABASE_SCOPES, FIRESTORE_SCOPES};
use crate::config::SeedConfig;
use crate::credentials::ServiceAccountKey;
use crate::firestore::{FirestoreClient, FIRESTORE_BASE_URL};
use crate::rtdb::RealtimeDatabaseClient;

pub fn firestore_client(config: &SeedConfig) -> Result<FirestoreClient> {
    let http = Client::new();

    if let Some(host) = &config.firestore_emulator_host {
        let project_id = emulator_project_id(config)?;
        info!(%host, %project_id, "using Firestore emulator");
        return Ok(FirestoreClient::new(
            http,
            emulator_url(host)?,
            project_id,
            config.firestore_database.clone(),
            TokenSource::emulator(),
        ));
    }

    let key = ServiceAccountKey::load(&config.credentials_path)?;
    let project_id = key.project_id.clone();
    info!(%project_id, client_email = %key.client_email, "initialized service account");
    let tokens = TokenSource::service_account(http.clone(), key, FIRESTORE_SCOPES)?;

    Ok(FirestoreClient::new(
        http,
        Url::parse(FIRESTORE_BASE_URL)?,
        project_id,
        config.firestore_database.clone(),
        tokens,
    ))
}

pub fn rtdb_client(config: &SeedConfig) -> Result<RealtimeDatabaseClient> {
    let http = Client::new();

    if let Some(host) = &config.database_emulator_host {
        let project_id = emulator_project_id(config)?;
        info!(%host, %project_id, "using Realtime Database emulator");
        return Ok(RealtimeDatabaseClient::new(
            http,
            emulator_url(host)?,
            Some(project_id),
            TokenSource::emulator(),
        ));
    }

    let key = ServiceAccountKey::load(&config.credentials_path)?;
    let database_url = match &config.database_url {
        Some(url) => url.clone(),
        None => RealtimeDatabaseClient::default_url(&key.project_id)?,
    };
    info!(%database_url, client_email = %key.client_email, "initialized service account");
    let tokens = TokenSource::service_account(http.clone(), key, DATABASE_SCOPES)?;

    Ok(RealtimeDatabaseClient::new(http, database_url, None, tokens))
}

fn emulator_url(host: &str) -> Result<Url> {
    Url::parse(&format!("http://{host}"))
        .with_context(|| format!("invalid emulator host '{host}'"))
}

/// Project id from the credential file when one exists, else `GCLOUD_PROJECT`.
fn emulator_project_id(config: &SeedConfig) -> Result<String> {
    if config.credentials_path.exists() {
        return Ok(ServiceAccountKey::load(&config.credentials_path)?.project_id);
    }
    config.project_id.clone().with_context(|| {
        format!(
            "emulator needs a project id: no credential file at {} and GCLOUD_PROJECT is unset",
            config.credentials_path.display()
        )
    })
}
