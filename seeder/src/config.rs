use anyhow::{Context, Result};
use reqwest::Url;
use std::env;
use std::path::{Path, PathBuf};

// ── Default path constants (relative to the working directory) ──────────

/// Dataset file loaded by both writers.
const DEFAULT_DATA_PATH: &str = "dummydata.json";

/// Service-account descriptor used when no override is set.
const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";

/// Firestore database id used by projects with a single database.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";

// ── Config struct ───────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub data_path: PathBuf,
    pub credentials_path: PathBuf,
    pub firestore_database: String,
    /// Realtime Database root. Derived from the project id when unset.
    pub database_url: Option<Url>,
    pub firestore_emulator_host: Option<String>,
    pub database_emulator_host: Option<String>,
    /// Fallback project id for emulator runs without a credential file.
    pub project_id: Option<String>,
}

impl SeedConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = dirs::home_dir();
        let home = home.as_deref();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials_path = var("FIRESEED_CREDENTIALS_PATH")
            .or_else(|| var("GOOGLE_APPLICATION_CREDENTIALS"))
            .map(|v| expand_tilde(&v, home))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let database_url = var("FIRESEED_DATABASE_URL")
            .map(|v| parse_database_url(&v))
            .transpose()?;

        Ok(Self {
            data_path: var("FIRESEED_DATA_PATH")
                .map(|v| expand_tilde(&v, home))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            credentials_path,
            firestore_database: var("FIRESEED_FIRESTORE_DATABASE")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
            database_url,
            firestore_emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            database_emulator_host: var("FIREBASE_DATABASE_EMULATOR_HOST"),
            project_id: var("GCLOUD_PROJECT"),
        })
    }
}

pub fn parse_database_url(input: &str) -> Result<Url> {
    Url::parse(input.trim()).with_context(|| format!("invalid database URL '{input}'"))
}

pub fn expand_tilde(input: &str, home: Option<&Path>) -> PathBuf {
    if let (Some(rest), Some(home)) = (input.strip_prefix("~/"), home) {
        return home.join(rest);
    }
    PathBuf::from(input)
}
