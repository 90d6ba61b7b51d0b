//! OAuth 2.0 access tokens for Google APIs via the JWT-bearer grant.
//!
//! A service account signs a short-lived RS256 assertion with its private key
//! and trades it at `token_uri` for a bearer token. Tokens are cached and only
//! re-fetched when they are about to expire.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::credentials::ServiceAccountKey;

pub const FIRESTORE_SCOPES: &[&str] = &["https://www.googleapis.com/auth/datastore"];

pub const DATABASE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Bearer token the Firebase emulators accept as an administrator.
pub const EMULATOR_TOKEN: &str = "owner";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

pub enum TokenSource {
    ServiceAccount(Box<ServiceAccountTokens>),
    Static(String),
}

impl TokenSource {
    pub fn service_account(http: Client, key: ServiceAccountKey, scopes: &[&str]) -> Result<Self> {
        Ok(Self::ServiceAccount(Box::new(ServiceAccountTokens::new(
            http, key, scopes,
        )?)))
    }

    pub fn emulator() -> Self {
        Self::Static(EMULATOR_TOKEN.to_string())
    }

    pub async fn access_token(&self) -> Result<String> {
        match self {
            Self::ServiceAccount(tokens) => tokens.access_token().await,
            Self::Static(token) => Ok(token.clone()),
        }
    }
}

pub struct ServiceAccountTokens {
    http: Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

#[derive(Clone, Debug)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl ServiceAccountTokens {
    pub fn new(http: Client, key: ServiceAccountKey, scopes: &[&str]) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("service account private_key is not a valid RSA PEM key")?;
        Ok(Self {
            http,
            key,
            signing_key,
            scope: scopes.join(" "),
            cached: Mutex::new(None),
        })
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.signing_key).context("sign token assertion")
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        let assertion = self.assertion(now)?;
        let res = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .context("send token request")?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            bail!("token request failed: {} - {}", status, text);
        }

        let body: TokenResponse = res.json().await.context("decode token response")?;
        let lifetime = body.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        debug!(
            client_email = %self.key.client_email,
            expires_in = lifetime,
            "fetched access token"
        );

        Ok(AccessToken {
            token: body.access_token,
            expires_at: now + Duration::seconds(lifetime),
        })
    }
}
