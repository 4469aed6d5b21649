//! OAuth2 token handling for the Classroom and Drive APIs.
//!
//! Supports two credential shapes: a service account key (exchanged via a
//! signed JWT assertion) and an authorized-user file carrying a refresh
//! token. Access tokens are cached in memory and, when a cache path is
//! configured, persisted to disk across runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{DownloadError, Result};
use crate::models::{Credentials, TokenResponse};

/// Google OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Read-only scopes for course listings, materials, topics and Drive content.
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/classroom.courses.readonly",
    "https://www.googleapis.com/auth/classroom.courseworkmaterials.readonly",
    "https://www.googleapis.com/auth/classroom.topics.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,   // Issuer (service account email)
    scope: String, // OAuth scopes, space separated
    aud: String,   // Audience (token endpoint)
    exp: u64,      // Expiration time
    iat: u64,      // Issued at
}

/// Cached access token with expiration, stored as unix seconds so it can
/// round-trip through the on-disk token file.
#[derive(Clone, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    expires_at: u64,
}

/// Authenticator for Google APIs.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<Credentials>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    token_path: Option<PathBuf>,
}

impl Authenticator {
    /// Create a new authenticator from a credentials JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let credentials: Credentials = serde_json::from_str(&content)?;
        Ok(Self::new(credentials))
    }

    /// Create a new authenticator from credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
            token_path: None,
        }
    }

    /// Persist tokens at `path`, and seed the in-memory cache from an
    /// existing token file when one is present and still parseable.
    pub fn with_token_cache<P: Into<PathBuf>>(mut self, path: P) -> Self {
        let path = path.into();
        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<CachedToken>(&content) {
                Ok(token) => {
                    debug!(path = %path.display(), "loaded token cache");
                    self.cached_token = Arc::new(RwLock::new(Some(token)));
                }
                Err(e) => warn!(path = %path.display(), "ignoring unreadable token cache: {e}"),
            }
        }
        self.token_path = Some(path);
        self
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                // 60 second buffer before expiration
                if token.expires_at > unix_now() + 60 {
                    return Ok(token.access_token.clone());
                }
            }
        }

        // Refresh the token
        let new_token = self.refresh_token().await?;

        // Persist, then cache the new token
        if let Some(path) = &self.token_path {
            if let Err(e) = write_token_file(path, &new_token) {
                warn!(path = %path.display(), "failed to persist token: {e}");
            }
        }
        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    async fn refresh_token(&self) -> Result<CachedToken> {
        match self.credentials.as_ref() {
            Credentials::ServiceAccount(sa) => {
                let token_uri = sa.token_uri.as_deref().unwrap_or(TOKEN_URI);
                let now = unix_now();

                let claims = Claims {
                    iss: sa.client_email.clone(),
                    scope: SCOPES.join(" "),
                    aud: token_uri.to_string(),
                    iat: now,
                    exp: now + 3600, // 1 hour
                };

                let header = Header::new(Algorithm::RS256);
                let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes())?;
                let jwt = encode(&header, &claims, &key)?;

                let params = [
                    ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                    ("assertion", &jwt),
                ];
                self.exchange(token_uri, &params).await
            }
            Credentials::AuthorizedUser(user) => {
                let token_uri = user.token_uri.as_deref().unwrap_or(TOKEN_URI);
                let params = [
                    ("grant_type", "refresh_token"),
                    ("client_id", &user.client_id),
                    ("client_secret", &user.client_secret),
                    ("refresh_token", &user.refresh_token),
                ];
                self.exchange(token_uri, &params).await
            }
        }
    }

    async fn exchange(&self, token_uri: &str, params: &[(&str, &str)]) -> Result<CachedToken> {
        let response = self.client.post(token_uri).form(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::TokenRefreshError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at: unix_now() + token_response.expires_in,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

fn write_token_file(path: &Path, token: &CachedToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string(token)?)?;
    Ok(())
}
