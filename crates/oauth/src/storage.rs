//! Per-server credential persistence for OAuth tokens and client registrations.
//!
//! Storage files are keyed by server URL to prevent credential conflicts when
//! connecting to multiple servers: each server gets a `{key}_tokens.json` and
//! a `{key}_client_info.json` slot under one cache directory.

use std::{io, path::PathBuf};

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    serde::{Serialize, de::DeserializeOwned},
    tokio::sync::RwLock,
    tracing::warn,
    url::Url,
};

use crate::{
    config_dir::lattice_config_dir,
    types::{OAuthClientInfo, OAuthTokens},
};

const TOKENS: &str = "tokens";
const CLIENT_INFO: &str = "client_info";

/// Storage backend the authorization flow drives during login and refresh.
///
/// `get_*` returns `Ok(None)` when no record has been stored yet. Backends
/// are pluggable: the flow only ever talks to this trait.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn get_tokens(&self) -> Result<Option<OAuthTokens>>;
    async fn set_tokens(&self, tokens: &OAuthTokens) -> Result<()>;
    async fn get_client_info(&self) -> Result<Option<OAuthClientInfo>>;
    async fn set_client_info(&self, info: &OAuthClientInfo) -> Result<()>;
}

/// File-based token storage at `~/.config/lattice/oauth-cache/`.
///
/// One instance covers one server. A record write replaces the whole file
/// and restricts it to owner read/write; a record that cannot be read back
/// (missing, unreadable, corrupt) is reported as absent rather than an
/// error, so a damaged cache only ever costs a re-authentication.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    server_url: Url,
    storage_dir: PathBuf,
}

impl FileTokenStore {
    /// Create a store for `server_url`. `storage_dir` overrides the default
    /// cache directory; it is created on first write if missing.
    pub fn new(server_url: &str, storage_dir: Option<PathBuf>) -> Result<Self> {
        let server_url = Url::parse(server_url)
            .with_context(|| format!("invalid server URL: {server_url}"))?;
        let storage_dir = storage_dir.unwrap_or_else(default_storage_dir);
        Ok(Self {
            server_url,
            storage_dir,
        })
    }

    /// Filesystem-safe key for this server: scheme + host + explicit port,
    /// with `:`, `/` and `.` replaced by `_`.
    ///
    /// Path and query are ignored, so URLs pointing at different endpoints
    /// of the same server share credentials. Default ports are elided by
    /// URL normalization, so `https://h:443/` and `https://h/` also match.
    pub fn cache_key(&self) -> String {
        let mut key = format!(
            "{}_{}",
            self.server_url.scheme(),
            self.server_url.host_str().unwrap_or_default(),
        );
        if let Some(port) = self.server_url.port() {
            key.push('_');
            key.push_str(&port.to_string());
        }
        key.replace([':', '/', '.'], "_")
    }

    fn record_path(&self, kind: &str) -> PathBuf {
        let key = self.cache_key();
        self.storage_dir.join(format!("{key}_{kind}.json"))
    }

    async fn read_record<T: DeserializeOwned>(&self, kind: &str) -> Option<T> {
        let path = self.record_path(kind);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read credential file");
                return None;
            },
        };
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt credential file");
                None
            },
        }
    }

    async fn write_record<T: Serialize>(&self, kind: &str, record: &T) -> Result<()> {
        let path = self.record_path(kind);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let data = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    /// Delete both record files for this server. Files already absent are
    /// skipped; calling this on an empty cache succeeds.
    pub async fn clear_all(&self) -> Result<()> {
        for kind in [TOKENS, CLIENT_INFO] {
            let path = self.record_path(kind);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {},
                Err(e) if e.kind() == io::ErrorKind::NotFound => {},
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to remove {}", path.display()));
                },
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileTokenStore {
    async fn get_tokens(&self) -> Result<Option<OAuthTokens>> {
        Ok(self.read_record(TOKENS).await)
    }

    async fn set_tokens(&self, tokens: &OAuthTokens) -> Result<()> {
        self.write_record(TOKENS, tokens).await
    }

    async fn get_client_info(&self) -> Result<Option<OAuthClientInfo>> {
        Ok(self.read_record(CLIENT_INFO).await)
    }

    async fn set_client_info(&self, info: &OAuthClientInfo) -> Result<()> {
        self.write_record(CLIENT_INFO, info).await
    }
}

/// In-memory token storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<OAuthTokens>>,
    client_info: RwLock<Option<OAuthClientInfo>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStore {
    async fn get_tokens(&self) -> Result<Option<OAuthTokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn set_tokens(&self, tokens: &OAuthTokens) -> Result<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn get_client_info(&self) -> Result<Option<OAuthClientInfo>> {
        Ok(self.client_info.read().await.clone())
    }

    async fn set_client_info(&self, info: &OAuthClientInfo) -> Result<()> {
        *self.client_info.write().await = Some(info.clone());
        Ok(())
    }
}

fn default_storage_dir() -> PathBuf {
    lattice_config_dir().join("oauth-cache")
}
