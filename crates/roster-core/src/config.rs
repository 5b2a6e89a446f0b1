//! roster.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted when `[storage].connection` is unset.
pub const CONN_ENV_VAR: &str = "ROSTER_STORE_CONN_STRING";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub storage: StorageConfig,
    pub seed: SeedConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Connection string for the candidate table store.
    /// `memory:` selects the ephemeral backend; anything else is treated as
    /// a database file path (a `file://` prefix is accepted).
    pub connection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// JSON document used to seed an empty store at startup.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 7070 }
    }
}

impl RosterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RosterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the storage connection string: the configuration key wins,
    /// the `ROSTER_STORE_CONN_STRING` environment variable is the fallback,
    /// and absence of both is a startup error.
    pub fn resolve_connection(&self) -> anyhow::Result<String> {
        if let Some(conn) = self.storage.connection.as_deref() {
            if !conn.trim().is_empty() {
                return Ok(conn.to_string());
            }
        }
        match std::env::var(CONN_ENV_VAR) {
            Ok(conn) if !conn.trim().is_empty() => Ok(conn),
            _ => anyhow::bail!(
                "storage connection string is required: set [storage].connection or {CONN_ENV_VAR}"
            ),
        }
    }
}
