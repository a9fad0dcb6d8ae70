//! Seeder settings loaded from the environment.
//!
//! Credentials have no default: they must come from `ADMIN_USERNAME` and
//! `ADMIN_PASSWORD` (or a `.env` file).

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/?directConnection=true";
pub const DEFAULT_DATABASE: &str = "inventory";
pub const ADMIN_DATABASE: &str = "admin";
pub const DEFAULT_REPLICA_SET_NAME: &str = "rs0";
pub const DEFAULT_MEMBER_HOST: &str = "mongodb-source:27017";

/// How the seeder reacts to state left behind by a previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Any already-exists or duplicate-key failure aborts the run.
    #[default]
    Strict,
    /// Existing replica set, user, collections and documents are skipped.
    Idempotent,
}

impl FromStr for SeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SeedMode::Strict),
            "idempotent" => Ok(SeedMode::Idempotent),
            other => Err(format!(
                "unknown seed mode '{}', expected 'strict' or 'idempotent'",
                other
            )),
        }
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedMode::Strict => write!(f, "strict"),
            SeedMode::Idempotent => write!(f, "idempotent"),
        }
    }
}

#[derive(Clone, Validate)]
pub struct SeedConfig {
    #[validate(length(min = 1, message = "MONGODB_URI cannot be empty"))]
    pub mongodb_uri: String,
    #[validate(length(min = 1, message = "MONGODB_DATABASE cannot be empty"))]
    pub database: String,
    #[validate(length(min = 1, message = "REPLICA_SET_NAME cannot be empty"))]
    pub replica_set_name: String,
    #[validate(length(min = 1, message = "REPLICA_MEMBER_HOST cannot be empty"))]
    pub member_host: String,
    #[validate(length(min = 1, message = "ADMIN_USERNAME cannot be empty"))]
    pub admin_username: String,
    #[validate(length(min = 1, message = "ADMIN_PASSWORD cannot be empty"))]
    pub admin_password: String,
    pub ready_timeout_secs: u64,
    #[validate(range(min = 1, message = "READY_POLL_INTERVAL_MS must be greater than 0"))]
    pub ready_poll_interval_ms: u64,
    pub mode: SeedMode,
}

// Keeps the password out of logs.
impl fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedConfig")
            .field("mongodb_uri", &self.mongodb_uri)
            .field("database", &self.database)
            .field("replica_set_name", &self.replica_set_name)
            .field("member_host", &self.member_host)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"***")
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .field("ready_poll_interval_ms", &self.ready_poll_interval_ms)
            .field("mode", &self.mode)
            .finish()
    }
}

impl SeedConfig {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = SeedConfig {
            mongodb_uri: or_default("MONGODB_URI", DEFAULT_MONGODB_URI),
            database: or_default("MONGODB_DATABASE", DEFAULT_DATABASE),
            replica_set_name: or_default("REPLICA_SET_NAME", DEFAULT_REPLICA_SET_NAME),
            member_host: or_default("REPLICA_MEMBER_HOST", DEFAULT_MEMBER_HOST),
            admin_username: lookup("ADMIN_USERNAME").context("ADMIN_USERNAME must be set")?,
            admin_password: lookup("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?,
            ready_timeout_secs: or_default("READY_TIMEOUT_SECS", "30")
                .parse()
                .context("Invalid READY_TIMEOUT_SECS")?,
            ready_poll_interval_ms: or_default("READY_POLL_INTERVAL_MS", "1000")
                .parse()
                .context("Invalid READY_POLL_INTERVAL_MS")?,
            mode: or_default("SEED_MODE", "strict")
                .parse::<SeedMode>()
                .map_err(|e: String| anyhow!(e))
                .context("Invalid SEED_MODE")?,
        };

        config
            .validate()
            .map_err(|e| anyhow!("Invalid seed configuration: {}", e))?;

        Ok(config)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }

    /// A zero timeout means a single blind pause instead of polling.
    pub fn uses_blind_wait(&self) -> bool {
        self.ready_timeout_secs == 0
    }
}
