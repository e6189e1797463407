//! Runtime configuration types.

use std::net::SocketAddr;

/// Where camps and speakers are stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL at the given connection URL.
    Postgres { database_url: String },
    /// Process-local store; contents are lost on restart.
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageBackend,
    /// Schema holding the camp tables.
    pub schema: String,
    pub bind_addr: SocketAddr,
    /// Overrides scheme and host of generated resource links when set.
    pub public_base_url: Option<String>,
    pub max_body_bytes: usize,
    pub seed_sample_data: bool,
    pub db_max_connections: u32,
}

pub const DEFAULT_SCHEMA: &str = "camp";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
