//! Load `AppConfig` from environment variables (after an optional `.env`).

use crate::config::types::*;
use crate::error::ConfigError;
use regex::Regex;
use std::net::SocketAddr;
use std::str::FromStr;

const IDENT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

impl AppConfig {
    /// Read configuration from the process environment. Loads `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let storage = match get("DATABASE_URL") {
            Some(database_url) => StorageBackend::Postgres { database_url },
            None => StorageBackend::Memory,
        };

        let schema = get("CAMP_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        let ident = Regex::new(IDENT_PATTERN).map_err(|e| ConfigError::Load(e.to_string()))?;
        if !ident.is_match(&schema) {
            return Err(ConfigError::Invalid {
                key: "CAMP_SCHEMA",
                value: schema,
            });
        }

        let bind_addr: SocketAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;

        let public_base_url = get("PUBLIC_BASE_URL");
        if let Some(base) = &public_base_url {
            if url::Url::parse(base).map(|u| u.cannot_be_a_base()).unwrap_or(true) {
                return Err(ConfigError::Invalid {
                    key: "PUBLIC_BASE_URL",
                    value: base.clone(),
                });
            }
        }

        let max_body_bytes: usize = parse_or("MAX_BODY_BYTES", get("MAX_BODY_BYTES"), Some(DEFAULT_MAX_BODY_BYTES))?;
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            Some(DEFAULT_DB_MAX_CONNECTIONS),
        )?;
        let seed_sample_data = match get("SEED_SAMPLE_DATA") {
            None => false,
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid {
                key: "SEED_SAMPLE_DATA",
                value: v,
            })?,
        };

        Ok(AppConfig {
            storage,
            schema,
            bind_addr,
            public_base_url,
            max_body_bytes,
            seed_sample_data,
            db_max_connections,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
        None => default.ok_or_else(|| ConfigError::Load(format!("no default for {}", key))),
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_use_memory_storage() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.schema, "camp");
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.max_body_bytes, 65536);
        assert!(!cfg.seed_sample_data);
        assert!(cfg.public_base_url.is_none());
    }

    #[test]
    fn reads_every_key() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://localhost/camps"),
            ("CAMP_SCHEMA", "events"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("PUBLIC_BASE_URL", "https://camps.example.com"),
            ("MAX_BODY_BYTES", "1024"),
            ("SEED_SAMPLE_DATA", "yes"),
            ("DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageBackend::Postgres {
                database_url: "postgres://localhost/camps".into()
            }
        );
        assert_eq!(cfg.schema, "events");
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.public_base_url.as_deref(), Some("https://camps.example.com"));
        assert_eq!(cfg.max_body_bytes, 1024);
        assert!(cfg.seed_sample_data);
        assert_eq!(cfg.db_max_connections, 12);
    }

    #[test]
    fn blank_database_url_means_memory() {
        let cfg = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("CAMP_SCHEMA", "camp; DROP TABLE x")]),
            Err(ConfigError::Invalid { key: "CAMP_SCHEMA", .. })
        ));
        assert!(matches!(
            load(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            load(&[("SEED_SAMPLE_DATA", "maybe")]),
            Err(ConfigError::Invalid { key: "SEED_SAMPLE_DATA", .. })
        ));
        assert!(matches!(
            load(&[("PUBLIC_BASE_URL", "not a url")]),
            Err(ConfigError::Invalid { key: "PUBLIC_BASE_URL", .. })
        ));
    }
}
