use crate::{Error, Result};
use tracing::{info, warn};

/// Which `Store` implementation backs the gateways of this process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis(String), // connection url
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: StoreBackend,
}

impl Config {
    const DEFAULT_BACKEND: &str = "memory";
    const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

    /// Read the configuration from the process environment, loading a `.env`
    /// file first when one exists.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment variables from {}", path.display()),
            Err(_) => info!("No .env file found, using system environment variables"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_name = lookup("CACHEGATE_STORE")
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_else(|| Self::DEFAULT_BACKEND.to_string());

        let backend = match backend_name.as_str() {
            "memory" => StoreBackend::Memory,
            "redis" => {
                let url = lookup("CACHEGATE_REDIS_URL").unwrap_or_else(|| {
                    warn!(
                        "CACHEGATE_REDIS_URL not set, using default '{}'",
                        Self::DEFAULT_REDIS_URL
                    );
                    Self::DEFAULT_REDIS_URL.to_string()
                });
                StoreBackend::Redis(url)
            }
            other => {
                return Err(Error::Config(format!(
                    "unknown CACHEGATE_STORE '{}', expected 'memory' or 'redis'",
                    other
                )));
            }
        };

        Ok(Self { backend })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_to_memory_backend() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_redis_backend_with_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHEGATE_STORE", "Redis"),
            ("CACHEGATE_REDIS_URL", "redis://cache:6380/2"),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::Redis("redis://cache:6380/2".to_string())
        );
    }

    #[test]
    fn test_redis_backend_falls_back_to_default_url() {
        let config = Config::from_lookup(lookup_from(&[("CACHEGATE_STORE", "redis")])).unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::Redis("redis://127.0.0.1:6379".to_string())
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("CACHEGATE_STORE", "memcached")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
