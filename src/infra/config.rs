//! Centralized configuration (environment variables + defaults).
//!
//! Everything is read once at process start into [`AppConfig`] and passed down explicitly.

use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GcsConfig {
    pub bucket: String,
    pub access_token: String,
    pub base_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripeConfig {
    pub secret_key: String,
    pub base_url: String,
    pub currency: String,
}

/// Which adapters the process wires in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// In-process index, object store and gateway (local development, demos).
    Memory,
    Remote {
        elasticsearch: ElasticsearchConfig,
        gcs: GcsConfig,
        stripe: StripeConfig,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Name of the index collection holding app documents.
    pub app_index: String,
    /// Header carrying the identity established by the upstream identity provider.
    pub identity_header: String,
    pub http_timeout: Duration,
    pub max_upload_bytes: usize,
    pub backends: BackendConfig,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| get(key).ok_or_else(|| anyhow!("{} must be set", key));

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        let http_timeout_secs = get("HTTP_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("HTTP_TIMEOUT_SECS must be a valid u64")?
            .unwrap_or(30)
            .max(1);

        let max_upload_bytes = get("MAX_UPLOAD_BYTES")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("MAX_UPLOAD_BYTES must be a valid usize")?
            .unwrap_or(64 * 1024 * 1024);

        let backends = match get("BACKEND").as_deref().unwrap_or("remote") {
            "memory" => BackendConfig::Memory,
            "remote" => BackendConfig::Remote {
                elasticsearch: ElasticsearchConfig {
                    url: required("ES_URL")?,
                    username: get("ES_USERNAME"),
                    password: get("ES_PASSWORD"),
                },
                gcs: GcsConfig {
                    bucket: required("GCS_BUCKET")?,
                    access_token: required("GCS_ACCESS_TOKEN")?,
                    base_url: get("GCS_BASE_URL")
                        .unwrap_or_else(|| "https://storage.googleapis.com".to_string()),
                },
                stripe: StripeConfig {
                    secret_key: required("STRIPE_SECRET_KEY")?,
                    base_url: get("STRIPE_BASE_URL")
                        .unwrap_or_else(|| "https://api.stripe.com".to_string()),
                    currency: get("STRIPE_CURRENCY").unwrap_or_else(|| "usd".to_string()),
                },
            },
            other => {
                return Err(anyhow!(
                    "BACKEND must be 'remote' or 'memory' (got '{}')",
                    other
                ))
            }
        };

        Ok(Self {
            bind_addr,
            app_index: get("ES_APP_INDEX").unwrap_or_else(|| "apps".to_string()),
            identity_header: get("IDENTITY_HEADER")
                .unwrap_or_else(|| "x-authenticated-user".to_string())
                .to_ascii_lowercase(),
            http_timeout: Duration::from_secs(http_timeout_secs),
            max_upload_bytes,
            backends,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let config = AppConfig::from_lookup(lookup(&[("BACKEND", "memory")])).unwrap();
        assert_eq!(config.backends, BackendConfig::Memory);
        assert_eq!(config.app_index, "apps");
        assert_eq!(config.identity_header, "x-authenticated-user");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn remote_backend_reads_every_section() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ES_URL", "http://es:9200"),
            ("ES_USERNAME", "elastic"),
            ("GCS_BUCKET", "media"),
            ("GCS_ACCESS_TOKEN", "ya29.token"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
            ("STRIPE_CURRENCY", "eur"),
            ("IDENTITY_HEADER", "X-User"),
        ]))
        .unwrap();

        match config.backends {
            BackendConfig::Remote {
                elasticsearch,
                gcs,
                stripe,
            } => {
                assert_eq!(elasticsearch.url, "http://es:9200");
                assert_eq!(elasticsearch.username.as_deref(), Some("elastic"));
                assert_eq!(elasticsearch.password, None);
                assert_eq!(gcs.base_url, "https://storage.googleapis.com");
                assert_eq!(stripe.currency, "eur");
            }
            other => panic!("expected remote backends, got {:?}", other),
        }
        assert_eq!(config.identity_header, "x-user");
    }

    #[test]
    fn missing_required_variable_is_named() {
        let err = AppConfig::from_lookup(lookup(&[("ES_URL", "http://es:9200")])).unwrap_err();
        assert!(err.to_string().contains("GCS_BUCKET"));
    }

    #[test]
    fn rejects_unknown_backend_and_bad_numbers() {
        assert!(AppConfig::from_lookup(lookup(&[("BACKEND", "sqlite")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[
            ("BACKEND", "memory"),
            ("HTTP_TIMEOUT_SECS", "soon")
        ]))
        .is_err());
    }
}
