use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Durable storage strategy for the notification store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    /// Whole-document JSON file, rewritten on every create.
    Document,
    /// Append-only JSON lines log, replayed at startup.
    Journal,
}

impl FromStr for StoreBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(StoreBackendKind::Document),
            "journal" => Ok(StoreBackendKind::Journal),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Email delivery provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderKind {
    /// Log the delivery instead of sending it.
    Log,
    /// Resend HTTP API.
    Resend,
}

impl FromStr for EmailProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(EmailProviderKind::Log),
            "resend" => Ok(EmailProviderKind::Resend),
            other => Err(format!("unknown email provider '{}'", other)),
        }
    }
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address (default: 0.0.0.0:5000)
    pub bind_addr: SocketAddr,

    /// Path of the durable notification file
    pub store_path: PathBuf,

    /// Storage strategy for `store_path`
    pub store_backend: StoreBackendKind,

    /// Which provider delivers emails
    pub email_provider: EmailProviderKind,

    /// Resend API key for email delivery
    pub resend_api_key: Option<String>,

    /// Email sender address
    pub email_from: Option<String>,

    /// Maximum number of sends in flight for one dispatch (default: 8)
    pub dispatch_max_concurrency: usize,

    /// Per-recipient send timeout in milliseconds (default: 10000)
    pub dispatch_send_timeout_ms: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dispatch_max_concurrency: usize = var("DISPATCH_MAX_CONCURRENCY")
            .unwrap_or_else(|| "8".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("DISPATCH_MAX_CONCURRENCY must be a valid usize"))?;
        if dispatch_max_concurrency == 0 {
            anyhow::bail!("DISPATCH_MAX_CONCURRENCY must be at least 1");
        }

        let config = Self {
            bind_addr: var("BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0:5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BIND_ADDR must be a valid socket address"))?,
            store_path: var("STORE_PATH")
                .unwrap_or_else(|| "notification_doc.json".to_string())
                .into(),
            store_backend: var("STORE_BACKEND")
                .unwrap_or_else(|| "document".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("STORE_BACKEND: {}", e))?,
            email_provider: var("EMAIL_PROVIDER")
                .unwrap_or_else(|| "log".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("EMAIL_PROVIDER: {}", e))?,
            resend_api_key: var("RESEND_API_KEY"),
            email_from: var("EMAIL_FROM"),
            dispatch_max_concurrency,
            dispatch_send_timeout_ms: var("DISPATCH_SEND_TIMEOUT_MS")
                .unwrap_or_else(|| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_SEND_TIMEOUT_MS must be a valid u64"))?,
        };

        if config.email_provider == EmailProviderKind::Resend {
            if config.resend_api_key.is_none() {
                anyhow::bail!("RESEND_API_KEY environment variable is required for the resend provider");
            }
            if config.email_from.is_none() {
                anyhow::bail!("EMAIL_FROM environment variable is required for the resend provider");
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.store_path, PathBuf::from("notification_doc.json"));
        assert_eq!(config.store_backend, StoreBackendKind::Document);
        assert_eq!(config.email_provider, EmailProviderKind::Log);
        assert_eq!(config.dispatch_max_concurrency, 8);
        assert_eq!(config.dispatch_send_timeout_ms, 10_000);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("STORE_BACKEND", "Journal"),
            ("STORE_PATH", "/tmp/notifications.log"),
            ("DISPATCH_MAX_CONCURRENCY", "2"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackendKind::Journal);
        assert_eq!(config.store_path, PathBuf::from("/tmp/notifications.log"));
        assert_eq!(config.dispatch_max_concurrency, 2);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = AppConfig::from_vars(vars(&[("DISPATCH_MAX_CONCURRENCY", "0")])).unwrap_err();
        assert!(err.to_string().contains("DISPATCH_MAX_CONCURRENCY"));
    }

    #[test]
    fn test_resend_requires_credentials() {
        let err = AppConfig::from_vars(vars(&[("EMAIL_PROVIDER", "resend")])).unwrap_err();
        assert!(err.to_string().contains("RESEND_API_KEY"));

        let config = AppConfig::from_vars(vars(&[
            ("EMAIL_PROVIDER", "resend"),
            ("RESEND_API_KEY", "re_test"),
            ("EMAIL_FROM", "alerts@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.email_provider, EmailProviderKind::Resend);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(AppConfig::from_vars(vars(&[("STORE_BACKEND", "sqlite")])).is_err());
    }
}
