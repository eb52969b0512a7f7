use crate::config::policy_file::PolicyFile;
use crate::core::service::{TokenService, DEFAULT_KEY_PREFIX, DEFAULT_TOKEN_TTL};
use crate::core::validator::{ValidationPolicy, Validator};
use crate::core::CardStore;
use crate::utils::error::{Result, TokenizerError};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_range, validate_redis_url,
    Validate,
};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub token_ttl_seconds: u64,
    pub key_prefix: String,
    pub policy: ValidationPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            token_ttl_seconds: DEFAULT_TOKEN_TTL.as_secs(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            policy: ValidationPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// 從環境變數載入（先讀取 `.env`）
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let policy = match lookup("VALIDATION_POLICY_FILE") {
            Some(path) => PolicyFile::from_file(&path)?.into_policy(),
            None => defaults.policy,
        };

        Ok(Self {
            redis_host: lookup("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var(&lookup, "REDIS_PORT", defaults.redis_port)?,
            token_ttl_seconds: parse_var(
                &lookup,
                "TOKEN_TTL_SECONDS",
                defaults.token_ttl_seconds,
            )?,
            key_prefix: lookup("TOKEN_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            policy,
        })
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis_host, self.redis_port)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    pub fn build_service<S: CardStore>(&self, store: S) -> TokenService<S> {
        TokenService::new(store)
            .with_validator(Validator::new(self.policy.clone()))
            .with_ttl(self.token_ttl())
            .with_key_prefix(self.key_prefix.clone())
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| TokenizerError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("redis_host", &self.redis_host)?;
        validate_redis_url("redis_url", &self.redis_url())?;
        validate_range("redis_port", self.redis_port, 1, u16::MAX)?;
        validate_range("token_ttl_seconds", self.token_ttl_seconds, 1, 86_400)?;
        validate_non_empty_string("key_prefix", &self.key_prefix)?;
        validate_non_empty_list(
            "allowed_cvvs",
            &self.policy.allowed_cvvs.iter().collect::<Vec<_>>(),
        )?;
        validate_non_empty_list(
            "allowed_email_domains",
            &self.policy.allowed_email_domains.iter().collect::<Vec<_>>(),
        )?;
        validate_range("max_years_ahead", self.policy.max_years_ahead, 0, 50)?;

        tracing::debug!("Service configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.redis_url(), "redis://127.0.0.1:6379");
        assert_eq!(config.token_ttl(), Duration::from_secs(900));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("TOKEN_TTL_SECONDS", "60"),
            ("TOKEN_KEY_PREFIX", "staging_tokens"),
        ]))
        .unwrap();

        assert_eq!(config.redis_url(), "redis://cache.internal:6380");
        assert_eq!(config.token_ttl_seconds, 60);
        assert_eq!(config.key_prefix, "staging_tokens");
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("REDIS_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(
            err,
            TokenizerError::InvalidConfigValueError { ref field, .. } if field == "REDIS_PORT"
        ));
    }

    #[test]
    fn test_zero_ttl_fails_validation() {
        let config = ServiceConfig {
            token_ttl_seconds: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_file_from_env() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[validation]
allowed_cvvs = [777]
"#,
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config =
            ServiceConfig::from_lookup(lookup_from(&[("VALIDATION_POLICY_FILE", path.as_str())])).unwrap();
        assert!(config.policy.allowed_cvvs.contains(&777));
        assert!(!config.policy.allowed_cvvs.contains(&123));
        assert!(config.policy.allowed_email_domains.contains("gmail.com"));
    }
}
