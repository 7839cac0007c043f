use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::applications::ProfilePolicy;
use crate::cache::CacheConfig;
use crate::utils::retry::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Legacy HS256 projects sign with a shared secret instead of JWKS.
    pub supabase_jwt_secret: Option<String>,
    pub port: u16,
    pub remote_timeout: Duration,
    pub list_retry: RetryPolicy,
    pub profile_policy: ProfilePolicy,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let required_fields = env::var("PROFILE_REQUIRED_FIELDS").unwrap_or_default();
        let required = ProfilePolicy::parse_fields(&required_fields).map_err(|_| {
            ConfigError::Invalid {
                name: "PROFILE_REQUIRED_FIELDS",
                value: required_fields.clone(),
            }
        })?;
        let min_completion: u8 = parse_or("PROFILE_MIN_COMPLETION", 0)?;
        if min_completion > 100 {
            return Err(ConfigError::Invalid {
                name: "PROFILE_MIN_COMPLETION",
                value: min_completion.to_string(),
            });
        }

        Ok(Self {
            database_url: required_var("DATABASE_URL")?,
            redis_url: required_var("REDIS_URL")?,
            supabase_url: required_var("SUPABASE_URL")?,
            supabase_anon_key: required_var("SUPABASE_ANON_KEY")?,
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            port: parse_or("PORT", 8080)?,
            remote_timeout: Duration::from_secs(parse_or("REMOTE_TIMEOUT_SECS", 10)?),
            list_retry: RetryPolicy {
                attempts: parse_or("LIST_RETRY_ATTEMPTS", 3)?,
                delay: Duration::from_millis(parse_or("LIST_RETRY_DELAY_MS", 1000)?),
            },
            profile_policy: ProfilePolicy::new(required, min_completion),
            cache: CacheConfig {
                opportunity_list_ttl: Duration::from_secs(parse_or("CACHE_TTL_OPPORTUNITIES", 300)?),
                opportunity_ttl: Duration::from_secs(parse_or(
                    "CACHE_TTL_OPPORTUNITY_DETAIL",
                    600,
                )?),
            },
        })
    }

    /// `https://PROJECT.supabase.co` → `PROJECT`.
    pub fn supabase_project_ref(&self) -> Result<&str, ConfigError> {
        project_ref(&self.supabase_url).ok_or_else(|| ConfigError::Invalid {
            name: "SUPABASE_URL",
            value: self.supabase_url.clone(),
        })
    }
}

fn project_ref(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_supabase_project_ref() {
        assert_eq!(project_ref("https://abcd1234.supabase.co"), Some("abcd1234"));
        assert_eq!(project_ref("https://abcd1234.supabase.co/"), Some("abcd1234"));
        assert_eq!(project_ref("http://abcd1234.supabase.co"), None);
        assert_eq!(project_ref("https://example.com"), None);
    }
}
