use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Set a value with a TTL.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut self.connection.clone())
            .await
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> redis::RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }

    /// Delete multiple keys matching a pattern
    pub async fn delete_pattern(&self, pattern: &str) -> redis::RedisResult<()> {
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut self.connection.clone())
            .await?;

        if !keys.is_empty() {
            let _: () = redis::cmd("DEL")
                .arg(&keys)
                .query_async(&mut self.connection.clone())
                .await?;
        }

        Ok(())
    }

    /// Read-through lookup. Cache errors are logged and fall back to `load`;
    /// only `load`'s error is ever returned.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, ttl: Duration, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key, "Cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, error = %e, "Cache read failed"),
        }

        let value = load().await?;
        if let Err(e) = self.set(key, &value, ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
        Ok(value)
    }

    /// Drop every cached view of opportunity listings, plus one posting's
    /// detail entry when `id` is given.
    pub async fn invalidate_opportunities(&self, id: Option<&str>) {
        let mut result = self.delete_pattern(&keys::opportunity_list("*")).await;
        if result.is_ok() {
            result = self.delete_pattern(&keys::company_opportunities("*")).await;
        }
        if let (true, Some(id)) = (result.is_ok(), id) {
            result = self.delete(&keys::opportunity(id)).await;
        }
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to invalidate opportunity cache");
        }
    }
}

/// Cache key generators
pub mod keys {
    /// Key for a filtered opportunity listing
    pub fn opportunity_list(filters: &str) -> String {
        format!("opportunities:list:{}", filters)
    }

    pub fn opportunity(id: &str) -> String {
        format!("opportunity:{}", id)
    }

    /// Key for the postings of one company
    pub fn company_opportunities(company_id: &str) -> String {
        format!("company:{}:opportunities", company_id)
    }
}

/// Cache TTLs, read by [`crate::config::AppConfig::from_env`].
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub opportunity_list_ttl: Duration,
    pub opportunity_ttl: Duration,
}

/// Wrapper type for Actix-web app data
pub type CacheData = Arc<RedisCache>;

#[cfg(test)]
mod tests {
    use super::keys;

    #[test]
    fn list_pattern_covers_every_filter_key() {
        assert_eq!(keys::opportunity_list("*"), "opportunities:list:*");
        assert!(keys::opportunity_list("s=rust").starts_with("opportunities:list:"));
        assert_eq!(
            keys::company_opportunities("42"),
            "company:42:opportunities"
        );
    }
}
