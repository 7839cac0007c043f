use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::jwt::Claims;

const JWKS_URL_TEMPLATE: &str = "https://{}.supabase.co/auth/v1/.well-known/jwks.json";

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// The subset of an EC JSON Web Key that Supabase publishes.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    alg: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

#[derive(Clone)]
struct SigningKey {
    x: String,
    y: String,
    algorithm: Algorithm,
}

impl TryFrom<Jwk> for SigningKey {
    type Error = String;

    fn try_from(jwk: Jwk) -> Result<Self, Self::Error> {
        let algorithm = match jwk.alg.as_deref() {
            Some("ES384") => Algorithm::ES384,
            Some("ES256") | None => Algorithm::ES256,
            Some(other) => return Err(format!("Unsupported JWK algorithm {other}")),
        };
        Ok(Self {
            x: jwk.x.ok_or("Missing 'x' in JWK")?,
            y: jwk.y.ok_or("Missing 'y' in JWK")?,
            algorithm,
        })
    }
}

/// Signing keys fetched from the project's JWKS endpoint, cached by `kid`.
#[derive(Clone)]
pub struct JwksCache {
    cache: Arc<Cache<String, SigningKey>>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(project_ref: &str, anon_key: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        let cache = Arc::new(
            Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10)
                .build(),
        );

        Ok(Self {
            cache,
            jwks_url: JWKS_URL_TEMPLATE.replace("{}", project_ref),
            client,
            anon_key: anon_key.to_string(),
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, String> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch JWKS: HTTP {status}"));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| format!("Failed to parse JWKS JSON: {e}"))
    }

    async fn signing_key(&self, kid: &str) -> Result<SigningKey, String> {
        if let Some(cached) = self.cache.get(kid).await {
            return Ok(cached);
        }

        let jwk = self
            .fetch_jwks()
            .await?
            .keys
            .into_iter()
            .find(|k| k.kid == kid)
            .ok_or(format!("Key with kid={kid} not found in JWKS"))?;
        let key = SigningKey::try_from(jwk)?;

        self.cache.insert(kid.to_string(), key.clone()).await;
        Ok(key)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, String> {
        let header = decode_header(token).map_err(|e| format!("Failed to decode header: {e}"))?;
        let kid = header.kid.ok_or("No 'kid' in token header")?;

        let key = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_ec_components(&key.x, &key.y)
            .map_err(|e| format!("Failed to create decoding key: {e}"))?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|td| td.claims)
            .map_err(|e| format!("Token validation failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwk(alg: Option<&str>) -> Jwk {
        Jwk {
            kid: "k1".to_string(),
            alg: alg.map(str::to_string),
            x: Some("x".to_string()),
            y: Some("y".to_string()),
        }
    }

    #[test]
    fn ec_keys_default_to_es256() {
        let key = SigningKey::try_from(jwk(None)).unwrap();
        assert_eq!(key.algorithm, Algorithm::ES256);
        let key = SigningKey::try_from(jwk(Some("ES384"))).unwrap();
        assert_eq!(key.algorithm, Algorithm::ES384);
    }

    #[test]
    fn rejects_unsupported_or_incomplete_keys() {
        assert!(SigningKey::try_from(jwk(Some("RS256"))).is_err());
        let mut partial = jwk(None);
        partial.y = None;
        assert!(SigningKey::try_from(partial).is_err());
    }
}
