use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::ApiError;
use crate::config::ApiConfig;

/// Attempts per request, counting the first one.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the first retry; doubled for each later one.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the connection pool, token and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    auth_token: RwLock<Option<SecretString>>,
    cache: Option<Cache<String, Value>>,
    retry_base_delay: Duration,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for an unparseable base URL and
    /// [`ApiError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_retry_delay(config, RETRY_BASE_DELAY)
    }

    /// Like [`ApiClient::new`] with a custom backoff base.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn with_retry_delay(config: &ApiConfig, retry_base_delay: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        // A trailing slash keeps `Url::join` from dropping the last path segment.
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;

        let cache = config.cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                auth_token: RwLock::new(config.auth_token.clone()),
                cache,
                retry_base_delay,
            }),
        })
    }

    /// Send `Authorization: Bearer <token>` on every later request.
    ///
    /// Cached responses were fetched under the previous credentials and are
    /// dropped.
    pub fn set_auth_token(&self, token: SecretString) {
        *self
            .inner
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
        self.invalidate_cache();
    }

    /// Stop sending the `Authorization` header.
    pub fn clear_auth_token(&self) {
        *self
            .inner
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.invalidate_cache();
    }

    /// Drop every cached GET response.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }

    #[must_use]
    pub fn has_auth_token(&self) -> bool {
        self.inner
            .auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// GET `path` and decode the JSON body.
    ///
    /// With caching enabled the body is served from the cache until its TTL
    /// runs out or a write goes through this client.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-success status or
    /// an unexpected body.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;

        if let Some(cache) = &self.inner.cache
            && let Some(value) = cache.get(url.as_str()).await
        {
            debug!("Cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let value = self.send(Method::GET, url.clone(), None).await?;

        if let Some(cache) = &self.inner.cache {
            cache.insert(url.to_string(), value.clone()).await;
        }

        Ok(serde_json::from_value(value)?)
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, path, Some(serde_json::to_value(body)?))
            .await
    }

    /// PUT a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await
    }

    /// PATCH a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PATCH, path, Some(serde_json::to_value(body)?))
            .await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(Method::DELETE, path, None).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let value = self.send(method, url, body).await?;
        // Writes can change any cached read (carts, orders, questions, reviews).
        self.invalidate_cache();
        Ok(serde_json::from_value(value)?)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Send with retry: only rate limiting is retried.
    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value, ApiError> {
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url.clone(), body.as_ref()).await {
                Err(ApiError::RateLimited) if attempt + 1 < MAX_ATTEMPTS => {
                    let delay = self.inner.retry_base_delay * 2u32.pow(attempt);
                    warn!(attempt = attempt + 1, ?delay, "Rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut request = self.inner.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let token = self
            .inner
            .auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| token.expose_secret().to_owned());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let text = response.text().await.map_err(map_transport)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).or_else(|e| {
            // Non-JSON bodies are passed through as strings.
            if text.trim_start().starts_with(['{', '[']) {
                Err(ApiError::Parse(e))
            } else {
                Ok(Value::String(text))
            }
        })
    }
}

fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_owned(),
            timeout: Duration::from_secs(1),
            auth_token: None,
            cache_ttl: None,
        }
    }

    #[test]
    fn test_paths_join_onto_base_path() {
        let client = ApiClient::new(&config("http://localhost:3001/api")).unwrap();
        assert_eq!(
            client.url("/items/MCO1").unwrap().as_str(),
            "http://localhost:3001/api/items/MCO1"
        );
        assert_eq!(
            client.url("sites/MCO/search?q=iphone").unwrap().as_str(),
            "http://localhost:3001/api/sites/MCO/search?q=iphone"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new(&config("not a url")).err().unwrap();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_auth_token_toggle() {
        let client = ApiClient::new(&config("https://api.example.com")).unwrap();
        assert!(!client.has_auth_token());
        client.set_auth_token(SecretString::from("token"));
        assert!(client.has_auth_token());
        client.clear_auth_token();
        assert!(!client.has_auth_token());
    }
}
