/// Consul KV implementation of the registry
///
/// Uses the HTTP API (`/v1/kv`). Registry paths map to Consul keys without the
/// leading slash; every segment is percent-encoded.
use crate::modules::registry::domain::repository::RegistryRepository;
use crate::shared::errors::{ScalingError, ScalingResult};
use crate::shared::infrastructure::RegistryConfig;
use crate::shared::utils::LogContext;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::{Duration, Instant};

const TOKEN_HEADER: &str = "X-Consul-Token";

pub struct ConsulRegistryRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ConsulRegistryRepository {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ScalingResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &RegistryConfig) -> ScalingResult<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            ScalingError::InvalidConfiguration("Consul registry requires a URL".to_string())
        })?;
        Self::new(url, config.token.clone(), config.timeout)
    }

    fn kv_url(&self, key: &str) -> String {
        format!("{}/v1/kv/{}", self.base_url, encode_key(key))
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(&self, operation: &str, key: &str, request: RequestBuilder) -> ScalingResult<Response> {
        LogContext::registry_operation(operation, key, None);
        let start = Instant::now();
        let response = self.with_token(request).send().await?;
        LogContext::registry_operation(operation, key, Some(start.elapsed().as_millis() as u64));
        Ok(response)
    }
}

/// Strip the leading slash and percent-encode each segment
fn encode_key(key: &str) -> String {
    key.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Immediate child names from a `?keys&separator=/` listing of `parent`
fn child_names(parent: &str, listed: &[String]) -> Vec<String> {
    let prefix = format!("{}/", parent.trim_matches('/'));
    let mut children: Vec<String> = Vec::new();
    for key in listed {
        let Some(rest) = key.strip_prefix(&prefix) else {
            continue;
        };
        let child = rest.trim_end_matches('/');
        if child.is_empty() || child.contains('/') {
            continue;
        }
        if !children.iter().any(|c| c == child) {
            children.push(child.to_string());
        }
    }
    children
}

fn unavailable(operation: &str, key: &str, status: StatusCode) -> ScalingError {
    ScalingError::RegistryUnavailable(format!(
        "Consul {} of '{}' failed with HTTP {}",
        operation, key, status
    ))
}

#[async_trait]
impl RegistryRepository for ConsulRegistryRepository {
    async fn get(&self, key: &str) -> ScalingResult<Option<String>> {
        let request = self.client.get(self.kv_url(key)).query(&[("raw", "")]);
        let response = self.send("get", key, request).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(unavailable("get", key, status)),
        }
    }

    async fn persist(&self, key: &str, value: &str) -> ScalingResult<()> {
        let request = self.client.put(self.kv_url(key)).body(value.to_string());
        let response = self.send("persist", key, request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(unavailable("persist", key, status));
        }
        let accepted = response.text().await?;
        if accepted.trim() != "true" {
            return Err(ScalingError::RegistryUnavailable(format!(
                "Consul rejected write of '{}'",
                key
            )));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> ScalingResult<()> {
        // exact key first, then everything below `key/` so siblings sharing
        // the textual prefix survive
        let exact = self.client.delete(self.kv_url(key));
        let response = self.send("delete", key, exact).await?;
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(unavailable("delete", key, response.status()));
        }

        let subtree_url = format!("{}/", self.kv_url(key));
        let subtree = self.client.delete(subtree_url).query(&[("recurse", "")]);
        let response = self.send("delete", key, subtree).await?;
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(unavailable("delete", key, response.status()));
        }
        Ok(())
    }

    async fn get_children_keys(&self, key: &str) -> ScalingResult<Vec<String>> {
        let url = format!("{}/", self.kv_url(key));
        let request = self
            .client
            .get(url)
            .query(&[("keys", ""), ("separator", "/")]);
        let response = self.send("children", key, request).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => {
                let body = response.text().await?;
                let listed: Vec<String> = serde_json::from_str(&body)
                    .map_err(|e| ScalingError::RegistryUnavailable(format!(
                        "Unreadable Consul key listing for '{}': {}",
                        key, e
                    )))?;
                Ok(child_names(key, &listed))
            }
            status => Err(unavailable("children", key, status)),
        }
    }
}
