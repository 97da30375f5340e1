use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin wrapper over the Supabase REST surface. Every data operation in this
/// system is a passthrough call against `/rest/v1` (PostgREST) or `/auth/v1`;
/// the hosted platform owns persistence, joins and transactions.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn headers(&self, api_key: &str, bearer: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key).map_err(|_| anyhow!("Invalid API key header"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(|_| anyhow!("Invalid authorization header"))?,
        );
        Ok(headers)
    }

    async fn send<T>(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Supabase request: {} {}", method, url);

        let mut req = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Supabase error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("Supabase error ({}): {}", status, error_text),
            });
        }

        // DELETE and some PATCH calls legitimately return an empty body.
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return serde_json::from_value(Value::Null)
                .map_err(|_| anyhow!("Unexpected empty response from Supabase"));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Request on behalf of an authenticated user (anon key + caller's JWT).
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bearer = auth_token.unwrap_or(&self.anon_key);
        let headers = self.headers(&self.anon_key, bearer)?;
        self.send(method, path, headers, body).await
    }

    /// Same as [`request`](Self::request) but with extra headers, typically
    /// `Prefer: return=representation` so PostgREST echoes the written rows.
    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bearer = auth_token.unwrap_or(&self.anon_key);
        let mut headers = self.headers(&self.anon_key, bearer)?;
        headers.extend(extra_headers);
        self.send(method, path, headers, body).await
    }

    /// Privileged request with the service-role key. Used only by the admin
    /// operations (`/auth/v1/admin/...`, profile writes); never exposed to
    /// regular handlers.
    pub async fn admin_request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if self.service_role_key.is_empty() {
            return Err(anyhow!("Service role key is not configured"));
        }
        let key = self.service_role_key.clone();
        let headers = self.headers(&key, &key)?;
        self.send(method, path, headers, body).await
    }

    /// Header map asking PostgREST to return the affected rows.
    pub fn return_representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
