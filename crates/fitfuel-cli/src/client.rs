//! HTTP client for the FitFuel backend
//!
//! Two hosts are involved: the authentication service and the admin API.
//! Every call is a single request/response exchange with no retries.

use std::time::Duration;

use fitfuel_common::types::{LoginRequest, LoginResponse, UserRecord};
use fitfuel_common::{ConsoleError, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ServerConfig;

/// Header asking the tunnelling service to skip its interstitial page
pub const TUNNEL_BYPASS_HEADER: &str = "bypass-tunnel-reminder";

pub const LOGIN_PATH: &str = "/api/Auth/login";
pub const USERS_PATH: &str = "/admin/users";

/// The five calls the console makes
#[allow(async_fn_in_trait)]
pub trait AdminApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    async fn get_user(&self, id: &str) -> Result<UserRecord>;

    async fn update_user(&self, id: &str, record: &UserRecord) -> Result<()>;

    async fn delete_user(&self, id: &str) -> Result<()>;
}

pub struct HttpAdminApi {
    http_client: Client,
    auth_url: Url,
    api_url: Url,
    tunnel_bypass: bool,
}

impl HttpAdminApi {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let auth_url = Url::parse(&config.auth_url)
            .map_err(|e| ConsoleError::config(format!("invalid auth URL '{}': {}", config.auth_url, e)))?;
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ConsoleError::config(format!("invalid API URL '{}': {}", config.api_url, e)))?;

        // the cookie jar stands in for sending credentials with the login call
        let mut client_builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .cookie_store(true)
            .user_agent(concat!("fitctl/", env!("CARGO_PKG_VERSION")));

        if !config.verify_tls {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let http_client = client_builder
            .build()
            .map_err(|e| ConsoleError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            auth_url,
            api_url,
            tunnel_bypass: config.tunnel_bypass,
        })
    }

    fn user_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = join(&self.api_url, USERS_PATH)?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| ConsoleError::config(format!("API URL cannot carry a path: {}", self.api_url)))?
                .push(id);
        }
        Ok(url)
    }

    fn admin_request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        debug!("{} {}", method, url);
        let request = self.http_client.request(method, url);
        if self.tunnel_bypass {
            request.header(TUNNEL_BYPASS_HEADER, "true")
        } else {
            request
        }
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| ConsoleError::transport(e.to_string()))
    }

    async fn send_json<T: Serialize>(
        request: reqwest::RequestBuilder,
        body: &T,
    ) -> Result<Response> {
        Self::send(request.json(body)).await
    }

    /// Fail on non-success statuses, otherwise parse the body as JSON
    async fn handle_response(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConsoleError::transport(format!("failed to read response body: {}", e)))?;

        debug!("Response status: {}, body: {}", status, body);

        if !status.is_success() {
            return Err(ConsoleError::status(status.as_u16(), error_message(&body, status)));
        }

        serde_json::from_str(&body)
            .map_err(|e| ConsoleError::malformed(format!("failed to parse response: {}", e)))
    }

    async fn expect_success(response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ConsoleError::status(status.as_u16(), error_message(&body, status)))
    }
}

impl AdminApi for HttpAdminApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = join(&self.auth_url, LOGIN_PATH)?;
        debug!("POST {}", url);

        let response = Self::send_json(self.http_client.post(url), request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConsoleError::transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            debug!("Login rejected with status {}: {}", status, body);
            return Err(ConsoleError::status(status.as_u16(), login_failure_message(&body)));
        }

        let data: Value = serde_json::from_str(&body)
            .map_err(|e| ConsoleError::malformed(format!("failed to parse login response: {}", e)))?;

        LoginResponse::from_value(&data)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let url = self.user_url(None)?;
        let response = Self::send(self.admin_request(reqwest::Method::GET, url)).await?;

        match Self::handle_response(response).await? {
            Value::Array(items) => items.into_iter().map(UserRecord::from_value).collect(),
            other => Err(ConsoleError::malformed(format!(
                "expected a list of users, got {}",
                other
            ))),
        }
    }

    async fn get_user(&self, id: &str) -> Result<UserRecord> {
        let url = self.user_url(Some(id))?;
        let response = Self::send(self.admin_request(reqwest::Method::GET, url)).await?;
        UserRecord::from_value(Self::handle_response(response).await?)
    }

    async fn update_user(&self, id: &str, record: &UserRecord) -> Result<()> {
        let url = self.user_url(Some(id))?;
        let request = self.admin_request(reqwest::Method::PUT, url);
        let response = Self::send_json(request, record).await?;
        Self::expect_success(response).await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let url = self.user_url(Some(id))?;
        let response = Self::send(self.admin_request(reqwest::Method::DELETE, url)).await?;
        Self::expect_success(response).await
    }
}

/// Append `path` below whatever path the base URL already carries
fn join(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ConsoleError::config(format!("URL cannot carry a path: {}", base)))?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

/// The server's `message` for a rejected login, or a fixed fallback when the
/// body carries none (tunnel error pages, empty bodies)
fn login_failure_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Login failed".to_string())
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("Request failed with status {}", status)
            } else {
                body.trim().to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_urls() {
        let api = HttpAdminApi::new(&ServerConfig {
            api_url: "https://api.example.test".to_string(),
            ..ServerConfig::default()
        })
        .unwrap();

        assert_eq!(
            api.user_url(None).unwrap().as_str(),
            "https://api.example.test/admin/users"
        );
        assert_eq!(
            api.user_url(Some("12")).unwrap().as_str(),
            "https://api.example.test/admin/users/12"
        );
        assert_eq!(
            api.user_url(Some("a b")).unwrap().as_str(),
            "https://api.example.test/admin/users/a%20b"
        );
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let api = HttpAdminApi::new(&ServerConfig {
            auth_url: "https://auth.example.test/fitfuel/".to_string(),
            api_url: "https://api.example.test/v1".to_string(),
            ..ServerConfig::default()
        })
        .unwrap();

        assert_eq!(
            api.user_url(Some("7")).unwrap().as_str(),
            "https://api.example.test/v1/admin/users/7"
        );
        assert_eq!(
            join(&api.auth_url, LOGIN_PATH).unwrap().as_str(),
            "https://auth.example.test/fitfuel/api/Auth/login"
        );
    }

    #[test]
    fn test_login_failure_message_fallback() {
        assert_eq!(login_failure_message(r#"{"message":"Invalid credentials"}"#), "Invalid credentials");
        assert_eq!(login_failure_message("<html>tunnel down</html>"), "Login failed");
        assert_eq!(login_failure_message(r#"{"error":"x"}"#), "Login failed");
        assert_eq!(login_failure_message(""), "Login failed");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = HttpAdminApi::new(&ServerConfig {
            auth_url: "not a url".to_string(),
            ..ServerConfig::default()
        });
        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_error_message_prefers_body_message() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(error_message(r#"{"message":"bad id"}"#, status), "bad id");
        assert_eq!(error_message("plain failure", status), "plain failure");
        assert_eq!(
            error_message("", status),
            "Request failed with status 400 Bad Request"
        );
    }
}
