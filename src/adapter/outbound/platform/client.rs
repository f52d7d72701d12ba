//! Control API client.
//!
//! One method per remote operation. Transport failures are classified here
//! and nowhere else; retrying is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::dto::{
    AppDefinitionsData, AppRuntimeData, BackupData, CaptainDefinition, CustomDomainRequest,
    DeleteRequest, DeployRequest, Envelope, LoginData, LoginRequest, RegisterRequest,
    SystemInfoData, UpdateRequest,
};
use crate::domain::{
    AppDefinition, AppUpdate, BackupToken, BuildSource, ServiceRuntimeInfo, SystemInfo,
};
use crate::error::{ConfigError, Error, RemoteError, Result};
use crate::infrastructure::config::platform::PlatformConfig;
use crate::port::PlatformApi;

const NAMESPACE_HEADER: &str = "x-namespace";
const AUTH_HEADER: &str = "x-captain-auth";

const LOGIN_PATH: &str = "/api/v2/login";
const SYSTEM_INFO_PATH: &str = "/api/v2/user/system/info";
const BACKUP_PATH: &str = "/api/v2/user/system/createbackup";
const APP_DEFINITIONS_PATH: &str = "/api/v2/user/apps/appDefinitions";
const APP_DATA_PATH: &str = "/api/v2/user/apps/appData";

/// HTTP client for the platform control API.
pub struct PlatformClient {
    http: HttpClient,
    base_url: String,
    namespace: String,
    token: Option<String>,
}

impl PlatformClient {
    /// Create a client with default HTTP settings.
    pub fn new(base_url: &str, namespace: impl Into<String>) -> Result<Self> {
        Self::with_http(HttpClient::new(), base_url, namespace.into())
    }

    /// Create a client using the timeouts and credentials from `config`.
    ///
    /// The password is not used here; see [`Self::login`].
    pub fn from_config(config: &PlatformConfig) -> Result<Self> {
        let url = config.base_url();
        if url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "platform.url",
            }
            .into());
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        let mut client = Self::with_http(http, url, config.namespace.clone())?;
        client.token = config.token.clone();
        Ok(client)
    }

    fn with_http(http: HttpClient, base_url: &str, namespace: String) -> Result<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace,
            token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange the dashboard password for a session token.
    pub async fn login(&mut self, password: &str) -> Result<()> {
        let data: LoginData = self
            .post(LOGIN_PATH, &LoginRequest { password })
            .await?
            .ok_or_else(|| RemoteError::Decode("login response has no token".into()))?;
        self.token = Some(data.token);
        info!(url = %self.base_url, "Authenticated with platform");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn app_data_path(name: &str) -> String {
        format!("{APP_DATA_PATH}/{name}")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.send(self.http.get(self.url(path)), path).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.post(self.url(path)).json(body), path)
            .await
    }

    /// POST whose response carries no data of interest.
    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.post::<B, serde_json::Value>(path, body).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<Option<T>> {
        let mut request = request.header(NAMESPACE_HEADER, &self.namespace);
        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }

        debug!(path, "Control API request");
        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if is_gateway_failure(status) {
            warn!(path, status = status.as_u16(), "Gateway unavailable");
            return Err(RemoteError::Transient(format!("{path}: HTTP {status}")).into());
        }
        if !status.is_success() {
            let description = response.text().await.unwrap_or_default();
            return Err(RemoteError::Operation {
                status: i64::from(status.as_u16()),
                description: if description.is_empty() {
                    status.to_string()
                } else {
                    description
                },
            }
            .into());
        }

        let body = response.bytes().await.map_err(classify)?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|err| RemoteError::Decode(format!("{path}: {err}")))?;

        if !envelope.is_ok() {
            warn!(
                path,
                status = envelope.status,
                description = %envelope.description,
                "Control API rejected request"
            );
            return Err(RemoteError::Operation {
                status: envelope.status,
                description: envelope.description,
            }
            .into());
        }
        Ok(envelope.data)
    }
}

fn is_gateway_failure(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn classify(err: reqwest::Error) -> Error {
    let remote = if err.is_timeout() {
        RemoteError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() || err.is_body() {
        RemoteError::Transient(err.to_string())
    } else if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Operation {
            status: err.status().map_or(0, |status| i64::from(status.as_u16())),
            description: err.to_string(),
        }
    };
    remote.into()
}

fn missing_data(what: &str) -> Error {
    RemoteError::Decode(format!("{what} response has no data")).into()
}

#[async_trait]
impl PlatformApi for PlatformClient {
    async fn system_info(&self) -> Result<SystemInfo> {
        let data: SystemInfoData = self
            .get(SYSTEM_INFO_PATH)
            .await?
            .ok_or_else(|| missing_data("system info"))?;
        Ok(SystemInfo {
            root_domain: data.root_domain,
        })
    }

    async fn list_apps(&self) -> Result<Vec<AppDefinition>> {
        let data: AppDefinitionsData = self
            .get(APP_DEFINITIONS_PATH)
            .await?
            .ok_or_else(|| missing_data("app list"))?;
        Ok(data
            .app_definitions
            .into_iter()
            .map(AppDefinition::from)
            .collect())
    }

    async fn register_app(&self, name: &str, has_persistent_data: bool) -> Result<()> {
        self.post_unit(
            &format!("{APP_DEFINITIONS_PATH}/register"),
            &RegisterRequest {
                app_name: name,
                has_persistent_data,
            },
        )
        .await
    }

    async fn update_app(&self, update: &AppUpdate) -> Result<()> {
        self.post_unit(
            &format!("{APP_DEFINITIONS_PATH}/update"),
            &UpdateRequest::from(update),
        )
        .await
    }

    async fn deploy_app(&self, name: &str, source: &BuildSource) -> Result<()> {
        let definition = serde_json::to_string(&CaptainDefinition::from(source))?;
        self.post_unit(
            &Self::app_data_path(name),
            &DeployRequest {
                captain_definition_content: definition,
                git_hash: String::new(),
            },
        )
        .await
    }

    async fn runtime_info(&self, name: &str) -> Result<ServiceRuntimeInfo> {
        let data: AppRuntimeData = self
            .get(&Self::app_data_path(name))
            .await?
            .ok_or_else(|| missing_data("app data"))?;
        Ok(ServiceRuntimeInfo {
            is_building: data.is_app_building,
            is_build_failed: data.is_build_failed,
        })
    }

    async fn delete_app(&self, name: &str, volumes: &[String]) -> Result<()> {
        self.post_unit(
            &format!("{APP_DEFINITIONS_PATH}/delete"),
            &DeleteRequest {
                app_name: name,
                volumes,
            },
        )
        .await
    }

    async fn add_custom_domain(&self, name: &str, domain: &str) -> Result<()> {
        self.post_unit(
            &format!("{APP_DEFINITIONS_PATH}/customdomain"),
            &CustomDomainRequest {
                app_name: name,
                custom_domain: domain,
            },
        )
        .await
    }

    async fn enable_custom_domain_tls(&self, name: &str, domain: &str) -> Result<()> {
        self.post_unit(
            &format!("{APP_DEFINITIONS_PATH}/enablecustomdomainssl"),
            &CustomDomainRequest {
                app_name: name,
                custom_domain: domain,
            },
        )
        .await
    }

    async fn create_backup(&self) -> Result<BackupToken> {
        let data: BackupData = self
            .post(BACKUP_PATH, &serde_json::json!({}))
            .await?
            .ok_or_else(|| missing_data("backup"))?;
        Ok(BackupToken(data.download_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_malformed_url() {
        let result = PlatformClient::new("not a url", "captain");
        assert!(matches!(result, Err(Error::Url(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = PlatformClient::new("https://captain.example.com/", "captain").unwrap();
        assert_eq!(client.base_url(), "https://captain.example.com");
        assert_eq!(
            client.url(SYSTEM_INFO_PATH),
            "https://captain.example.com/api/v2/user/system/info"
        );
    }

    #[test]
    fn only_gateway_statuses_are_transient() {
        assert!(is_gateway_failure(StatusCode::BAD_GATEWAY));
        assert!(is_gateway_failure(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_gateway_failure(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_gateway_failure(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_gateway_failure(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn token_is_optional_until_login() {
        let client = PlatformClient::new("http://localhost:3000", "captain").unwrap();
        assert!(!client.is_authenticated());
        assert!(client.with_token("abc").is_authenticated());
    }
}
