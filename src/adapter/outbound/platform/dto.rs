//! Control API data transfer objects.
//!
//! Field names follow the platform's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AppDefinition, AppUpdate, BuildSource, VolumeMount, DEFAULT_CONTAINER_HTTP_PORT,
};

/// Envelope status for a fully successful request.
pub const STATUS_OK: i64 = 100;
/// Envelope status for a partially successful request.
pub const STATUS_OK_PARTIALLY: i64 = 101;

/// Captain definition schema understood by the build system.
pub const CAPTAIN_DEFINITION_SCHEMA: u32 = 2;

/// Every response body is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: i64,
    #[serde(default)]
    pub description: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.status, STATUS_OK | STATUS_OK_PARTIALLY)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoData {
    #[serde(default)]
    pub root_domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinitionsData {
    #[serde(default)]
    pub app_definitions: Vec<AppDefinitionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinitionDto {
    pub app_name: String,
    #[serde(default)]
    pub instance_count: u32,
    #[serde(default)]
    pub has_persistent_data: bool,
    #[serde(default)]
    pub not_expose_as_web_app: bool,
    #[serde(default)]
    pub container_http_port: Option<u16>,
    #[serde(default)]
    pub custom_domain: Vec<CustomDomainDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainDto {
    pub public_domain: String,
}

impl From<AppDefinitionDto> for AppDefinition {
    fn from(dto: AppDefinitionDto) -> Self {
        Self {
            name: dto.app_name,
            instance_count: dto.instance_count,
            has_persistent_data: dto.has_persistent_data,
            not_expose_as_web_app: dto.not_expose_as_web_app,
            container_http_port: dto.container_http_port.unwrap_or(DEFAULT_CONTAINER_HTTP_PORT),
            custom_domains: dto
                .custom_domain
                .into_iter()
                .map(|domain| domain.public_domain)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRuntimeData {
    #[serde(default)]
    pub is_app_building: bool,
    #[serde(default)]
    pub is_build_failed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub download_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub app_name: &'a str,
    pub has_persistent_data: bool,
}

#[derive(Debug, Serialize)]
pub struct EnvVarDto<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDto<'a> {
    pub container_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<&'a str>,
}

impl<'a> From<&'a VolumeMount> for VolumeDto<'a> {
    fn from(mount: &'a VolumeMount) -> Self {
        match mount {
            VolumeMount::Host {
                host_path,
                container_path,
            } => Self {
                container_path: container_path.as_str(),
                volume_name: None,
                host_path: Some(host_path.as_str()),
            },
            VolumeMount::Named {
                volume_name,
                container_path,
            } => Self {
                container_path: container_path.as_str(),
                volume_name: Some(volume_name.as_str()),
                host_path: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest<'a> {
    pub app_name: &'a str,
    pub instance_count: u32,
    pub env_vars: Vec<EnvVarDto<'a>>,
    pub volumes: Vec<VolumeDto<'a>>,
    pub not_expose_as_web_app: bool,
    pub container_http_port: u16,
    pub websocket_support: bool,
}

impl<'a> From<&'a AppUpdate> for UpdateRequest<'a> {
    fn from(update: &'a AppUpdate) -> Self {
        Self {
            app_name: &update.app_name,
            instance_count: update.instance_count,
            env_vars: update
                .env_vars
                .iter()
                .map(|var| EnvVarDto {
                    key: &var.key,
                    value: &var.value,
                })
                .collect(),
            volumes: update.volumes.iter().map(VolumeDto::from).collect(),
            not_expose_as_web_app: update.not_expose_as_web_app,
            container_http_port: update.container_http_port,
            websocket_support: update.websocket_support,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest<'a> {
    pub app_name: &'a str,
    pub volumes: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainRequest<'a> {
    pub app_name: &'a str,
    pub custom_domain: &'a str,
}

/// Build definition handed to the platform's builder.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptainDefinition<'a> {
    pub schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile_lines: Option<&'a [String]>,
}

impl<'a> From<&'a BuildSource> for CaptainDefinition<'a> {
    fn from(source: &'a BuildSource) -> Self {
        match source {
            BuildSource::Image(image) => Self {
                schema_version: CAPTAIN_DEFINITION_SCHEMA,
                image_name: Some(image.as_str()),
                dockerfile_lines: None,
            },
            BuildSource::DockerfileLines(lines) => Self {
                schema_version: CAPTAIN_DEFINITION_SCHEMA,
                image_name: None,
                dockerfile_lines: Some(lines.as_slice()),
            },
        }
    }
}

/// Deploy body: the captain definition travels as an embedded JSON string.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub captain_definition_content: String,
    pub git_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnvVar;
    use serde_json::json;

    #[test]
    fn envelope_accepts_ok_and_partial_status() {
        let ok: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"status": 100, "description": "", "data": {}})).unwrap();
        let partial: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"status": 101, "description": "partly"})).unwrap();
        let failed: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"status": 1000, "description": "nope"})).unwrap();

        assert!(ok.is_ok());
        assert!(partial.is_ok());
        assert!(!failed.is_ok());
    }

    #[test]
    fn app_definition_defaults_missing_port() {
        let dto: AppDefinitionDto = serde_json::from_value(json!({
            "appName": "web",
            "instanceCount": 1,
            "customDomain": [{"publicDomain": "blog.example.com"}]
        }))
        .unwrap();

        let app = AppDefinition::from(dto);
        assert_eq!(app.container_http_port, 80);
        assert_eq!(app.custom_domains, vec!["blog.example.com"]);
    }

    #[test]
    fn update_request_serializes_volume_kinds() {
        let update = AppUpdate {
            app_name: "db".into(),
            instance_count: 1,
            env_vars: vec![EnvVar {
                key: "A".into(),
                value: "1".into(),
            }],
            volumes: vec![
                VolumeMount::parse("db-data:/var/lib/mysql").unwrap(),
                VolumeMount::parse("/srv/conf:/etc/conf").unwrap(),
            ],
            not_expose_as_web_app: true,
            container_http_port: 3306,
            websocket_support: false,
        };

        let body = serde_json::to_value(UpdateRequest::from(&update)).unwrap();

        assert_eq!(
            body,
            json!({
                "appName": "db",
                "instanceCount": 1,
                "envVars": [{"key": "A", "value": "1"}],
                "volumes": [
                    {"containerPath": "/var/lib/mysql", "volumeName": "db-data"},
                    {"containerPath": "/etc/conf", "hostPath": "/srv/conf"}
                ],
                "notExposeAsWebApp": true,
                "containerHttpPort": 3306,
                "websocketSupport": false
            })
        );
    }

    #[test]
    fn captain_definition_carries_exactly_one_source() {
        let image = BuildSource::Image("nginx:1.25".into());
        let lines = BuildSource::DockerfileLines(vec!["FROM alpine".into()]);

        assert_eq!(
            serde_json::to_value(CaptainDefinition::from(&image)).unwrap(),
            json!({"schemaVersion": 2, "imageName": "nginx:1.25"})
        );
        assert_eq!(
            serde_json::to_value(CaptainDefinition::from(&lines)).unwrap(),
            json!({"schemaVersion": 2, "dockerfileLines": ["FROM alpine"]})
        );
    }
}
