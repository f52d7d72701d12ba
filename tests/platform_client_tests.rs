//! Control API client and HTTP manifest repository against a mock server.

use rigger::adapter::outbound::manifest::HttpManifestRepository;
use rigger::adapter::outbound::platform::PlatformClient;
use rigger::domain::BuildSource;
use rigger::error::{Error, RemoteError};
use rigger::port::{ManifestSource, PlatformApi};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": 100,
        "description": "OK",
        "data": data,
    }))
}

async fn client(server: &MockServer) -> PlatformClient {
    PlatformClient::new(&server.uri(), "captain")
        .unwrap()
        .with_token("t0ken")
}

#[tokio::test]
async fn system_info_sends_namespace_and_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/system/info"))
        .and(header("x-namespace", "captain"))
        .and(header("x-captain-auth", "t0ken"))
        .respond_with(ok(json!({ "rootDomain": "apps.example.com" })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client(&server).await.system_info().await.unwrap();

    assert_eq!(info.root_domain, "apps.example.com");
}

#[tokio::test]
async fn list_apps_maps_definitions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/apps/appDefinitions"))
        .respond_with(ok(json!({
            "appDefinitions": [
                {
                    "appName": "blog",
                    "instanceCount": 1,
                    "hasPersistentData": false,
                    "notExposeAsWebApp": false,
                    "containerHttpPort": 2368,
                    "customDomain": [{ "publicDomain": "blog.example.com" }]
                },
                { "appName": "blog-db", "hasPersistentData": true }
            ]
        })))
        .mount(&server)
        .await;

    let apps = client(&server).await.list_apps().await.unwrap();

    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].name, "blog");
    assert_eq!(apps[0].container_http_port, 2368);
    assert_eq!(apps[0].custom_domains, vec!["blog.example.com"]);
    assert_eq!(apps[1].container_http_port, 80);
    assert!(apps[1].has_persistent_data);
}

#[tokio::test]
async fn partial_success_status_counts_as_ok() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/user/apps/appDefinitions/register"))
        .and(body_json(json!({ "appName": "db", "hasPersistentData": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 101,
            "description": "Partially done",
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).await.register_app("db", true).await.unwrap();
}

#[tokio::test]
async fn rejected_envelope_is_an_operation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/user/apps/appDefinitions/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1000,
            "description": "App already exists",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .register_app("db", false)
        .await
        .unwrap_err();

    match err {
        Error::Remote(RemoteError::Operation {
            status,
            description,
        }) => {
            assert_eq!(status, 1000);
            assert_eq!(description, "App already exists");
        }
        other => panic!("expected operation error, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_gateway_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/apps/appDefinitions"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server).await.list_apps().await.unwrap_err();

    assert!(err.is_transient(), "got {err:?}");
}

#[tokio::test]
async fn server_error_is_not_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/apps/appDefinitions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).await.list_apps().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Remote(RemoteError::Operation { status: 500, ref description }) if description == "boom"
    ));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/system/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).await.system_info().await.unwrap_err();

    assert!(matches!(err, Error::Remote(RemoteError::Decode(_))));
}

#[tokio::test]
async fn deploy_sends_serialized_captain_definition() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/user/apps/appData/web"))
        .and(body_json(json!({
            "captainDefinitionContent": "{\"schemaVersion\":2,\"imageName\":\"nginx:1.25\"}",
            "gitHash": "",
        })))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .await
        .deploy_app("web", &BuildSource::Image("nginx:1.25".into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn runtime_info_reads_build_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/apps/appData/web"))
        .respond_with(ok(json!({
            "isAppBuilding": true,
            "isBuildFailed": false,
            "logs": { "lines": [] }
        })))
        .mount(&server)
        .await;

    let info = client(&server).await.runtime_info("web").await.unwrap();

    assert!(info.is_building);
    assert!(!info.is_build_failed);
}

#[tokio::test]
async fn login_stores_token_for_later_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/login"))
        .and(body_json(json!({ "password": "hunter2" })))
        .respond_with(ok(json!({ "token": "session-token" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/user/system/createbackup"))
        .and(header("x-captain-auth", "session-token"))
        .respond_with(ok(json!({ "downloadToken": "dl-123" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = PlatformClient::new(&server.uri(), "captain").unwrap();
    assert!(!client.is_authenticated());
    client.login("hunter2").await.unwrap();
    assert!(client.is_authenticated());

    let token = client.create_backup().await.unwrap();
    assert_eq!(token.0, "dl-123");
}

#[tokio::test]
async fn refused_connection_is_transient() {
    let client = PlatformClient::new("http://127.0.0.1:1", "captain").unwrap();

    let err = client.list_apps().await.unwrap_err();

    assert!(err.is_transient(), "got {err:?}");
}

#[tokio::test]
async fn manifest_repository_fetches_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/apps/wordpress.yml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("captainVersion: 4\n"))
        .mount(&server)
        .await;

    let repository =
        HttpManifestRepository::new(&format!("{}/v4/apps", server.uri()), "yml").unwrap();

    let document = repository.fetch("wordpress").await.unwrap();

    assert_eq!(document, "captainVersion: 4\n");
}

#[tokio::test]
async fn manifest_repository_reports_missing_manifest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/apps/nope.yml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let repository =
        HttpManifestRepository::new(&format!("{}/v4/apps", server.uri()), "yml").unwrap();

    let err = repository.fetch("nope").await.unwrap_err();

    assert!(matches!(err, Error::ManifestFetch { ref name, .. } if name == "nope"));
}
