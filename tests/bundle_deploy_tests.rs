//! End-to-end bundle deployments against the in-memory platform.

mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use rigger::application::bundle::BundleOrchestrator;
use rigger::domain::{BuildSource, DeployEvent, DeploymentReport};
use rigger::error::{DeployError, Error, RemoteError, Result};
use rigger::infrastructure::config::deploy::DeployConfig;
use rigger::testkit::config::{context, deploy, deploy_with_retries};
use rigger::testkit::domain::{BLOG_MANIFEST, CYCLE_MANIFEST};
use rigger::testkit::manifest::StaticManifests;
use rigger::testkit::observer::RecordingObserver;
use rigger::testkit::platform::{FakePlatform, Op, PlatformCall, BUILDING, FAILED};

use support::calls::assert_completed_before;
use support::manifest::with_dependencies;

fn orchestrator(platform: &Arc<FakePlatform>, settings: DeployConfig) -> BundleOrchestrator {
    BundleOrchestrator::new(
        platform.clone(),
        Arc::new(StaticManifests::new()),
        context(),
        settings,
    )
}

async fn run(platform: &Arc<FakePlatform>, manifest: &str, instance: &str) -> Result<DeploymentReport> {
    orchestrator(platform, deploy())
        .deploy_document(manifest, instance, &BTreeMap::new())
        .await
}

#[tokio::test]
async fn dependency_is_fully_deployed_before_dependent_is_touched() {
    let platform = Arc::new(FakePlatform::new());
    let manifest = with_dependencies(&[("app", &["db"]), ("db", &[])]);

    let report = run(&platform, &manifest, "stack").await.unwrap();

    assert_eq!(report.deployed, vec!["db", "app"]);
    let calls = platform.calls();
    assert_eq!(
        &calls[..7],
        &[
            PlatformCall::ListApps,
            PlatformCall::Register {
                name: "db".into(),
                persistent: false,
            },
            PlatformCall::Update { name: "db".into() },
            PlatformCall::Deploy {
                name: "db".into(),
                source: BuildSource::Image("db:latest".into()),
            },
            PlatformCall::Runtime { name: "db".into() },
            PlatformCall::Runtime { name: "db".into() },
            PlatformCall::Register {
                name: "app".into(),
                persistent: false,
            },
        ]
    );
}

#[tokio::test]
async fn mutual_dependency_fails_without_any_create() {
    let platform = Arc::new(FakePlatform::new());

    let result = run(&platform, CYCLE_MANIFEST, "pair").await;

    match result {
        Err(Error::Deploy(DeployError::DependencyResolution { mut pending })) => {
            pending.sort();
            assert_eq!(pending, vec!["x", "y"]);
        }
        other => panic!("expected dependency resolution error, got {other:?}"),
    }
    assert!(platform.register_calls().is_empty());
}

#[tokio::test]
async fn dangling_reference_reports_only_the_stuck_services() {
    let platform = Arc::new(FakePlatform::new());
    let manifest = with_dependencies(&[
        ("web", &[]),
        ("worker", &["queue"]),
        ("cron", &["worker"]),
    ]);

    let result = run(&platform, &manifest, "jobs").await;

    assert!(matches!(
        result,
        Err(Error::Deploy(DeployError::DependencyResolution { ref pending }))
            if pending == &vec!["worker".to_string(), "cron".to_string()]
    ));
    assert_eq!(platform.register_calls(), vec!["web"]);
}

#[tokio::test]
async fn dag_deploys_every_service_once_after_its_dependencies() {
    let platform = Arc::new(FakePlatform::new());
    let edges: &[(&str, &[&str])] = &[
        ("web", &["api"]),
        ("api", &["db", "cache"]),
        ("cache", &["db"]),
        ("db", &[]),
        ("metrics", &[]),
    ];
    let manifest = with_dependencies(edges);

    let report = run(&platform, &manifest, "shop").await.unwrap();

    let mut registered = platform.register_calls();
    assert_eq!(registered.len(), edges.len());
    registered.sort();
    registered.dedup();
    assert_eq!(registered.len(), edges.len());
    assert_eq!(report.deployed.len(), edges.len());

    let calls = platform.calls();
    for (service, deps) in edges {
        for dep in *deps {
            assert_completed_before(&calls, dep, service);
        }
    }
}

#[tokio::test]
async fn transient_create_failure_is_retried() {
    let platform = Arc::new(FakePlatform::new().with_failures(
        Op::Register,
        "db",
        vec![RemoteError::Transient("connection reset".into())],
    ));
    let observer = Arc::new(RecordingObserver::new());
    let manifest = with_dependencies(&[("db", &[])]);

    let report = orchestrator(&platform, deploy())
        .with_observer(observer.clone())
        .deploy_document(&manifest, "solo", &BTreeMap::new())
        .await
        .unwrap();

    assert_eq!(report.deployed, vec!["db"]);
    assert_eq!(platform.register_calls(), vec!["db", "db"]);
    assert_eq!(observer.retries(), 1);
}

#[tokio::test]
async fn platform_rejection_is_not_retried_and_aborts() {
    let platform = Arc::new(FakePlatform::new().with_failures(
        Op::Update,
        "db",
        vec![RemoteError::Operation {
            status: 1000,
            description: "invalid port".into(),
        }],
    ));
    let manifest = with_dependencies(&[("db", &[]), ("app", &["db"])]);

    let result = run(&platform, &manifest, "stack").await;

    assert!(matches!(
        result,
        Err(Error::Remote(RemoteError::Operation { status: 1000, .. }))
    ));
    let updates = platform
        .calls()
        .into_iter()
        .filter(|call| matches!(call, PlatformCall::Update { .. }))
        .count();
    assert_eq!(updates, 1);
    assert_eq!(platform.register_calls(), vec!["db"]);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_transient_error() {
    let platform = Arc::new(FakePlatform::new().with_failures(
        Op::Deploy,
        "db",
        vec![
            RemoteError::Transient("first".into()),
            RemoteError::Transient("second".into()),
            RemoteError::Transient("third".into()),
        ],
    ));
    let manifest = with_dependencies(&[("db", &[])]);

    let result = orchestrator(&platform, deploy_with_retries(3))
        .deploy_document(&manifest, "solo", &BTreeMap::new())
        .await;

    assert!(matches!(
        result,
        Err(Error::Remote(RemoteError::Transient(ref reason))) if reason == "third"
    ));
    assert_eq!(platform.deploy_calls(), vec!["db", "db", "db"]);
}

#[tokio::test]
async fn failed_build_stops_the_rollout() {
    let platform =
        Arc::new(FakePlatform::new().with_runtime_script("db", vec![BUILDING, FAILED]));
    let manifest = with_dependencies(&[("db", &[]), ("app", &["db"])]);

    let result = run(&platform, &manifest, "stack").await;

    assert!(matches!(
        result,
        Err(Error::Deploy(DeployError::BuildFailed { ref service })) if service == "db"
    ));
    assert_eq!(platform.register_calls(), vec!["db"]);
}

#[tokio::test]
async fn endless_build_times_out_after_poll_cap() {
    let platform = Arc::new(FakePlatform::new().with_runtime_script("db", vec![BUILDING]));
    let manifest = with_dependencies(&[("db", &[])]);

    let result = run(&platform, &manifest, "solo").await;

    assert!(matches!(
        result,
        Err(Error::Deploy(DeployError::BuildTimeout { ref service, polls: 5 })) if service == "db"
    ));
    assert_eq!(platform.runtime_polls("db"), 5);
}

#[tokio::test]
async fn overall_deadline_cancels_a_slow_rollout() {
    let platform = Arc::new(FakePlatform::new().with_runtime_script("db", vec![BUILDING]));
    let manifest = with_dependencies(&[("db", &[])]);
    let settings = DeployConfig {
        build_poll_interval_ms: 50,
        build_max_polls: 10_000,
        timeout_secs: Some(1),
        ..DeployConfig::immediate()
    };

    let result = orchestrator(&platform, settings)
        .deploy_document(&manifest, "solo", &BTreeMap::new())
        .await;

    assert!(matches!(
        result,
        Err(Error::Deploy(DeployError::DeployTimeout { secs: 1 }))
    ));
}

#[tokio::test]
async fn existing_app_blocks_the_whole_bundle() {
    let platform = Arc::new(FakePlatform::new().with_existing_apps(&["blog-db"]));

    let result = run(&platform, BLOG_MANIFEST, "blog").await;

    assert!(matches!(
        result,
        Err(Error::Deploy(DeployError::NameConflict { ref names })) if names == &vec!["blog-db".to_string()]
    ));
    assert!(platform.register_calls().is_empty());
}

#[tokio::test]
async fn blog_bundle_resolves_names_and_reports_instructions() {
    let platform = Arc::new(FakePlatform::new());
    let observer = Arc::new(RecordingObserver::new());

    let report = orchestrator(&platform, deploy())
        .with_observer(observer.clone())
        .deploy_document(BLOG_MANIFEST, "blog", &BTreeMap::new())
        .await
        .unwrap();

    assert_eq!(report.deployed, vec!["blog-db", "blog"]);
    assert_eq!(
        report.end_instructions.as_deref(),
        Some("Your blog is available at https://blog.apps.test")
    );
    assert!(platform.calls().contains(&PlatformCall::Register {
        name: "blog-db".into(),
        persistent: true,
    }));
    assert!(platform.calls().contains(&PlatformCall::Deploy {
        name: "blog-db".into(),
        source: BuildSource::Image("mariadb:10.11".into()),
    }));

    let deployed_events: Vec<String> = observer
        .events()
        .into_iter()
        .filter_map(|event| match event {
            DeployEvent::ServiceDeployed { service } => Some(service),
            _ => None,
        })
        .collect();
    assert_eq!(deployed_events, report.deployed);
}

#[tokio::test]
async fn supplied_variable_overrides_default() {
    let platform = Arc::new(FakePlatform::new());
    let variables: BTreeMap<String, String> =
        [("db_version".to_string(), "11.4".to_string())].into();

    orchestrator(&platform, deploy())
        .deploy_document(BLOG_MANIFEST, "blog", &variables)
        .await
        .unwrap();

    assert!(platform.calls().contains(&PlatformCall::Deploy {
        name: "blog-db".into(),
        source: BuildSource::Image("mariadb:11.4".into()),
    }));
}
