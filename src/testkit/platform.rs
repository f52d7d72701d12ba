//! In-memory [`PlatformApi`] with scripted build states and failure injection.
//!
//! Every request is recorded as a [`PlatformCall`] so tests can assert on
//! ordering and on what was never sent.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    AppDefinition, AppUpdate, BackupToken, BuildSource, ServiceRuntimeInfo, SystemInfo,
    DEFAULT_CONTAINER_HTTP_PORT,
};
use crate::error::{RemoteError, Result};
use crate::port::PlatformApi;

/// Build still running.
pub const BUILDING: ServiceRuntimeInfo = ServiceRuntimeInfo {
    is_building: true,
    is_build_failed: false,
};
/// Build finished successfully.
pub const DONE: ServiceRuntimeInfo = ServiceRuntimeInfo {
    is_building: false,
    is_build_failed: false,
};
/// Build finished and failed.
pub const FAILED: ServiceRuntimeInfo = ServiceRuntimeInfo {
    is_building: false,
    is_build_failed: true,
};

/// A request received by [`FakePlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    SystemInfo,
    ListApps,
    Register { name: String, persistent: bool },
    Update { name: String },
    Deploy { name: String, source: BuildSource },
    Runtime { name: String },
    Delete { name: String, volumes: Vec<String> },
    AddDomain { name: String, domain: String },
    EnableTls { name: String, domain: String },
    Backup,
}

/// Operation kinds that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListApps,
    Register,
    Update,
    Deploy,
}

#[derive(Default)]
struct State {
    apps: Vec<AppDefinition>,
    calls: Vec<PlatformCall>,
    runtime: HashMap<String, VecDeque<ServiceRuntimeInfo>>,
    runtime_errors: HashSet<String>,
    failures: HashMap<(Op, String), VecDeque<RemoteError>>,
}

/// Scriptable stand-in for the control API.
pub struct FakePlatform {
    root_domain: String,
    state: Mutex<State>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    /// Empty platform rooted at `apps.test` whose builds finish immediately.
    pub fn new() -> Self {
        Self {
            root_domain: "apps.test".to_string(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_root_domain(mut self, domain: &str) -> Self {
        self.root_domain = domain.to_string();
        self
    }

    /// Pre-register apps so they show up in listings.
    pub fn with_existing_apps(self, names: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for name in names {
                state.apps.push(definition(name, false));
            }
        }
        self
    }

    /// Runtime answers for `name`, one per poll. The last entry repeats.
    pub fn with_runtime_script(self, name: &str, script: Vec<ServiceRuntimeInfo>) -> Self {
        self.state
            .lock()
            .unwrap()
            .runtime
            .insert(name.to_string(), script.into());
        self
    }

    /// Make every runtime poll for `name` fail.
    pub fn with_runtime_error(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .runtime_errors
            .insert(name.to_string());
        self
    }

    /// Queue errors returned by the next calls of `op` on `target`.
    ///
    /// `target` is the app name, or `""` for [`Op::ListApps`].
    pub fn with_failures(self, op: Op, target: &str, errors: Vec<RemoteError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry((op, target.to_string()))
            .or_default()
            .extend(errors);
        self
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Names passed to `register_app`, in order.
    pub fn register_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::Register { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Names passed to `deploy_app`, in order.
    pub fn deploy_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::Deploy { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn runtime_polls(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PlatformCall::Runtime { name: n } if n == name))
            .count()
    }

    /// Names of apps currently registered.
    pub fn app_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .apps
            .iter()
            .map(|app| app.name.clone())
            .collect()
    }

    fn record(&self, call: PlatformCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn injected(&self, op: Op, target: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state
            .failures
            .get_mut(&(op, target.to_string()))
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

fn definition(name: &str, has_persistent_data: bool) -> AppDefinition {
    AppDefinition {
        name: name.to_string(),
        instance_count: 1,
        has_persistent_data,
        not_expose_as_web_app: false,
        container_http_port: DEFAULT_CONTAINER_HTTP_PORT,
        custom_domains: Vec::new(),
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn system_info(&self) -> Result<SystemInfo> {
        self.record(PlatformCall::SystemInfo);
        Ok(SystemInfo {
            root_domain: self.root_domain.clone(),
        })
    }

    async fn list_apps(&self) -> Result<Vec<AppDefinition>> {
        self.record(PlatformCall::ListApps);
        self.injected(Op::ListApps, "")?;
        Ok(self.state.lock().unwrap().apps.clone())
    }

    async fn register_app(&self, name: &str, has_persistent_data: bool) -> Result<()> {
        self.record(PlatformCall::Register {
            name: name.to_string(),
            persistent: has_persistent_data,
        });
        self.injected(Op::Register, name)?;

        let mut state = self.state.lock().unwrap();
        if state.apps.iter().any(|app| app.name == name) {
            return Err(RemoteError::Operation {
                status: 1000,
                description: format!("App already exists: {name}"),
            }
            .into());
        }
        state.apps.push(definition(name, has_persistent_data));
        Ok(())
    }

    async fn update_app(&self, update: &AppUpdate) -> Result<()> {
        self.record(PlatformCall::Update {
            name: update.app_name.clone(),
        });
        self.injected(Op::Update, &update.app_name)?;

        let mut state = self.state.lock().unwrap();
        if let Some(app) = state.apps.iter_mut().find(|app| app.name == update.app_name) {
            app.instance_count = update.instance_count;
            app.not_expose_as_web_app = update.not_expose_as_web_app;
            app.container_http_port = update.container_http_port;
        }
        Ok(())
    }

    async fn deploy_app(&self, name: &str, source: &BuildSource) -> Result<()> {
        self.record(PlatformCall::Deploy {
            name: name.to_string(),
            source: source.clone(),
        });
        self.injected(Op::Deploy, name)
    }

    async fn runtime_info(&self, name: &str) -> Result<ServiceRuntimeInfo> {
        self.record(PlatformCall::Runtime {
            name: name.to_string(),
        });

        let mut state = self.state.lock().unwrap();
        if state.runtime_errors.contains(name) {
            return Err(RemoteError::Operation {
                status: 1000,
                description: format!("App not found: {name}"),
            }
            .into());
        }
        let info = match state.runtime.get_mut(name) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap_or(DONE),
            Some(script) => script.front().copied().unwrap_or(DONE),
            None => DONE,
        };
        Ok(info)
    }

    async fn delete_app(&self, name: &str, volumes: &[String]) -> Result<()> {
        self.record(PlatformCall::Delete {
            name: name.to_string(),
            volumes: volumes.to_vec(),
        });
        self.state.lock().unwrap().apps.retain(|app| app.name != name);
        Ok(())
    }

    async fn add_custom_domain(&self, name: &str, domain: &str) -> Result<()> {
        self.record(PlatformCall::AddDomain {
            name: name.to_string(),
            domain: domain.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(app) = state.apps.iter_mut().find(|app| app.name == name) {
            app.custom_domains.push(domain.to_string());
        }
        Ok(())
    }

    async fn enable_custom_domain_tls(&self, name: &str, domain: &str) -> Result<()> {
        self.record(PlatformCall::EnableTls {
            name: name.to_string(),
            domain: domain.to_string(),
        });
        Ok(())
    }

    async fn create_backup(&self) -> Result<BackupToken> {
        self.record(PlatformCall::Backup);
        Ok(BackupToken("backup-token".to_string()))
    }
}
