use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use finapp::applications::{ApplicationId, HttpApplicationStorage, SubmissionAdapter};
use finapp::config::AppConfig;
use finapp::error::AppError;
use finapp::session::SessionIdentityProvider;
use finapp::storage::{FileKeyValueStore, UiPreferences};
use finapp::telemetry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Collaborators for commands that act as a client of a running backend.
pub(crate) struct ClientContext {
    pub(crate) config: AppConfig,
    pub(crate) storage: Arc<HttpApplicationStorage>,
    pub(crate) identity: Arc<SessionIdentityProvider>,
    pub(crate) local: Arc<FileKeyValueStore>,
}

impl ClientContext {
    pub(crate) fn from_config(config: AppConfig) -> Self {
        let storage = Arc::new(HttpApplicationStorage::new(config.api.endpoint.clone()));
        let identity = Arc::new(SessionIdentityProvider::from_config(&config.session));
        let local = Arc::new(FileKeyValueStore::in_dir(&config.storage.data_dir));
        Self {
            config,
            storage,
            identity,
            local,
        }
    }

    pub(crate) fn submission(
        &self,
    ) -> SubmissionAdapter<HttpApplicationStorage, SessionIdentityProvider> {
        SubmissionAdapter::new(Arc::clone(&self.storage), Arc::clone(&self.identity))
    }

    pub(crate) fn preferences(&self) -> UiPreferences<FileKeyValueStore> {
        UiPreferences::new(Arc::clone(&self.local))
    }
}

/// Load configuration and install the subscriber; shared by every subcommand.
pub(crate) fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn parse_id(raw: &str) -> Result<ApplicationId, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("application id must not be empty".to_string());
    }
    Ok(ApplicationId(trimmed.to_string()))
}
