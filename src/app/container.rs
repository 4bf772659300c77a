use std::sync::Arc;

use tracing::info;

use crate::adapters::{HttpClipService, ScriptedClipService, ServiceConfig};
use crate::app::job_orchestrator::JobOrchestrator;
use crate::catalog::FormatCatalog;
use crate::domain::errors::DomainError;
use crate::ports::ClipServicePort;

/// Access to the wired application services
pub trait AppContainer: Send + Sync {
    fn config(&self) -> &ServiceConfig;
    fn orchestrator(&self) -> Arc<JobOrchestrator>;
    fn catalog(&self) -> Arc<FormatCatalog>;
}

pub struct DefaultAppContainer {
    config: ServiceConfig,
    orchestrator: Arc<JobOrchestrator>,
    catalog: Arc<FormatCatalog>,
}

impl DefaultAppContainer {
    /// Wire everything against the HTTP service at `config.base_url`
    pub fn new(config: ServiceConfig) -> Result<Self, DomainError> {
        let service = Arc::new(HttpClipService::new(
            &config.base_url,
            config.request_timeout(),
        )?);
        info!(base_url = %config.base_url, "Using processing service");
        Self::with_service(config, service)
    }

    /// Wire everything against the in-memory demo service
    pub fn dry_run(config: ServiceConfig) -> Result<Self, DomainError> {
        info!("Dry run: using the in-memory demo service");
        Self::with_service(config, Arc::new(ScriptedClipService::demo()))
    }

    pub fn with_service(
        config: ServiceConfig,
        service: Arc<dyn ClipServicePort>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let orchestrator = Arc::new(JobOrchestrator::new(
            Arc::clone(&service),
            config.poll_interval(),
        )?);
        let catalog = Arc::new(FormatCatalog::new(
            service,
            config.debounce(),
            config.preference()?,
        )?);

        Ok(Self {
            config,
            orchestrator,
            catalog,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn orchestrator(&self) -> Arc<JobOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    fn catalog(&self) -> Arc<FormatCatalog> {
        Arc::clone(&self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Quality;
    use std::time::Duration;

    #[test]
    fn test_container_uses_config() {
        let mut config = ServiceConfig::default();
        config.poll_interval_ms = 250;
        config.quality_preference = vec!["720p".to_string()];

        let container = DefaultAppContainer::dry_run(config).unwrap();
        assert_eq!(
            container.orchestrator().poll_interval(),
            Duration::from_millis(250)
        );
        assert_eq!(container.catalog().preference(), &[Quality::P720]);
    }

    #[test]
    fn test_container_rejects_invalid_config() {
        let mut config = ServiceConfig::default();
        config.base_url = String::new();
        assert!(DefaultAppContainer::new(config).is_err());
    }
}
