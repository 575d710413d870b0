use std::sync::Arc;

use crate::application::ports::health_probe::HealthProbe;
use crate::application::ports::log_repository::LogRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::infrastructure::memory::{AlwaysHealthy, InMemoryLogRepository, InMemoryUserRepository};

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    log_repo: Arc<dyn LogRepository>,
    user_repo: Arc<dyn UserRepository>,
    health_probe: Arc<dyn HealthProbe>,
}

impl AppServices {
    pub fn new(
        log_repo: Arc<dyn LogRepository>,
        user_repo: Arc<dyn UserRepository>,
        health_probe: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            log_repo,
            user_repo,
            health_probe,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryLogRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(AlwaysHealthy),
        )
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn log_repo(&self) -> Arc<dyn LogRepository> {
        self.services.log_repo.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn health_probe(&self) -> Arc<dyn HealthProbe> {
        self.services.health_probe.clone()
    }
}
