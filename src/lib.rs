pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod db;
pub mod dialog;
pub mod forms;
pub mod models;
pub mod pages;
pub mod session;
pub mod table;
pub mod upload;


use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use api::{ApiClient, ApiError, HttpTransport, Transport};
use auth::RefreshOutcome;
use cli::Cli;
use config::{AppConfig, ConfigError};
use controller::{PageError, Resource, ResourceController};
use db::{CredentialStore, Database, StoreError};
use pages::{BusinessPage, BusinessResource, ItemResource, ItemsPage};
use session::{AccessDenied, AuthError, Session};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("accès refusé : {0}")]
    Access(#[from] AccessDenied),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("enregistrement introuvable : {0}")]
    NotFound(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Application root: owns the session-backed API client and the background
/// credential refresher, and hands out role-gated page controllers.
pub struct AdminApp {
    config: AppConfig,
    api: ApiClient,
    refresher: Option<JoinHandle<()>>,
}

impl AdminApp {
    /// Opens the credential store, restores the session and connects the
    /// HTTP transport.
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        let db = Database::open(&config.session_db)?;
        db.initialize()?;
        let session = Arc::new(Session::init(CredentialStore::new(db))?);
        let transport = Arc::new(HttpTransport::new(&config.api_url)?);
        info!(api = %config.api_url, signed_in = session.is_authenticated(), "admin app started");
        Ok(Self::from_parts(config, transport, session))
    }

    pub fn from_parts(config: AppConfig, transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self {
            config,
            api: ApiClient::new(transport, session),
            refresher: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<Session> {
        self.api.session()
    }

    /// Starts the periodic expiry check. Must be called inside a tokio runtime.
    pub fn start_token_refresh(&mut self) {
        if self.refresher.is_none() {
            debug!(every = ?self.config.refresh_interval, "starting credential refresher");
            self.refresher = Some(auth::spawn_token_refresh(
                self.api.clone(),
                self.config.refresh_interval,
            ));
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_some()
    }

    /// Controller for `R`, if the signed-in role may open its page.
    pub fn open<R: Resource>(&self) -> Result<ResourceController<R>, AccessDenied> {
        self.session().authorize(R::ALLOWED_ROLES)?;
        Ok(ResourceController::new(self.api.clone()))
    }

    pub fn business_page(&self) -> Result<BusinessPage, AccessDenied> {
        self.session().authorize(BusinessResource::ALLOWED_ROLES)?;
        Ok(BusinessPage::new(self.api.clone()))
    }

    pub fn items_page(&self) -> Result<ItemsPage, AccessDenied> {
        self.session().authorize(ItemResource::ALLOWED_ROLES)?;
        Ok(ItemsPage::new(self.api.clone()))
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.refresher.take() {
            handle.abort();
        }
    }
}

impl Drop for AdminApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs one parsed command line and returns what to print.
pub async fn run(args: Cli) -> Result<String, AppError> {
    let config = AppConfig::from_env()?;
    let mut app = AdminApp::start(config)?;

    // Bring a nearly expired credential up to date before the command uses it
    if let RefreshOutcome::SignedOut = auth::check_expiry(app.api(), Utc::now().timestamp()).await {
        info!("stored session expired");
    }
    app.start_token_refresh();

    let output = cli::execute(&app, args.command).await;
    app.shutdown();
    output
}
