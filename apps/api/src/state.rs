use std::sync::Arc;

use crate::config::Config;
use crate::providers::probe::ConnectionProber;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every record collection; each repository locks independently.
    pub store: Arc<Store>,
    pub config: Config,
    /// Pluggable connection tester for MCP providers. Default: `HttpProber`.
    pub prober: Arc<dyn ConnectionProber>,
}

impl AppState {
    pub fn new(store: Store, config: Config, prober: Arc<dyn ConnectionProber>) -> Self {
        Self {
            store: Arc::new(store),
            config,
            prober,
        }
    }
}
