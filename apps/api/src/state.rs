use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The service hosts exactly one editing session; the lock guarantees the
/// single-mutator rule without any further coordination.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            session: Arc::new(RwLock::new(Session::default())),
            config,
        }
    }
}
