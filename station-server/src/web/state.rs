//! Application state for the web layer.

use std::sync::Arc;

use crate::prices::StationFeed;
use crate::routing::RoutingClient;
use crate::session::LiveSearchSession;
use crate::settings::SettingsStore;

/// The session type the production server runs.
pub type ProdSession = LiveSearchSession<StationFeed, RoutingClient>;

/// Shared application state.
///
/// Contains the one live-search session and the policy store.
#[derive(Clone)]
pub struct AppState {
    /// The live-search session
    pub session: Arc<ProdSession>,

    /// Persistence for the user policy
    pub settings: Arc<SettingsStore>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(session: ProdSession, settings: SettingsStore) -> Self {
        Self {
            session: Arc::new(session),
            settings: Arc::new(settings),
        }
    }
}
