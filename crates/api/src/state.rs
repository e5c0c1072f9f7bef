use std::sync::Arc;

use beyond_core::media::ImageResolver;
use beyond_events::ChangeBus;
use beyond_site::{ContentEditor, SiteContent};
use beyond_store::{ContentFetcher, DataStore, ObjectStorage};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Row store, used directly only for health checks.
    pub store: Arc<dyn DataStore>,
    /// Read side: page renders.
    pub content: SiteContent,
    /// Write side: admin operations.
    pub editor: ContentEditor,
    /// Change fan-out shared by the realtime bridge, admin writes and
    /// live pages.
    pub bus: Arc<ChangeBus>,
    /// Live page websocket connections.
    pub ws_manager: Arc<WsManager>,
}

impl AppState {
    /// Wire the site services over the given store clients.
    pub fn new<S>(
        config: ServerConfig,
        store: Arc<dyn DataStore>,
        storage: Arc<S>,
        bus: Arc<ChangeBus>,
    ) -> Self
    where
        S: ObjectStorage + 'static,
    {
        let images = ImageResolver::new(storage.clone());
        let storage: Arc<dyn ObjectStorage> = storage;
        let fetcher = ContentFetcher::new(Arc::clone(&store));

        Self {
            config: Arc::new(config),
            store,
            content: SiteContent::new(fetcher.clone(), Arc::clone(&storage), images),
            editor: ContentEditor::new(fetcher, storage, Arc::clone(&bus)),
            bus,
            ws_manager: Arc::new(WsManager::new()),
        }
    }
}
