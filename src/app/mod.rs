use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::AppConfig,
    storage::{AzureTableClient, SignupStore},
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the table client and binds the listener.
    /// Fails fast on an invalid storage connection string, before any request is served.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let storage_config = config.storage_config;
        let account = storage_config.storage_account()?;
        let table_client = AzureTableClient::new(
            account,
            storage_config.table_name.clone(),
            storage_config.timeout(),
        )?;
        info!(
            "{:<20} - {}",
            "Using storage table:", storage_config.table_name
        );

        let app_state = AppState::new(Arc::new(table_client));

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub store: Arc<dyn SignupStore>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(store: Arc<dyn SignupStore>) -> Self {
        AppState(Arc::new(InternalState { store }))
    }
}
