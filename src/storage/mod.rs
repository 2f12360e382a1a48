//! Persistence of `SignupRecord`s.
//!
//! `SignupStore` is the seam between the web handlers and the table backend.
//! `AzureTableClient` talks to Azure Table Storage, `MemoryStore` keeps rows in process.

mod azure;
mod memory;

pub use azure::AzureTableClient;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::{model::SignupRecord, utils};

#[async_trait]
pub trait SignupStore: Send + Sync {
    fn table_name(&self) -> &str;

    /// Creates the table if it is missing. Succeeds when the table already exists,
    /// so it can be called before every write.
    async fn ensure_table(&self) -> Result<()>;

    /// Inserts a new entity. Never overwrites: an existing key is an error.
    async fn insert_entity(&self, record: &SignupRecord) -> Result<()>;

    /// Point read by the compound key.
    async fn get_entity(&self, partition_key: &str, row_key: &str)
        -> Result<Option<SignupRecord>>;
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error)]
pub enum Error {
    #[error("table service responded with status {status}, error code: {code}")]
    Service { status: u16, code: String },
    #[error("table '{0}' does not exist")]
    TableNotFound(String),
    #[error("entity already exists: {partition_key}/{row_key}")]
    EntityAlreadyExists {
        partition_key: String,
        row_key: String,
    },
    #[error("failed to build the request url: {0}")]
    UrlParsing(String),
    #[error("failed to sign the request: {0}")]
    Signing(String),

    #[error("http client error")]
    Reqwest(#[from] reqwest::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        utils::error_chain_fmt(self, f)
    }
}
