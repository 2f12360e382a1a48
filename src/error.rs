use crate::{config, storage};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] storage::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
