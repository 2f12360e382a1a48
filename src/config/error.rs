pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to build the 'Environment' from the provided string: {0}")]
    StringToEnvironmentFail(String),
    #[error("storage connection string is empty, set 'StorageConnection'")]
    MissingConnectionString,
    #[error("storage connection string is missing the '{0}' setting")]
    ConnectionStringMissingKey(&'static str),
    #[error("storage connection string is malformed: {0}")]
    ConnectionStringMalformed(String),
    #[error("storage account key is not valid base64")]
    AccountKeyNotBase64,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("figment error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        ConfigError::Figment(Box::new(value))
    }
}
