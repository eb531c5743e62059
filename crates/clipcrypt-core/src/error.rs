use thiserror::Error;

pub type ClipcryptResult<T> = Result<T, ClipcryptError>;

#[derive(Debug, Error)]
pub enum ClipcryptError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
