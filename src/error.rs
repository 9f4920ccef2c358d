use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ConfigError(#[from] crate::config::Error),

    #[error(transparent)]
    BackendError(#[from] crate::backend::Error),

    #[error(transparent)]
    ControlError(#[from] crate::control::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error("invalid input seed {0:?}, expected <name>=<dB>")]
    InvalidSeed(String),
}
