use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncServerError {
    #[error("Could not initialize the synchronization daemon. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the daemon. {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
#[error("Could not convert the feed record into a match update. {0}.")]
pub struct UpdateConversionError(pub String);
