use thiserror::Error;

#[derive(Error, Debug)]
pub enum KodecanterError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed window-system message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Window system unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Window backend failed: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KodecanterError {
    pub fn service_unavailable<T>(msg: impl Into<String>) -> Result<T> {
        Err(KodecanterError::ServiceUnavailable(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, KodecanterError>;

#[macro_export]
macro_rules! kc_error {
    (backend, $($arg:tt)*) => {
        $crate::error::KodecanterError::Backend(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::KodecanterError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::KodecanterError::Internal(format!($($arg)*))
    };
}
