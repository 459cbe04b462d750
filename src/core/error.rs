use thiserror::Error;

use super::model::ProductId;

/// Failure talking to the price-tracking backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors surfaced to the user action that started the operation.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("could not load product {id}: {source}")]
    Fetch {
        id: ProductId,
        #[source]
        source: BackendError,
    },
    #[error("price check failed for product {id}: {source}")]
    Check {
        id: ProductId,
        #[source]
        source: BackendError,
    },
    #[error("could not add product: {0}")]
    Create(#[source] BackendError),
    #[error("could not delete product {id}: {source}")]
    Delete {
        id: ProductId,
        #[source]
        source: BackendError,
    },
    #[error("could not list products: {0}")]
    List(#[source] BackendError),
    #[error("could not load price history for product {id}: {source}")]
    History {
        id: ProductId,
        #[source]
        source: BackendError,
    },
}

/// Reasons a notification was not rendered. Never fails a check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("desktop notifications are not supported on this platform")]
    Unsupported,
    #[error("notification permission was denied")]
    PermissionDenied,
    #[error("notification permission has not been granted yet")]
    PermissionPending,
    #[error("desktop notifications are disabled in settings")]
    Disabled,
    #[error("nothing to notify")]
    NothingToShow,
    #[error("no live notification with id {0}")]
    UnknownNotification(u64),
    #[error("platform notification error: {0}")]
    Platform(String),
}
