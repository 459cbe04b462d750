#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod core;

pub use crate::core::coordinator::{CheckOutcome, Coordinator};
pub use crate::core::error::{BackendError, RenderError, TrackerError};
pub use crate::core::notifier::{Notifier, NotificationSurface, PermissionState};
