// Desktop notifier - permission gate, tag replacement and click handling.
//
// The platform side (showing, closing, opening links) lives behind
// `NotificationSurface`; the desktop shell provides the real one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::alerts::message::NotificationContent;
use super::alerts::model::NotificationDecision;
use super::error::RenderError;
use super::model::{Product, ProductId};

/// Topic tag shared by every notification from this app
pub const NOTIFICATION_TAG: &str = "price-tracker";

/// Mirrors the platform's notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Unsupported,
    Default,
    Granted,
    Denied,
}

/// How notifications are grouped into replaceable slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TagPolicy {
    /// One slot for the whole app: a new notification replaces any visible one
    #[default]
    SingleSlot,
    /// One slot per product
    PerProduct,
}

impl TagPolicy {
    pub fn tag_for(&self, product_id: ProductId) -> String {
        match self {
            Self::SingleSlot => NOTIFICATION_TAG.to_string(),
            Self::PerProduct => format!("{NOTIFICATION_TAG}-{product_id}"),
        }
    }
}

/// What the platform is asked to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub require_interaction: bool,
}

/// A notification currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationHandle {
    pub id: u64,
    pub tag: String,
    pub url: Option<String>,
    pub require_interaction: bool,
}

/// Click on a notification, as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub notification_id: u64,
}

/// Platform notification capability.
#[async_trait]
pub trait NotificationSurface: Send + Sync + 'static {
    fn is_supported(&self) -> bool;

    /// Current platform permission, without prompting
    fn permission(&self) -> PermissionState;

    /// Prompt the user. May take arbitrarily long.
    async fn request_permission(&self) -> Result<PermissionState, RenderError>;

    /// Display a notification and return its platform id
    fn show(&self, request: &NotificationRequest) -> Result<u64, RenderError>;

    fn close(&self, id: u64);

    /// Open a link in a new browsing context
    fn open_url(&self, url: &str) -> Result<(), RenderError>;

    /// Bring the originating window to the front
    fn focus_origin(&self);
}

#[derive(Debug, Clone)]
pub struct NotifierOptions {
    pub enabled: bool,
    /// Fallback close delay for notifications that do not require interaction
    pub auto_close: Duration,
    pub tag_policy: TagPolicy,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_close: Duration::from_secs(5),
            tag_policy: TagPolicy::SingleSlot,
        }
    }
}

struct NotifierState {
    permission: PermissionState,
    request_issued: bool,
    /// Live notifications by tag
    visible: HashMap<String, NotificationHandle>,
    options: NotifierOptions,
}

pub struct Notifier<S: NotificationSurface> {
    surface: Arc<S>,
    state: Mutex<NotifierState>,
}

impl<S: NotificationSurface> Notifier<S> {
    pub fn new(surface: Arc<S>, options: NotifierOptions) -> Self {
        Self {
            surface,
            state: Mutex::new(NotifierState {
                permission: PermissionState::Default,
                request_issued: false,
                visible: HashMap::new(),
                options,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, NotifierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn options(&self) -> NotifierOptions {
        self.lock_state().options.clone()
    }

    /// Apply new settings. Permission state and live notifications are kept.
    pub fn update_options(&self, options: NotifierOptions) {
        self.lock_state().options = options;
    }

    pub fn permission(&self) -> PermissionState {
        self.lock_state().permission
    }

    /// Number of notifications currently on screen
    pub fn visible_count(&self) -> usize {
        self.lock_state().visible.len()
    }

    pub fn visible(&self) -> Vec<NotificationHandle> {
        self.lock_state().visible.values().cloned().collect()
    }

    /// Sync with the platform permission and, if it is still undecided, ask
    /// the user once. The prompt resolves in the background; the returned
    /// state is the one known right now.
    pub fn ensure_permission(self: &Arc<Self>) -> PermissionState {
        if !self.surface.is_supported() {
            log::warn!("Desktop notifications are not supported on this platform");
            self.lock_state().permission = PermissionState::Unsupported;
            return PermissionState::Unsupported;
        }

        let mut state = self.lock_state();
        if state.request_issued {
            return state.permission;
        }

        state.permission = self.surface.permission();
        if state.permission != PermissionState::Default {
            return state.permission;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                log::warn!("No async runtime available, skipping notification permission request");
                return state.permission;
            }
        };
        state.request_issued = true;
        drop(state);

        log::info!("Requesting notification permission...");
        let notifier = Arc::clone(self);
        runtime.spawn(async move {
            let resolved = match notifier.surface.request_permission().await {
                Ok(resolved) => resolved,
                Err(err) => {
                    log::error!("Error requesting notification permission: {}", err);
                    return;
                }
            };
            notifier.lock_state().permission = resolved;

            if resolved == PermissionState::Granted {
                log::info!("Desktop notifications enabled");
                if let Err(err) = notifier.show_welcome() {
                    log::warn!("Could not show welcome notification: {}", err);
                }
            } else {
                log::info!("Desktop notifications denied ({:?})", resolved);
            }
        });

        PermissionState::Default
    }

    fn check_gate(&self) -> Result<(), RenderError> {
        let state = self.lock_state();
        if !state.options.enabled {
            return Err(RenderError::Disabled);
        }
        match state.permission {
            PermissionState::Granted => Ok(()),
            PermissionState::Unsupported => Err(RenderError::Unsupported),
            PermissionState::Denied => Err(RenderError::PermissionDenied),
            PermissionState::Default => Err(RenderError::PermissionPending),
        }
    }

    /// Show the notification for a decision about `product`.
    pub fn notify(
        self: &Arc<Self>,
        decision: &NotificationDecision,
        product: &Product,
    ) -> Result<NotificationHandle, RenderError> {
        self.check_gate()?;
        let content = NotificationContent::for_decision(decision, &product.name)
            .ok_or(RenderError::NothingToShow)?;
        let tag = self.lock_state().options.tag_policy.tag_for(product.id);
        self.show(content, tag, product.link().map(str::to_string))
    }

    fn show_welcome(self: &Arc<Self>) -> Result<NotificationHandle, RenderError> {
        self.check_gate()?;
        self.show(
            NotificationContent::welcome(),
            NOTIFICATION_TAG.to_string(),
            None,
        )
    }

    /// Show a free-form notification in the shared slot.
    pub fn show_message(
        self: &Arc<Self>,
        title: &str,
        body: &str,
    ) -> Result<NotificationHandle, RenderError> {
        self.check_gate()?;
        self.show(
            NotificationContent::plain(title, body),
            NOTIFICATION_TAG.to_string(),
            None,
        )
    }

    fn show(
        self: &Arc<Self>,
        content: NotificationContent,
        tag: String,
        url: Option<String>,
    ) -> Result<NotificationHandle, RenderError> {
        let request = NotificationRequest {
            title: content.title,
            body: content.body,
            tag: tag.clone(),
            require_interaction: content.require_interaction,
        };

        let handle = {
            let mut state = self.lock_state();
            // A failed show leaves the current notification in its slot
            let id = self.surface.show(&request)?;
            let handle = NotificationHandle {
                id,
                tag: tag.clone(),
                url,
                require_interaction: request.require_interaction,
            };
            // Same tag supersedes whatever is on screen
            if let Some(previous) = state.visible.insert(tag, handle.clone()) {
                self.surface.close(previous.id);
            }
            handle
        };

        if !handle.require_interaction {
            self.schedule_auto_close(handle.id);
        }
        Ok(handle)
    }

    fn schedule_auto_close(self: &Arc<Self>, id: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::debug!("No async runtime, leaving notification {} to the platform", id);
            return;
        };
        let notifier = Arc::clone(self);
        let delay = self.lock_state().options.auto_close;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.dismiss(id);
        });
    }

    /// Close a notification if it is still on screen. Returns whether it was.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.lock_state();
        let tag = state
            .visible
            .iter()
            .find(|(_, handle)| handle.id == id)
            .map(|(tag, _)| tag.clone());
        match tag {
            Some(tag) => {
                state.visible.remove(&tag);
                self.surface.close(id);
                true
            }
            None => false,
        }
    }

    /// Open the product page for a clicked notification and return to the app.
    pub fn on_click(&self, event: &ClickEvent) -> Result<(), RenderError> {
        let handle = self
            .lock_state()
            .visible
            .values()
            .find(|handle| handle.id == event.notification_id)
            .cloned()
            .ok_or(RenderError::UnknownNotification(event.notification_id))?;

        if let Some(url) = &handle.url {
            if let Err(err) = self.surface.open_url(url) {
                log::warn!("Failed to open {}: {}", url, err);
            }
        }
        self.surface.focus_origin();
        self.dismiss(handle.id);
        Ok(())
    }
}
