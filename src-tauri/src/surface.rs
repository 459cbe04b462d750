// Tauri-backed notification surface.
//
// The desktop notification plugin cannot retract or report clicks on a toast,
// so every shown/closed notification is mirrored to the webview, which renders
// an in-app card and reports clicks back through `notification_clicked`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use price_watcher::core::error::RenderError;
use price_watcher::core::notifier::{NotificationRequest, NotificationSurface, PermissionState};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_notification::{NotificationExt, PermissionState as PluginPermission};
use tauri_plugin_opener::OpenerExt;

const MAIN_WINDOW: &str = "main";

#[derive(Clone, Serialize)]
struct ShownPayload<'a> {
    id: u64,
    title: &'a str,
    body: &'a str,
    tag: &'a str,
    require_interaction: bool,
}

pub struct TauriSurface {
    app: AppHandle,
    next_id: AtomicU64,
}

impl TauriSurface {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            next_id: AtomicU64::new(0),
        }
    }
}

fn map_permission(state: PluginPermission) -> PermissionState {
    match state {
        PluginPermission::Granted => PermissionState::Granted,
        PluginPermission::Denied => PermissionState::Denied,
        _ => PermissionState::Default,
    }
}

#[async_trait]
impl NotificationSurface for TauriSurface {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionState {
        match self.app.notification().permission_state() {
            Ok(state) => map_permission(state),
            Err(e) => {
                log::warn!("Could not read notification permission: {}", e);
                PermissionState::Default
            }
        }
    }

    async fn request_permission(&self) -> Result<PermissionState, RenderError> {
        self.app
            .notification()
            .request_permission()
            .map(map_permission)
            .map_err(|e| RenderError::Platform(e.to_string()))
    }

    fn show(&self, request: &NotificationRequest) -> Result<u64, RenderError> {
        self.app
            .notification()
            .builder()
            .title(&request.title)
            .body(&request.body)
            .show()
            .map_err(|e| RenderError::Platform(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = ShownPayload {
            id,
            title: &request.title,
            body: &request.body,
            tag: &request.tag,
            require_interaction: request.require_interaction,
        };
        if let Err(e) = self.app.emit("notification-shown", payload) {
            log::debug!("Could not mirror notification {} to the UI: {}", id, e);
        }
        Ok(id)
    }

    fn close(&self, id: u64) {
        let _ = self.app.emit("notification-closed", id);
    }

    fn open_url(&self, url: &str) -> Result<(), RenderError> {
        self.app
            .opener()
            .open_url(url, None::<&str>)
            .map_err(|e| RenderError::Platform(e.to_string()))
    }

    fn focus_origin(&self) {
        if let Some(window) = self.app.get_webview_window(MAIN_WINDOW) {
            let _ = window.unminimize();
            let _ = window.show();
            let _ = window.set_focus();
        }
    }
}
