use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use price_watcher::core::{
    alerts::engine::AlertEngine,
    backend::HttpBackend,
    config::{ConfigManager, Settings},
    coordinator::{CheckOutcome, Coordinator},
    model::{NewProduct, PriceHistoryEntry, Product, ProductId},
    notifier::{ClickEvent, Notifier, PermissionState},
};
use tauri::{Manager, State};

mod surface;

use surface::TauriSurface;

type AppCoordinator = Coordinator<HttpBackend, TauriSurface>;

struct AppState {
    settings: Mutex<Settings>,
    config_manager: ConfigManager,
    /// One coordinator (and notifier) for the whole process
    coordinator: Arc<AppCoordinator>,
}

impl AppState {
    fn coordinator(&self) -> Arc<AppCoordinator> {
        Arc::clone(&self.coordinator)
    }
}

fn build_backend(settings: &Settings) -> Result<Arc<HttpBackend>, String> {
    HttpBackend::new(&settings.backend_url, settings.request_timeout())
        .map(Arc::new)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn list_products(state: State<'_, AppState>) -> Result<Vec<Product>, String> {
    state.coordinator().list_products().await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn add_product(product: NewProduct, state: State<'_, AppState>) -> Result<Product, String> {
    state.coordinator().add_product(product).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn delete_product(id: ProductId, state: State<'_, AppState>) -> Result<(), String> {
    state.coordinator().delete_product(id).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn check_price(id: ProductId, state: State<'_, AppState>) -> Result<CheckOutcome, String> {
    state.coordinator().check_price(id).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn price_history(id: ProductId, state: State<'_, AppState>) -> Result<Vec<PriceHistoryEntry>, String> {
    state.coordinator().price_history(id).await.map_err(|e| e.to_string())
}

#[tauri::command]
fn notification_clicked(event: ClickEvent, state: State<'_, AppState>) -> Result<(), String> {
    state
        .coordinator()
        .notifier()
        .on_click(&event)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn notification_permission(state: State<'_, AppState>) -> PermissionState {
    state.coordinator().notifier().permission()
}

#[tauri::command]
fn test_notification(state: State<'_, AppState>) -> Result<(), String> {
    state
        .coordinator()
        .notifier()
        .show_message("Price Tracker", "This is a test desktop notification.")
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn get_settings(state: State<'_, AppState>) -> Settings {
    state.settings.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

#[tauri::command]
async fn save_settings(settings: Settings, state: State<'_, AppState>) -> Result<(), String> {
    state.config_manager.save(&settings).map_err(|e| e.to_string())?;

    // Hot-reload: only the HTTP client is rebuilt
    let backend = build_backend(&settings)?;
    state.coordinator.replace_backend(backend);
    state
        .coordinator
        .update_alert_config(settings.alert_settings.clone());
    state
        .coordinator
        .notifier()
        .update_options(settings.notifier_options());
    *state.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;
    log::info!("Settings saved");
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            // Initialize Config
            let config_dir = app.path().app_config_dir().unwrap_or(PathBuf::from("."));
            let config_manager = ConfigManager::new(config_dir);
            let settings = config_manager.load();

            let surface = Arc::new(TauriSurface::new(app.handle().clone()));
            let notifier = Arc::new(Notifier::new(surface, settings.notifier_options()));
            let coordinator = Arc::new(Coordinator::new(
                build_backend(&settings)?,
                AlertEngine::new(settings.alert_settings.clone()),
                notifier,
            ));
            log::info!("Using price tracker backend at {}", settings.backend_url);

            // The permission prompt needs the async runtime
            let notifier = Arc::clone(coordinator.notifier());
            tauri::async_runtime::spawn(async move {
                notifier.ensure_permission();
            });

            app.manage(AppState {
                settings: Mutex::new(settings),
                config_manager,
                coordinator,
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            list_products,
            add_product,
            delete_product,
            check_price,
            price_history,
            notification_clicked,
            notification_permission,
            test_notification,
            get_settings,
            save_settings
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
