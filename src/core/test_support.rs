// In-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::backend::ProductBackend;
use super::error::{BackendError, RenderError};
use super::model::{NewProduct, PriceHistoryEntry, Product, ProductId};
use super::notifier::{NotificationRequest, NotificationSurface, PermissionState};

pub fn product(id: ProductId, current: Option<f64>, target: f64) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        url: Some(format!("https://shop.example/p/{id}")),
        description: None,
        image_url: None,
        current_price: current,
        target_price: target,
        is_active: Some(true),
        price_selector: None,
        notification_email: None,
        created_at: None,
        last_checked: None,
    }
}

#[derive(Default)]
struct SurfaceLog {
    next_id: u64,
    shown: Vec<NotificationRequest>,
    closed: Vec<u64>,
    opened: Vec<String>,
    focus_count: usize,
    prompt_count: usize,
    fail_next_show: Option<String>,
}

pub struct FakeSurface {
    supported: bool,
    permission: Mutex<PermissionState>,
    prompt_result: Mutex<PermissionState>,
    log: Mutex<SurfaceLog>,
}

impl FakeSurface {
    pub fn with_permission(permission: PermissionState) -> Self {
        Self {
            supported: true,
            permission: Mutex::new(permission),
            prompt_result: Mutex::new(PermissionState::Granted),
            log: Mutex::new(SurfaceLog::default()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::with_permission(PermissionState::Unsupported)
        }
    }

    pub fn set_prompt_result(&self, result: PermissionState) {
        *self.prompt_result.lock().unwrap() = result;
    }

    pub fn fail_next_show(&self, message: &str) {
        self.log.lock().unwrap().fail_next_show = Some(message.to_string());
    }

    pub fn shown(&self) -> Vec<NotificationRequest> {
        self.log.lock().unwrap().shown.clone()
    }

    pub fn closed(&self) -> Vec<u64> {
        self.log.lock().unwrap().closed.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.log.lock().unwrap().opened.clone()
    }

    pub fn focus_count(&self) -> usize {
        self.log.lock().unwrap().focus_count
    }

    pub fn prompt_count(&self) -> usize {
        self.log.lock().unwrap().prompt_count
    }
}

#[async_trait]
impl NotificationSurface for FakeSurface {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Result<PermissionState, RenderError> {
        self.log.lock().unwrap().prompt_count += 1;
        let result = *self.prompt_result.lock().unwrap();
        *self.permission.lock().unwrap() = result;
        Ok(result)
    }

    fn show(&self, request: &NotificationRequest) -> Result<u64, RenderError> {
        let mut log = self.log.lock().unwrap();
        if let Some(message) = log.fail_next_show.take() {
            return Err(RenderError::Platform(message));
        }
        log.next_id += 1;
        log.shown.push(request.clone());
        Ok(log.next_id)
    }

    fn close(&self, id: u64) {
        self.log.lock().unwrap().closed.push(id);
    }

    fn open_url(&self, url: &str) -> Result<(), RenderError> {
        self.log.lock().unwrap().opened.push(url.to_string());
        Ok(())
    }

    fn focus_origin(&self) {
        self.log.lock().unwrap().focus_count += 1;
    }
}

/// Backend serving canned snapshots. `check_price` moves a product to the
/// next scripted price.
#[derive(Default)]
pub struct FakeBackend {
    products: Mutex<HashMap<ProductId, Product>>,
    next_prices: Mutex<HashMap<ProductId, Vec<f64>>>,
    fail_get: Mutex<Option<BackendError>>,
    fail_check: Mutex<Option<BackendError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_products(products: Vec<Product>) -> Self {
        let backend = Self::default();
        {
            let mut map = backend.products.lock().unwrap();
            for product in products {
                map.insert(product.id, product);
            }
        }
        backend
    }

    pub fn script_prices(&self, id: ProductId, prices: Vec<f64>) {
        self.next_prices.lock().unwrap().insert(id, prices);
    }

    pub fn fail_get_with(&self, err: BackendError) {
        *self.fail_get.lock().unwrap() = Some(err);
    }

    pub fn fail_check_with(&self, err: BackendError) {
        *self.fail_check.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn not_found(id: ProductId) -> BackendError {
        BackendError::Status {
            status: 404,
            body: format!("product {id} not found"),
        }
    }
}

#[async_trait]
impl ProductBackend for FakeBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.record("list".to_string());
        let mut products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        self.record(format!("get {id}"));
        if let Some(err) = self.fail_get.lock().unwrap().take() {
            return Err(err);
        }
        self.products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn check_price(&self, id: ProductId) -> Result<Product, BackendError> {
        self.record(format!("check {id}"));
        if let Some(err) = self.fail_check.lock().unwrap().take() {
            return Err(err);
        }
        let next = {
            let mut scripted = self.next_prices.lock().unwrap();
            scripted
                .get_mut(&id)
                .filter(|prices| !prices.is_empty())
                .map(|prices| prices.remove(0))
        };
        let mut products = self.products.lock().unwrap();
        let product = products.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if let Some(price) = next {
            product.current_price = Some(price);
        }
        Ok(product.clone())
    }

    async fn create_product(&self, new: &NewProduct) -> Result<Product, BackendError> {
        self.record(format!("create {}", new.name));
        let mut products = self.products.lock().unwrap();
        let id = products.keys().max().copied().unwrap_or(0) + 1;
        let mut created = product(id, None, new.target_price);
        created.name = new.name.clone();
        created.url = Some(new.url.clone());
        products.insert(id, created.clone());
        Ok(created)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        self.record(format!("delete {id}"));
        self.products
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>, BackendError> {
        self.record(format!("history {id}"));
        Ok(Vec::new())
    }
}
