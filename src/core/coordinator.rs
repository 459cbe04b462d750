use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use super::alerts::engine::{AlertEngine, AlertEngineConfig};
use super::alerts::model::NotificationDecision;
use super::backend::ProductBackend;
use super::error::{RenderError, TrackerError};
use super::model::{NewProduct, PriceHistoryEntry, PriceObservation, Product, ProductId};
use super::notifier::{NotificationHandle, NotificationSurface, Notifier};

/// Steps of one price-check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckPhase {
    Idle,
    Fetching,
    Checking,
    Deciding,
    Notifying,
    Failed,
}

impl CheckPhase {
    pub fn can_advance_to(self, next: CheckPhase) -> bool {
        use CheckPhase::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Checking)
                | (Checking, Deciding)
                | (Deciding, Notifying)
                | (Notifying, Idle)
                | (Fetching, Failed)
                | (Checking, Failed)
        )
    }
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Phase tracker for a single cycle
#[derive(Debug)]
struct CheckCycle {
    product_id: ProductId,
    phase: CheckPhase,
    trail: Vec<CheckPhase>,
}

impl CheckCycle {
    fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            phase: CheckPhase::Idle,
            trail: vec![CheckPhase::Idle],
        }
    }

    fn advance(&mut self, next: CheckPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "invalid check transition {} -> {}",
            self.phase,
            next
        );
        log::debug!(
            "Check {}: {} -> {}",
            self.product_id,
            self.phase,
            next
        );
        self.phase = next;
        self.trail.push(next);
    }
}

/// Result of a successful check, whether or not anything was shown
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub product: Product,
    #[serde(skip)]
    pub observation: PriceObservation,
    pub decision: NotificationDecision,
    pub notification: Option<NotificationHandle>,
    pub phases: Vec<CheckPhase>,
}

/// Lives for the whole process; settings changes are applied in place so the
/// notifier keeps its permission state and live notifications.
pub struct Coordinator<B: ProductBackend, S: NotificationSurface> {
    backend: RwLock<Arc<B>>,
    engine: RwLock<AlertEngine>,
    notifier: Arc<Notifier<S>>,
}

impl<B: ProductBackend, S: NotificationSurface> Coordinator<B, S> {
    pub fn new(backend: Arc<B>, engine: AlertEngine, notifier: Arc<Notifier<S>>) -> Self {
        Self {
            backend: RwLock::new(backend),
            engine: RwLock::new(engine),
            notifier,
        }
    }

    pub fn notifier(&self) -> &Arc<Notifier<S>> {
        &self.notifier
    }

    /// Backend used by cycles started from now on
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap the backend, e.g. after the URL changed. In-flight cycles finish
    /// on the backend they started with.
    pub fn replace_backend(&self, backend: Arc<B>) {
        *self.backend.write().unwrap_or_else(PoisonError::into_inner) = backend;
    }

    pub fn alert_config(&self) -> AlertEngineConfig {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config()
            .clone()
    }

    pub fn update_alert_config(&self, config: AlertEngineConfig) {
        self.engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update_config(config);
    }

    /// Run one price-check cycle. Fetch or check failures abort the cycle
    /// before any decision is made; notification failures do not.
    pub async fn check_price(&self, id: ProductId) -> Result<CheckOutcome, TrackerError> {
        let mut cycle = CheckCycle::new(id);
        let backend = self.backend();

        // 1. Snapshot before the check
        cycle.advance(CheckPhase::Fetching);
        let before = match backend.get_product(id).await {
            Ok(product) => product,
            Err(source) => {
                cycle.advance(CheckPhase::Failed);
                log::error!("Error fetching product {}: {}", id, source);
                return Err(TrackerError::Fetch { id, source });
            }
        };

        // 2. Live price check
        cycle.advance(CheckPhase::Checking);
        let after = match backend.check_price(id).await {
            Ok(product) => product,
            Err(source) => {
                cycle.advance(CheckPhase::Failed);
                log::error!("Error checking price for product {}: {}", id, source);
                return Err(TrackerError::Check { id, source });
            }
        };

        // 3. Decide
        cycle.advance(CheckPhase::Deciding);
        let observation = PriceObservation::from_snapshots(&before, &after);
        let decision = self
            .engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .evaluate(&observation);

        // 4. Notify
        cycle.advance(CheckPhase::Notifying);
        let notification = if decision.is_none() {
            None
        } else {
            match self.notifier.notify(&decision, &after) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    log_render_error(&after, &err);
                    None
                }
            }
        };

        cycle.advance(CheckPhase::Idle);
        log::info!(
            "Price checked for {}: {:?} -> {:?} (target {:.2}), decision {:?}",
            after.name,
            observation.old_price,
            observation.new_price,
            observation.target_price,
            decision.rule_id()
        );

        Ok(CheckOutcome {
            product: after,
            observation,
            decision,
            notification,
            phases: cycle.trail,
        })
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, TrackerError> {
        self.backend()
            .list_products()
            .await
            .map_err(TrackerError::List)
    }

    pub async fn add_product(&self, product: NewProduct) -> Result<Product, TrackerError> {
        let created = self
            .backend()
            .create_product(&product.normalized())
            .await
            .map_err(TrackerError::Create)?;
        log::info!("Added product {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), TrackerError> {
        self.backend()
            .delete_product(id)
            .await
            .map_err(|source| TrackerError::Delete { id, source })?;
        log::info!("Deleted product {}", id);
        Ok(())
    }

    pub async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>, TrackerError> {
        self.backend()
            .price_history(id)
            .await
            .map_err(|source| TrackerError::History { id, source })
    }
}

fn log_render_error(product: &Product, err: &RenderError) {
    match err {
        RenderError::Platform(_) | RenderError::UnknownNotification(_) => {
            log::warn!("Error showing notification for {}: {}", product.name, err)
        }
        _ => log::debug!("Notification for {} not shown: {}", product.name, err),
    }
}
