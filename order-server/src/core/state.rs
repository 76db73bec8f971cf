use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::orders::OrderManager;
use crate::realtime::{ConnectionRegistry, NotificationRouter};
use crate::store::{CatalogProvider, CouponStore, MemoryStore, OrderRepository, RestaurantProvider};

/// Shared application state, cheap to clone into handlers.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub jwt_service: Arc<JwtService>,
    pub registry: Arc<ConnectionRegistry>,
    pub orders: Arc<OrderManager>,
}

impl ServerState {
    pub fn initialize(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        // Registry has an explicit lifecycle: created here, drained by
        // `shutdown`. The router only ever reads it.
        let registry = Arc::new(ConnectionRegistry::new());
        let notifier = NotificationRouter::new(registry.clone());

        let orders = Arc::new(OrderManager::new(
            store.clone() as Arc<dyn OrderRepository>,
            store.clone() as Arc<dyn RestaurantProvider>,
            store.clone() as Arc<dyn CatalogProvider>,
            store.clone() as Arc<dyn CouponStore>,
            notifier,
        ));

        Self {
            config: config.clone(),
            store,
            jwt_service,
            registry,
            orders,
        }
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Drain all live connections. Called once on graceful shutdown.
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}
