use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::SystemError;
use crate::actor_framework::{sequential_ids, ResourceActor};
use crate::clients::{OrderClient, PartnerClient, ProductClient};
use crate::config::ReconcilerConfig;
use crate::domain::{Order, Partner, Product};
use crate::error::StoreError;
use crate::reconciler::OrderReconciler;
use crate::stats::OrderStats;
use crate::store::ActorStore;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The back office: resource actors, the store over them and the reconciler.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct BackOfficeSystem {
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    pub partner_client: PartnerClient,
    pub store: Arc<ActorStore>,
    pub reconciler: OrderReconciler,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl BackOfficeSystem {
    /// Spawns the actors on the current tokio runtime.
    pub fn start(config: &ReconcilerConfig) -> Self {
        let timeout = config.request_timeout();

        let (product_actor, product_inner) = ResourceActor::<Product>::new(config.actor_buffer, sequential_ids("product"));
        let product_client = ProductClient::new(product_inner.with_timeout(timeout));
        let product_handle = tokio::spawn(product_actor.run());

        let (order_actor, order_inner) = ResourceActor::<Order>::new(config.actor_buffer, sequential_ids("order"));
        let order_client = OrderClient::new(order_inner.with_timeout(timeout));
        let order_handle = tokio::spawn(order_actor.run());

        let (partner_actor, partner_inner) = ResourceActor::<Partner>::new(config.actor_buffer, sequential_ids("partner"));
        let partner_client = PartnerClient::new(partner_inner.with_timeout(timeout));
        let partner_handle = tokio::spawn(partner_actor.run());

        let store = Arc::new(ActorStore::new(
            product_client.clone(),
            order_client.clone(),
            partner_client.clone(),
        ));
        let reconciler = OrderReconciler::new(store.clone(), config);

        info!(
            stock_write_mode = ?config.stock_write_mode,
            missing_product = ?config.missing_product,
            "Back office started"
        );

        Self {
            product_client,
            order_client,
            partner_client,
            store,
            reconciler,
            handles: vec![product_handle, order_handle, partner_handle],
        }
    }

    pub async fn stats(&self) -> Result<OrderStats, StoreError> {
        let orders = self.order_client.list_orders().await?;
        Ok(OrderStats::from_orders(&orders))
    }

    /// Drops every client so the actors see their channels close, then waits
    /// for them. Actors still referenced elsewhere are aborted after a grace period.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        let Self {
            product_client,
            order_client,
            partner_client,
            store,
            reconciler,
            handles,
        } = self;

        // Drop clients to close channels
        drop(reconciler);
        drop(store);
        drop(product_client);
        drop(order_client);
        drop(partner_client);

        for handle in handles {
            let abort = handle.abort_handle();
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Actor task failed: {:?}", e);
                    return Err(SystemError::ActorTaskFailed(e.to_string()));
                }
                Err(_) => {
                    abort.abort();
                    error!("Actor task did not stop, aborted");
                    return Err(SystemError::ShutdownTimedOut(SHUTDOWN_GRACE));
                }
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
