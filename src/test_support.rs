//! Fault-injecting [`InventoryStore`] for exercising failure paths.
//!
//! Wraps the real [`ActorStore`] of a running [`BackOfficeSystem`], records
//! every call and fails the ones it was told to.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::app_system::BackOfficeSystem;
use crate::clients::{OrderClient, PartnerClient, ProductClient};
use crate::config::ReconcilerConfig;
use crate::domain::{
    LineItem, NewOrder, NewPartner, OrderHeader, OrderId, PartnerId, Product, ProductId, StockSnapshot,
};
use crate::error::StoreError;
use crate::store::InventoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ReadProduct,
    ReadProductStock,
    WriteProductStock,
    AdjustProductStock,
    CreateOrder,
    ReadOrder,
    UpdateOrderHeader,
    FindOrdersByNumber,
    ReplaceOrderLineItems,
    ReadOrderLineItems,
    DeleteOrderLineItems,
    DeleteOrder,
    CreatePartner,
    DeletePartner,
}

impl Op {
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Op::WriteProductStock
                | Op::AdjustProductStock
                | Op::CreateOrder
                | Op::UpdateOrderHeader
                | Op::ReplaceOrderLineItems
                | Op::DeleteOrderLineItems
                | Op::DeleteOrder
                | Op::CreatePartner
                | Op::DeletePartner
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Timeout,
    Unavailable,
    /// Writes are applied but the caller sees a timeout. Reads are unaffected.
    ReplyLost,
}

impl Fault {
    fn error(self) -> StoreError {
        match self {
            Fault::Timeout | Fault::ReplyLost => StoreError::Timeout(Duration::from_millis(50)),
            Fault::Unavailable => StoreError::Unavailable("injected fault".into()),
        }
    }
}

#[derive(Default)]
struct Faults {
    calls: Vec<Op>,
    /// Fault and how many more calls it applies to; `None` means until healed.
    ops: HashMap<Op, (Fault, Option<usize>)>,
    products: HashMap<ProductId, Fault>,
    delays: HashMap<Op, Duration>,
    interleave: Option<(ProductId, i64)>,
}

pub struct FaultyStore {
    system: BackOfficeSystem,
    faults: Mutex<Faults>,
}

impl FaultyStore {
    pub fn start() -> Arc<Self> {
        Self::start_with(&ReconcilerConfig::default())
    }

    pub fn start_with(config: &ReconcilerConfig) -> Arc<Self> {
        Arc::new(Self {
            system: BackOfficeSystem::start(config),
            faults: Mutex::new(Faults::default()),
        })
    }

    pub fn products(&self) -> &ProductClient {
        &self.system.product_client
    }

    pub fn orders(&self) -> &OrderClient {
        &self.system.order_client
    }

    pub fn partners(&self) -> &PartnerClient {
        &self.system.partner_client
    }

    pub fn fail(&self, op: Op, fault: Fault) {
        self.lock().ops.insert(op, (fault, None));
    }

    /// Fails only the next `times` calls of `op`.
    pub fn fail_times(&self, op: Op, times: usize, fault: Fault) {
        self.lock().ops.insert(op, (fault, Some(times)));
    }

    /// Fails every stock read or write of one product.
    pub fn fail_product(&self, id: &ProductId, fault: Fault) {
        self.lock().products.insert(id.clone(), fault);
    }

    pub fn delay(&self, op: Op, by: Duration) {
        self.lock().delays.insert(op, by);
    }

    /// After the next stock read of `id`, another writer sets its stock to `stock`.
    pub fn interleave_write_after_read(&self, id: &ProductId, stock: i64) {
        self.lock().interleave = Some((id.clone(), stock));
    }

    pub fn heal(&self) {
        let mut faults = self.lock();
        faults.ops.clear();
        faults.products.clear();
        faults.delays.clear();
        faults.interleave = None;
    }

    pub fn calls(&self) -> Vec<Op> {
        self.lock().calls.clone()
    }

    pub fn writes(&self) -> Vec<Op> {
        self.calls().into_iter().filter(|op| op.is_write()).collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Faults> {
        match self.faults.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn enter(&self, op: Op, product: Option<&ProductId>) -> Option<Fault> {
        let (delay, fault) = {
            let mut faults = self.lock();
            faults.calls.push(op);
            let delay = faults.delays.get(&op).copied();

            let mut fault = product.and_then(|id| faults.products.get(id).copied());
            let mut exhausted = false;
            if fault.is_none() {
                if let Some((op_fault, remaining)) = faults.ops.get_mut(&op) {
                    fault = Some(*op_fault);
                    if let Some(left) = remaining {
                        *left = left.saturating_sub(1);
                        exhausted = *left == 0;
                    }
                }
            }
            if exhausted {
                faults.ops.remove(&op);
            }
            (delay, fault.filter(|fault| *fault != Fault::ReplyLost || op.is_write()))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        fault
    }

    /// Records `op` and runs `call` unless a fault says otherwise.
    async fn guarded<R: Send>(
        &self,
        op: Op,
        product: Option<&ProductId>,
        call: impl Future<Output = Result<R, StoreError>> + Send,
    ) -> Result<R, StoreError> {
        match self.enter(op, product).await {
            None => call.await,
            Some(Fault::ReplyLost) => {
                let _ = call.await;
                Err(Fault::ReplyLost.error())
            }
            Some(fault) => Err(fault.error()),
        }
    }

    fn store(&self) -> &dyn InventoryStore {
        self.system.store.as_ref()
    }
}

#[async_trait]
impl InventoryStore for FaultyStore {
    async fn read_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.guarded(Op::ReadProduct, None, self.store().read_product(id)).await
    }

    async fn read_product_stock(&self, id: &ProductId) -> Result<Option<StockSnapshot>, StoreError> {
        let snapshot = self
            .guarded(Op::ReadProductStock, Some(id), self.store().read_product_stock(id))
            .await?;

        let interleave = {
            let mut faults = self.lock();
            match &faults.interleave {
                Some((target, _)) if target == id => faults.interleave.take(),
                _ => None,
            }
        };
        if let Some((_, stock)) = interleave {
            self.store().write_product_stock(id, stock, None).await?;
        }
        Ok(snapshot)
    }

    async fn write_product_stock(
        &self,
        id: &ProductId,
        stock: i64,
        expected_version: Option<u64>,
    ) -> Result<bool, StoreError> {
        let call = self.store().write_product_stock(id, stock, expected_version);
        self.guarded(Op::WriteProductStock, Some(id), call).await
    }

    async fn adjust_product_stock(&self, id: &ProductId, delta: i64) -> Result<Option<i64>, StoreError> {
        self.guarded(Op::AdjustProductStock, Some(id), self.store().adjust_product_stock(id, delta)).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderHeader, StoreError> {
        self.guarded(Op::CreateOrder, None, self.store().create_order(order)).await
    }

    async fn read_order(&self, id: &OrderId) -> Result<Option<OrderHeader>, StoreError> {
        self.guarded(Op::ReadOrder, None, self.store().read_order(id)).await
    }

    async fn update_order_header(&self, header: &OrderHeader) -> Result<(), StoreError> {
        self.guarded(Op::UpdateOrderHeader, None, self.store().update_order_header(header)).await
    }

    async fn find_orders_by_number(&self, number: &str) -> Result<Vec<OrderId>, StoreError> {
        self.guarded(Op::FindOrdersByNumber, None, self.store().find_orders_by_number(number)).await
    }

    async fn replace_order_line_items(&self, id: &OrderId, items: &[LineItem]) -> Result<(), StoreError> {
        let call = self.store().replace_order_line_items(id, items);
        self.guarded(Op::ReplaceOrderLineItems, None, call).await
    }

    async fn read_order_line_items(&self, id: &OrderId) -> Result<Vec<LineItem>, StoreError> {
        self.guarded(Op::ReadOrderLineItems, None, self.store().read_order_line_items(id)).await
    }

    async fn delete_order_line_items(&self, id: &OrderId) -> Result<(), StoreError> {
        self.guarded(Op::DeleteOrderLineItems, None, self.store().delete_order_line_items(id)).await
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        self.guarded(Op::DeleteOrder, None, self.store().delete_order(id)).await
    }

    async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError> {
        self.guarded(Op::CreatePartner, None, self.store().create_partner(partner)).await
    }

    async fn delete_partner(&self, id: &PartnerId) -> Result<(), StoreError> {
        self.guarded(Op::DeletePartner, None, self.store().delete_partner(id)).await
    }
}
