//! Order service
//!
//! Entry point for every order mutation. The pipeline is always the
//! same: acquire the per-order lock, load the snapshot inside a write
//! transaction, apply the change through the aggregate, recompute
//! totals, persist, commit, then emit the delta and any tickets.
//! Emission happens after commit so clients never see state that did
//! not land on disk.
//!
//! The per-order locks serialize writers per order id; orders touched
//! by different terminals proceed in parallel. A lock held longer than
//! the configured timeout turns into [`OrderError::LockTimeout`], which
//! the API layer maps to a retryable 503.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use validator::Validate;

use shared::models::MenuItemInfo;
use shared::order::{
    Actor, DeltaKind, ItemStatus, OrderDelta, OrderListing, OrderSnapshot, OrderStatus, OrderType,
};
use shared::util::{now_millis, today_compact};

use crate::catalog::MenuCatalog;
use crate::printing::{tickets_for, PrinterDispatch};
use crate::settings::SettingsCache;

use super::aggregate::OrderAggregate;
use super::broadcast::Broadcaster;
use super::error::{OrderError, OrderResult};
use super::storage::OrderStorage;

/// One requested order line: which menu item, how many.
/// Serialize is needed by the validator derive on the containing
/// requests, which echoes offending values into validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub waiter_id: Option<u64>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemsRequest {
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<OrderItemInput>,
}

/// Payment and status update. Items are managed through the item
/// endpoints only, so an `items` field here is rejected outright
/// instead of being silently applied without state-machine checks.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<String>,
    pub tip_amount: Option<f64>,
    pub tax_number: Option<String>,
}

impl UpdateOrderRequest {
    fn has_payment_fields(&self) -> bool {
        self.payment_method.is_some() || self.tip_amount.is_some() || self.tax_number.is_some()
    }
}

pub struct OrderService {
    storage: OrderStorage,
    catalog: Arc<dyn MenuCatalog>,
    settings: SettingsCache,
    broadcaster: Arc<dyn Broadcaster>,
    printers: Arc<dyn PrinterDispatch>,
    locks: DashMap<u64, Arc<Mutex<()>>>,
    lock_timeout: Duration,
}

impl OrderService {
    pub fn new(
        storage: OrderStorage,
        catalog: Arc<dyn MenuCatalog>,
        settings: SettingsCache,
        broadcaster: Arc<dyn Broadcaster>,
        printers: Arc<dyn PrinterDispatch>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            catalog,
            settings,
            broadcaster,
            printers,
            locks: DashMap::new(),
            lock_timeout,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Acquire this order's mutation lock, bounded by the timeout
    async fn lock_order(&self, order_id: u64) -> OrderResult<OwnedMutexGuard<()>> {
        let mutex = self
            .locks
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        tokio::time::timeout(self.lock_timeout, mutex.lock_owned())
            .await
            .map_err(|_| OrderError::LockTimeout)
    }

    async fn resolve_items(
        &self,
        items: &[OrderItemInput],
    ) -> OrderResult<Vec<(MenuItemInfo, u32)>> {
        let mut resolved = Vec::with_capacity(items.len());
        for input in items {
            let menu_item = self
                .catalog
                .get_menu_item(input.menu_item_id)
                .await
                .ok_or(OrderError::MenuItemNotFound(input.menu_item_id))?;
            resolved.push((menu_item, input.quantity));
        }
        Ok(resolved)
    }

    fn emit(&self, snapshot: &OrderSnapshot, kind: DeltaKind) {
        self.broadcaster.emit_order_update(&OrderDelta {
            order_id: snapshot.id,
            order_number: snapshot.order_number.clone(),
            waiter_id: snapshot.waiter_id,
            updated_at: snapshot.updated_at,
            kind,
            order: snapshot.clone(),
        });
    }

    fn print_tickets(&self, snapshot: &OrderSnapshot, item_ids: Option<&[u64]>) {
        for ticket in tickets_for(snapshot, item_ids) {
            self.printers.dispatch(&ticket);
        }
    }

    // ========== Operations ==========

    /// Create a new order with its initial items
    pub async fn create_order(&self, req: CreateOrderRequest) -> OrderResult<OrderSnapshot> {
        req.validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;
        let resolved = self.resolve_items(&req.items).await?;
        let settings = self.settings.current().await;
        let now = now_millis();

        let day = today_compact();
        let txn = self.storage.begin_write()?;
        let order_id = self.storage.next_order_id(&txn)?;
        let daily = self
            .storage
            .next_daily_count(&txn, day.parse().unwrap_or(0))?;

        let mut agg = OrderAggregate::create(
            order_id,
            format!("ORD{}{:04}", day, daily),
            req.table_number,
            req.order_type,
            req.waiter_id,
            now,
        );
        for (menu_item, quantity) in &resolved {
            let item_id = self.storage.next_item_id(&txn)?;
            agg.add_item(item_id, *quantity, menu_item, now)?;
        }
        agg.recalculate_totals(&settings);
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        tracing::info!(
            order_id,
            order_number = %snapshot.order_number,
            items = snapshot.items.len(),
            total = snapshot.total_amount,
            "Order created"
        );
        self.emit(&snapshot, DeltaKind::OrderCreated);
        self.print_tickets(&snapshot, None);
        Ok(snapshot)
    }

    /// Append items to an open order
    pub async fn add_items(
        &self,
        order_id: u64,
        req: AddItemsRequest,
    ) -> OrderResult<OrderSnapshot> {
        req.validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;
        let resolved = self.resolve_items(&req.items).await?;
        let _guard = self.lock_order(order_id).await?;
        let settings = self.settings.current().await;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let mut agg = self
            .storage
            .get_order_txn(&txn, order_id)?
            .map(OrderAggregate::from_snapshot)
            .ok_or(OrderError::OrderNotFound(order_id))?;

        let mut item_ids = Vec::with_capacity(resolved.len());
        for (menu_item, quantity) in &resolved {
            let item_id = self.storage.next_item_id(&txn)?;
            agg.add_item(item_id, *quantity, menu_item, now)?;
            item_ids.push(item_id);
        }
        agg.recalculate_totals(&settings);
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        self.emit(&snapshot, DeltaKind::ItemsAdded {
            item_ids: item_ids.clone(),
        });
        self.print_tickets(&snapshot, Some(&item_ids));
        Ok(snapshot)
    }

    /// Remove a still-pending item
    pub async fn remove_item(&self, order_id: u64, item_id: u64) -> OrderResult<OrderSnapshot> {
        let _guard = self.lock_order(order_id).await?;
        let settings = self.settings.current().await;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let mut agg = self
            .storage
            .get_order_txn(&txn, order_id)?
            .map(OrderAggregate::from_snapshot)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        agg.remove_item(item_id, now)?;
        agg.recalculate_totals(&settings);
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        self.emit(&snapshot, DeltaKind::ItemRemoved { item_id });
        Ok(snapshot)
    }

    /// Move one item through its state machine on behalf of `actor`
    pub async fn transition_item(
        &self,
        order_id: u64,
        item_id: u64,
        to: ItemStatus,
        actor: Actor,
    ) -> OrderResult<OrderSnapshot> {
        let _guard = self.lock_order(order_id).await?;
        let settings = self.settings.current().await;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let mut agg = self
            .storage
            .get_order_txn(&txn, order_id)?
            .map(OrderAggregate::from_snapshot)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let kind = agg.transition_item(item_id, to, actor, now)?;
        if to == ItemStatus::Voided {
            agg.recalculate_totals(&settings);
        }
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        self.emit(&snapshot, kind);
        Ok(snapshot)
    }

    /// Void an item regardless of its progress (floor override)
    pub async fn void_item_override(
        &self,
        order_id: u64,
        item_id: u64,
        actor: Actor,
    ) -> OrderResult<OrderSnapshot> {
        let _guard = self.lock_order(order_id).await?;
        let settings = self.settings.current().await;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let mut agg = self
            .storage
            .get_order_txn(&txn, order_id)?
            .map(OrderAggregate::from_snapshot)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let kind = agg.void_item_override(item_id, actor, now)?;
        agg.recalculate_totals(&settings);
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        tracing::warn!(order_id, item_id, %actor, "Item voided by override");
        self.emit(&snapshot, kind);
        Ok(snapshot)
    }

    /// Move the whole order through its state machine
    pub async fn transition_order(
        &self,
        order_id: u64,
        to: OrderStatus,
    ) -> OrderResult<OrderSnapshot> {
        let _guard = self.lock_order(order_id).await?;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let mut agg = self
            .storage
            .get_order_txn(&txn, order_id)?
            .map(OrderAggregate::from_snapshot)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let kind = agg.transition_order(to, now)?;
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        tracing::info!(order_id, status = %to, "Order status changed");
        self.emit(&snapshot, kind);
        Ok(snapshot)
    }

    /// Payment fields and an optional status change in one atomic step
    pub async fn update_order(
        &self,
        order_id: u64,
        req: UpdateOrderRequest,
    ) -> OrderResult<OrderSnapshot> {
        req.validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;
        let _guard = self.lock_order(order_id).await?;
        let settings = self.settings.current().await;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let mut agg = self
            .storage
            .get_order_txn(&txn, order_id)?
            .map(OrderAggregate::from_snapshot)
            .ok_or(OrderError::OrderNotFound(order_id))?;

        let mut kinds = Vec::new();
        if req.has_payment_fields() {
            kinds.push(agg.update_payment(
                req.payment_method,
                req.tip_amount,
                req.tax_number,
                now,
            )?);
            agg.recalculate_totals(&settings);
        }
        if let Some(status) = req.status {
            kinds.push(agg.transition_order(status, now)?);
        }
        self.storage.store_order(&txn, agg.snapshot())?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        let snapshot = agg.into_snapshot();
        for kind in kinds {
            self.emit(&snapshot, kind);
        }
        Ok(snapshot)
    }

    // ========== Queries ==========

    pub async fn get_order(&self, order_id: u64) -> OrderResult<OrderSnapshot> {
        self.storage
            .get_order(order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Active orders with the delayed flag evaluated against current
    /// settings, oldest first.
    pub async fn list_orders(&self) -> OrderResult<Vec<OrderListing>> {
        let settings = self.settings.current().await;
        let now = now_millis();
        let mut orders = self.storage.get_active_orders()?;
        orders.sort_by_key(|o| o.created_at);
        Ok(self.to_listings(orders, now, settings.order_delay_threshold_minutes))
    }

    /// Bounded full scan, terminal orders included (reporting)
    pub async fn list_all_orders(&self, limit: usize) -> OrderResult<Vec<OrderListing>> {
        let settings = self.settings.current().await;
        let now = now_millis();
        let orders = self.storage.get_all_orders(limit)?;
        Ok(self.to_listings(orders, now, settings.order_delay_threshold_minutes))
    }

    fn to_listings(
        &self,
        orders: Vec<OrderSnapshot>,
        now: i64,
        threshold_minutes: i64,
    ) -> Vec<OrderListing> {
        orders
            .into_iter()
            .map(|order| {
                let delayed = order.is_delayed(now, threshold_minutes);
                OrderListing { order, delayed }
            })
            .collect()
    }
}
