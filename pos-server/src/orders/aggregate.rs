//! Order aggregate
//!
//! All invariants are enforced here, behind the service's per-order
//! lock: state guards, the transition tables, the completion
//! precondition and price immutability. Mutators bump `updated_at`;
//! failed operations leave the snapshot untouched because every check
//! runs before the first write.

use shared::models::{Lifecycle, MenuItemInfo, SettingsSnapshot};
use shared::order::{
    Actor, DeltaKind, ItemStatus, OrderItem, OrderSnapshot, OrderStatus, OrderType,
};

use super::error::{OrderError, OrderResult};
use super::{money, status};

/// Mutable wrapper around one order's snapshot
pub struct OrderAggregate {
    snapshot: OrderSnapshot,
}

impl OrderAggregate {
    /// Start a brand-new, still empty order
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: u64,
        order_number: String,
        table_number: Option<String>,
        order_type: OrderType,
        waiter_id: Option<u64>,
        now: i64,
    ) -> Self {
        Self {
            snapshot: OrderSnapshot {
                id,
                order_number,
                table_number,
                order_type,
                waiter_id,
                status: OrderStatus::Pending,
                lifecycle: Lifecycle::Active,
                items: Vec::new(),
                subtotal: 0.0,
                tax_amount: 0.0,
                service_amount: 0.0,
                tip_amount: 0.0,
                total_amount: 0.0,
                payment_method: None,
                tax_number: None,
                created_at: now,
                updated_at: now,
                completed_at: None,
            },
        }
    }

    /// Rehydrate from storage
    pub fn from_snapshot(snapshot: OrderSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &OrderSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> OrderSnapshot {
        self.snapshot
    }

    /// Closed orders admit no item mutations
    fn ensure_open(&self) -> OrderResult<()> {
        if self.snapshot.status.is_terminal() || !self.snapshot.lifecycle.is_active() {
            return Err(OrderError::OrderClosed(self.snapshot.status));
        }
        Ok(())
    }

    /// Add one item, snapshotting price and station from the menu
    pub fn add_item(
        &mut self,
        item_id: u64,
        quantity: u32,
        menu_item: &MenuItemInfo,
        now: i64,
    ) -> OrderResult<u64> {
        self.ensure_open()?;
        money::validate_quantity(quantity)?;
        money::validate_price(menu_item.price)?;

        self.snapshot.items.push(OrderItem {
            id: item_id,
            menu_item_id: menu_item.id,
            name: menu_item.name.clone(),
            station: menu_item.station,
            quantity,
            price_at_time: menu_item.price,
            status: ItemStatus::Pending,
        });
        self.snapshot.touch(now);
        Ok(item_id)
    }

    /// Remove a pending item. An item already being prepared must be
    /// voided instead, so the station sees the cancellation.
    pub fn remove_item(&mut self, item_id: u64, now: i64) -> OrderResult<()> {
        self.ensure_open()?;
        let item = self
            .snapshot
            .item(item_id)
            .ok_or(OrderError::ItemNotFound(item_id))?;
        if item.status != ItemStatus::Pending {
            return Err(OrderError::ItemNotRemovable(item.status));
        }
        if self.snapshot.items.len() == 1 {
            return Err(OrderError::EmptyOrder);
        }
        self.snapshot.items.retain(|i| i.id != item_id);
        self.snapshot.touch(now);
        Ok(())
    }

    /// Item transition through the regular table, with the station guard
    pub fn transition_item(
        &mut self,
        item_id: u64,
        to: ItemStatus,
        actor: Actor,
        now: i64,
    ) -> OrderResult<DeltaKind> {
        self.ensure_open()?;
        let item = self
            .snapshot
            .item(item_id)
            .ok_or(OrderError::ItemNotFound(item_id))?;
        let (from, station) = (item.status, item.station);

        status::check_station(actor, station)?;
        status::check_item_transition(from, to)?;

        // Checks passed, now mutate
        if let Some(item) = self.snapshot.item_mut(item_id) {
            item.status = to;
        }
        self.snapshot.touch(now);
        Ok(DeltaKind::ItemStatusChanged {
            item_id,
            station,
            from,
            to,
        })
    }

    /// Void override: a floor decision that discards a Ready/Served
    /// item. Reported as its own delta kind so station screens can
    /// show it differently from a regular void.
    pub fn void_item_override(
        &mut self,
        item_id: u64,
        actor: Actor,
        now: i64,
    ) -> OrderResult<DeltaKind> {
        self.ensure_open()?;
        if actor.station().is_some() {
            let station = self
                .snapshot
                .item(item_id)
                .map(|i| i.station)
                .ok_or(OrderError::ItemNotFound(item_id))?;
            return Err(OrderError::ForbiddenTransition { actor, station });
        }
        let item = self
            .snapshot
            .item(item_id)
            .ok_or(OrderError::ItemNotFound(item_id))?;
        let (from, station) = (item.status, item.station);

        match from {
            // Regular void territory; no override needed but allowed
            ItemStatus::Pending | ItemStatus::Preparing => {
                if let Some(item) = self.snapshot.item_mut(item_id) {
                    item.status = ItemStatus::Voided;
                }
                self.snapshot.touch(now);
                Ok(DeltaKind::ItemStatusChanged {
                    item_id,
                    station,
                    from,
                    to: ItemStatus::Voided,
                })
            }
            ItemStatus::Ready | ItemStatus::Served => {
                if let Some(item) = self.snapshot.item_mut(item_id) {
                    item.status = ItemStatus::Voided;
                }
                self.snapshot.touch(now);
                Ok(DeltaKind::ItemVoidOverridden { item_id, station })
            }
            ItemStatus::Voided => Err(OrderError::InvalidItemTransition {
                from,
                to: ItemStatus::Voided,
            }),
        }
    }

    /// Order-level transition. Completion requires every item terminal
    /// and stamps `completed_at`.
    pub fn transition_order(&mut self, to: OrderStatus, now: i64) -> OrderResult<DeltaKind> {
        let from = self.snapshot.status;
        status::check_order_transition(from, to)?;

        if to == OrderStatus::Completed {
            let pending = self.snapshot.non_terminal_items();
            if !pending.is_empty() {
                return Err(OrderError::ItemsNotTerminal {
                    pending_items: pending,
                });
            }
            self.snapshot.completed_at = Some(now);
        }

        self.snapshot.status = to;
        self.snapshot.touch(now);
        Ok(DeltaKind::OrderStatusChanged { from, to })
    }

    /// Update payment fields (method, tip, tax number).
    ///
    /// A completed order is read-only except for these fields: the
    /// usual floor sequence is complete first, settle afterwards.
    /// Cancelled or deleted orders take no payment at all.
    pub fn update_payment(
        &mut self,
        payment_method: Option<String>,
        tip_amount: Option<f64>,
        tax_number: Option<String>,
        now: i64,
    ) -> OrderResult<DeltaKind> {
        if self.snapshot.status == OrderStatus::Cancelled || !self.snapshot.lifecycle.is_active() {
            return Err(OrderError::OrderClosed(self.snapshot.status));
        }
        if let Some(tip) = tip_amount {
            money::validate_tip(tip)?;
            self.snapshot.tip_amount = tip;
        }
        if let Some(method) = payment_method {
            self.snapshot.payment_method = Some(method);
        }
        if let Some(tax_number) = tax_number {
            self.snapshot.tax_number = Some(tax_number);
        }
        self.snapshot.touch(now);
        Ok(DeltaKind::PaymentUpdated)
    }

    /// Recompute the derived financial fields from the full item list
    pub fn recalculate_totals(&mut self, settings: &SettingsSnapshot) {
        money::apply_totals(&mut self.snapshot, settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_item(id: u64, price: f64, station: shared::order::Station) -> MenuItemInfo {
        MenuItemInfo {
            id,
            name: format!("menu-{}", id),
            price,
            station,
        }
    }

    fn aggregate_with_items() -> OrderAggregate {
        use shared::order::Station;
        let mut agg = OrderAggregate::create(
            1,
            "ORD202508300001".into(),
            Some("4".into()),
            OrderType::DineIn,
            Some(9),
            1000,
        );
        agg.add_item(10, 2, &menu_item(100, 10.0, Station::Kitchen), 1001)
            .unwrap();
        agg.add_item(11, 1, &menu_item(200, 5.0, Station::Bar), 1002)
            .unwrap();
        agg
    }

    #[test]
    fn test_add_item_snapshots_price_and_station() {
        let agg = aggregate_with_items();
        let item = agg.snapshot().item(10).unwrap();
        assert_eq!(item.price_at_time, 10.0);
        assert_eq!(item.station, shared::order::Station::Kitchen);
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(agg.snapshot().updated_at, 1002);
    }

    #[test]
    fn test_mutations_rejected_on_closed_order() {
        let mut agg = aggregate_with_items();
        for id in [10, 11] {
            agg.transition_item(id, ItemStatus::Preparing, Actor::Admin, 1100)
                .unwrap();
            agg.transition_item(id, ItemStatus::Ready, Actor::Admin, 1101)
                .unwrap();
            agg.transition_item(id, ItemStatus::Served, Actor::Admin, 1102)
                .unwrap();
        }
        agg.transition_order(OrderStatus::Preparing, 1103).unwrap();
        agg.transition_order(OrderStatus::Ready, 1104).unwrap();
        agg.transition_order(OrderStatus::Completed, 1105).unwrap();

        let menu = menu_item(300, 2.0, shared::order::Station::Bar);
        assert!(matches!(
            agg.add_item(12, 1, &menu, 1106),
            Err(OrderError::OrderClosed(OrderStatus::Completed))
        ));
        assert_eq!(agg.snapshot().completed_at, Some(1105));
    }

    #[test]
    fn test_payment_settled_after_completion() {
        let mut agg = aggregate_with_items();
        for id in [10, 11] {
            agg.transition_item(id, ItemStatus::Preparing, Actor::Admin, 1100)
                .unwrap();
            agg.transition_item(id, ItemStatus::Ready, Actor::Admin, 1101)
                .unwrap();
            agg.transition_item(id, ItemStatus::Served, Actor::Admin, 1102)
                .unwrap();
        }
        agg.transition_order(OrderStatus::Preparing, 1103).unwrap();
        agg.transition_order(OrderStatus::Ready, 1104).unwrap();
        agg.transition_order(OrderStatus::Completed, 1105).unwrap();

        // complete first, settle afterwards
        let kind = agg
            .update_payment(Some("card".into()), Some(2.0), None, 1106)
            .unwrap();
        assert!(matches!(kind, DeltaKind::PaymentUpdated));
        assert_eq!(agg.snapshot().payment_method.as_deref(), Some("card"));
        assert_eq!(agg.snapshot().tip_amount, 2.0);
    }

    #[test]
    fn test_payment_rejected_on_cancelled_order() {
        let mut agg = aggregate_with_items();
        agg.transition_order(OrderStatus::Cancelled, 1100).unwrap();
        assert!(matches!(
            agg.update_payment(Some("cash".into()), None, None, 1101),
            Err(OrderError::OrderClosed(OrderStatus::Cancelled))
        ));
    }

    #[test]
    fn test_completion_blocked_by_pending_items() {
        let mut agg = aggregate_with_items();
        agg.transition_order(OrderStatus::Preparing, 1100).unwrap();
        agg.transition_order(OrderStatus::Ready, 1101).unwrap();

        let before = agg.snapshot().clone();
        let err = agg.transition_order(OrderStatus::Completed, 1102).unwrap_err();
        match err {
            OrderError::ItemsNotTerminal { pending_items } => {
                assert_eq!(pending_items, vec![10, 11]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // failed transition must not mutate
        assert_eq!(agg.snapshot(), &before);
    }

    #[test]
    fn test_completion_allowed_with_voided_items() {
        let mut agg = aggregate_with_items();
        agg.transition_item(10, ItemStatus::Voided, Actor::Waiter, 1100)
            .unwrap();
        agg.transition_item(11, ItemStatus::Preparing, Actor::Bar, 1101)
            .unwrap();
        agg.transition_item(11, ItemStatus::Ready, Actor::Bar, 1102)
            .unwrap();
        agg.transition_item(11, ItemStatus::Served, Actor::Waiter, 1103)
            .unwrap();

        agg.transition_order(OrderStatus::Preparing, 1104).unwrap();
        agg.transition_order(OrderStatus::Ready, 1105).unwrap();
        assert!(agg.transition_order(OrderStatus::Completed, 1106).is_ok());
    }

    #[test]
    fn test_station_guard_on_item_transition() {
        let mut agg = aggregate_with_items();
        // item 11 is a bar item
        let err = agg
            .transition_item(11, ItemStatus::Preparing, Actor::Kitchen, 1100)
            .unwrap_err();
        assert!(matches!(err, OrderError::ForbiddenTransition { .. }));

        assert!(
            agg.transition_item(11, ItemStatus::Preparing, Actor::Bar, 1101)
                .is_ok()
        );
    }

    #[test]
    fn test_remove_item_rules() {
        let mut agg = aggregate_with_items();
        agg.transition_item(10, ItemStatus::Preparing, Actor::Kitchen, 1100)
            .unwrap();

        // cooking item cannot be silently dropped
        assert!(matches!(
            agg.remove_item(10, 1101),
            Err(OrderError::ItemNotRemovable(ItemStatus::Preparing))
        ));

        // pending item can
        agg.remove_item(11, 1102).unwrap();
        assert!(agg.snapshot().item(11).is_none());

        // but never the last one
        assert!(matches!(
            agg.remove_item(10, 1103),
            Err(OrderError::ItemNotRemovable(_)) | Err(OrderError::EmptyOrder)
        ));
    }

    #[test]
    fn test_void_override_kinds() {
        let mut agg = aggregate_with_items();
        agg.transition_item(10, ItemStatus::Preparing, Actor::Kitchen, 1100)
            .unwrap();
        agg.transition_item(10, ItemStatus::Ready, Actor::Kitchen, 1101)
            .unwrap();

        // regular void of a ready item is rejected
        assert!(
            agg.transition_item(10, ItemStatus::Voided, Actor::Waiter, 1102)
                .is_err()
        );

        // station actors have no override authority
        assert!(agg.void_item_override(10, Actor::Kitchen, 1103).is_err());

        // override works and is reported distinctly
        let kind = agg.void_item_override(10, Actor::Waiter, 1104).unwrap();
        assert!(matches!(kind, DeltaKind::ItemVoidOverridden { item_id: 10, .. }));

        // pending item through the override path is just a void
        let kind = agg.void_item_override(11, Actor::Admin, 1105).unwrap();
        assert!(matches!(
            kind,
            DeltaKind::ItemStatusChanged {
                to: ItemStatus::Voided,
                ..
            }
        ));

        // double void is an error
        assert!(agg.void_item_override(10, Actor::Admin, 1106).is_err());
    }

    #[test]
    fn test_totals_recalculated_from_full_list() {
        let mut agg = aggregate_with_items();
        let settings = SettingsSnapshot {
            tax_rate: 0.10,
            service_rate: 0.05,
            ..SettingsSnapshot::default()
        };
        agg.recalculate_totals(&settings);
        assert_eq!(agg.snapshot().subtotal, 25.0);
        assert_eq!(agg.snapshot().total_amount, 28.75);

        agg.transition_item(10, ItemStatus::Voided, Actor::Waiter, 1100)
            .unwrap();
        agg.recalculate_totals(&settings);
        assert_eq!(agg.snapshot().subtotal, 5.0);
        assert_eq!(agg.snapshot().tax_amount, 0.5);
        assert_eq!(agg.snapshot().service_amount, 0.25);
        assert_eq!(agg.snapshot().total_amount, 5.75);
    }

    #[test]
    fn test_tip_flows_into_total() {
        let mut agg = aggregate_with_items();
        let settings = SettingsSnapshot {
            tax_rate: 0.10,
            service_rate: 0.05,
            ..SettingsSnapshot::default()
        };
        agg.update_payment(Some("card".into()), Some(3.0), None, 1100)
            .unwrap();
        agg.recalculate_totals(&settings);
        assert_eq!(agg.snapshot().total_amount, 31.75);
        assert_eq!(agg.snapshot().payment_method.as_deref(), Some("card"));
    }
}
