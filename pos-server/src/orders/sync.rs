//! Delta sync over the `updated_at` index
//!
//! Terminals poll with the highest `updated_at` they have applied and
//! receive everything strictly newer, ascending. A cursor of 0 or no
//! cursor at all yields a bounded full sync: every active order plus
//! the terminal orders that changed within the recent window. Old
//! completed orders stay out of the payload; history browsing is a
//! reporting query, not a sync concern.
//!
//! The epoch UUID is minted at startup. Clients compare it between
//! polls and drop their cursor when it changes, so counters reset by
//! a restore-from-backup cannot leave a terminal with stale state.

use uuid::Uuid;

use shared::order::{OrderSnapshot, SyncQuery, SyncResponse};
use shared::util::now_millis;

use super::error::OrderResult;
use super::storage::OrderStorage;

pub struct SyncService {
    storage: OrderStorage,
    epoch: Uuid,
    recent_window_ms: i64,
    page_limit: usize,
}

impl SyncService {
    pub fn new(
        storage: OrderStorage,
        epoch: Uuid,
        recent_window_ms: i64,
        page_limit: usize,
    ) -> Self {
        Self {
            storage,
            epoch,
            recent_window_ms,
            page_limit,
        }
    }

    pub fn epoch(&self) -> Uuid {
        self.epoch
    }

    pub fn sync(&self, query: &SyncQuery) -> OrderResult<SyncResponse> {
        match query.cursor {
            Some(cursor) if cursor > 0 => self.delta_sync(cursor),
            _ => self.full_sync(),
        }
    }

    fn delta_sync(&self, cursor: i64) -> OrderResult<SyncResponse> {
        let orders = self.storage.get_updated_since(cursor, self.page_limit)?;
        let next_cursor = orders.last().map(|o| o.updated_at).unwrap_or(cursor);
        tracing::debug!(cursor, returned = orders.len(), "Delta sync");
        Ok(SyncResponse {
            orders,
            next_cursor,
            server_epoch: self.epoch.to_string(),
            full_sync: false,
        })
    }

    /// Active orders plus recently-touched terminal ones
    fn full_sync(&self) -> OrderResult<SyncResponse> {
        let since = now_millis() - self.recent_window_ms;
        let mut orders = self.storage.get_active_orders()?;
        for order in self.storage.get_updated_since(since, self.page_limit)? {
            if !orders.iter().any(|o| o.id == order.id) {
                orders.push(order);
            }
        }
        orders.retain(|o| o.lifecycle.is_active());
        orders.sort_by_key(|o| o.updated_at);
        self.truncate_page(&mut orders);

        let next_cursor = orders.last().map(|o| o.updated_at).unwrap_or(0);
        tracing::debug!(returned = orders.len(), "Full sync");
        Ok(SyncResponse {
            orders,
            next_cursor,
            server_epoch: self.epoch.to_string(),
            full_sync: true,
        })
    }

    /// Cap at the page limit without cutting inside an equal
    /// `updated_at` group; `next_cursor` is strictly-greater, so a
    /// split group would never be delivered to that client again.
    fn truncate_page(&self, orders: &mut Vec<OrderSnapshot>) {
        if orders.len() <= self.page_limit {
            return;
        }
        let boundary = orders[self.page_limit - 1].updated_at;
        let cut = orders[self.page_limit..]
            .iter()
            .position(|o| o.updated_at != boundary)
            .map(|p| self.page_limit + p)
            .unwrap_or(orders.len());
        orders.truncate(cut);
    }
}
