//! Printer dispatch collaborator
//!
//! On order creation and item adds the service posts one ticket per
//! station so the kitchen and the bar each get only their own lines.
//! Driver protocols live elsewhere; the default implementation logs
//! the ticket. Failures follow the broadcast policy: logged, never
//! propagated into the mutation response.

use shared::order::{OrderSnapshot, Station};

/// One line on a station ticket
#[derive(Debug, Clone, PartialEq)]
pub struct TicketLine {
    pub name: String,
    pub quantity: u32,
}

/// A ticket addressed to one station
#[derive(Debug, Clone, PartialEq)]
pub struct TicketPayload {
    pub order_id: u64,
    pub order_number: String,
    pub table_number: Option<String>,
    pub station: Station,
    pub lines: Vec<TicketLine>,
}

pub trait PrinterDispatch: Send + Sync {
    fn dispatch(&self, ticket: &TicketPayload);
}

/// Default dispatcher: writes the ticket to the log
pub struct LogPrinter;

impl PrinterDispatch for LogPrinter {
    fn dispatch(&self, ticket: &TicketPayload) {
        tracing::info!(
            order_number = %ticket.order_number,
            station = %ticket.station,
            lines = ticket.lines.len(),
            table = ?ticket.table_number,
            "Ticket dispatched"
        );
    }
}

/// Group an order's items into per-station tickets.
///
/// `item_ids` restricts the ticket to newly added items; `None` takes
/// the whole order (creation). Voided items never print.
pub fn tickets_for(order: &OrderSnapshot, item_ids: Option<&[u64]>) -> Vec<TicketPayload> {
    let mut tickets: Vec<TicketPayload> = Vec::new();

    for item in &order.items {
        if !item.is_billable() {
            continue;
        }
        if let Some(ids) = item_ids
            && !ids.contains(&item.id)
        {
            continue;
        }

        let line = TicketLine {
            name: item.name.clone(),
            quantity: item.quantity,
        };
        match tickets.iter_mut().find(|t| t.station == item.station) {
            Some(ticket) => ticket.lines.push(line),
            None => tickets.push(TicketPayload {
                order_id: order.id,
                order_number: order.order_number.clone(),
                table_number: order.table_number.clone(),
                station: item.station,
                lines: vec![line],
            }),
        }
    }

    tickets
}
