//! Totals calculator
//!
//! All money arithmetic goes through `rust_decimal`; `f64` only exists
//! at the storage/wire boundary. Derived fields are rounded half-up
//! (midpoint away from zero) exactly once each, and every
//! recomputation starts from the full item list. There is no
//! incremental "subtract the voided line" path, so drift cannot
//! accumulate.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use shared::models::SettingsSnapshot;
use shared::order::{OrderItem, OrderSnapshot};

use super::error::{OrderError, OrderResult};

/// Upper bound for a single item price
pub const MAX_PRICE: f64 = 100_000.0;
/// Upper bound for a single line quantity
pub const MAX_QUANTITY: u32 = 999;

/// Derived financial fields of an order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_amount: f64,
    pub total_amount: f64,
}

/// Convert an f64 amount to Decimal (lossless for money-scale values)
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to f64 for storage/wire
fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round to 2 decimal places, half-up
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute totals from the full item list
///
/// Voided items contribute nothing. Tax and service are derived from
/// the subtotal; the tip is additive and never taxed.
pub fn compute_totals(items: &[OrderItem], settings: &SettingsSnapshot, tip: f64) -> Totals {
    let subtotal: Decimal = items
        .iter()
        .filter(|i| i.is_billable())
        .map(|i| to_decimal(i.price_at_time) * Decimal::from(i.quantity))
        .sum();
    let subtotal = round2(subtotal);

    let tax = round2(subtotal * to_decimal(settings.tax_rate));
    let service = round2(subtotal * to_decimal(settings.service_rate));
    let tip = round2(to_decimal(tip));
    let total = subtotal + tax + service + tip;

    Totals {
        subtotal: to_f64(subtotal),
        tax_amount: to_f64(tax),
        service_amount: to_f64(service),
        total_amount: to_f64(total),
    }
}

/// Recompute and write the derived fields onto a snapshot
pub fn apply_totals(snapshot: &mut OrderSnapshot, settings: &SettingsSnapshot) {
    let totals = compute_totals(&snapshot.items, settings, snapshot.tip_amount);
    snapshot.subtotal = totals.subtotal;
    snapshot.tax_amount = totals.tax_amount;
    snapshot.service_amount = totals.service_amount;
    snapshot.total_amount = totals.total_amount;
}

/// Validate a menu price before it is snapshotted onto an item
pub fn validate_price(price: f64) -> OrderResult<()> {
    if !price.is_finite() {
        return Err(OrderError::Validation("Price must be a finite number".into()));
    }
    if price < 0.0 {
        return Err(OrderError::Validation("Price must not be negative".into()));
    }
    if price > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "Price exceeds maximum of {}",
            MAX_PRICE
        )));
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: u32) -> OrderResult<()> {
    if quantity == 0 {
        return Err(OrderError::Validation("Quantity must be at least 1".into()));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "Quantity exceeds maximum of {}",
            MAX_QUANTITY
        )));
    }
    Ok(())
}

/// Validate a tip amount supplied by a client
pub fn validate_tip(tip: f64) -> OrderResult<()> {
    if !tip.is_finite() {
        return Err(OrderError::Validation("Tip must be a finite number".into()));
    }
    if tip < 0.0 {
        return Err(OrderError::Validation("Tip must not be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{ItemStatus, Station};

    fn item(id: u64, price: f64, quantity: u32, status: ItemStatus) -> OrderItem {
        OrderItem {
            id,
            menu_item_id: id,
            name: format!("item-{}", id),
            station: Station::Kitchen,
            quantity,
            price_at_time: price,
            status,
        }
    }

    fn settings(tax: f64, service: f64) -> SettingsSnapshot {
        SettingsSnapshot {
            tax_rate: tax,
            service_rate: service,
            ..SettingsSnapshot::default()
        }
    }

    #[test]
    fn test_reference_totals() {
        // 2 x 10.00 + 1 x 5.00 = 25.00; 10% tax, 5% service
        let items = vec![
            item(1, 10.00, 2, ItemStatus::Pending),
            item(2, 5.00, 1, ItemStatus::Pending),
        ];
        let totals = compute_totals(&items, &settings(0.10, 0.05), 0.0);
        assert_eq!(totals.subtotal, 25.00);
        assert_eq!(totals.tax_amount, 2.50);
        assert_eq!(totals.service_amount, 1.25);
        assert_eq!(totals.total_amount, 28.75);
    }

    #[test]
    fn test_voided_items_excluded() {
        let items = vec![
            item(1, 10.00, 2, ItemStatus::Pending),
            item(2, 99.00, 1, ItemStatus::Voided),
        ];
        let totals = compute_totals(&items, &settings(0.10, 0.05), 0.0);
        assert_eq!(totals.subtotal, 20.00);
        assert_eq!(totals.tax_amount, 2.00);
        assert_eq!(totals.service_amount, 1.00);
        assert_eq!(totals.total_amount, 23.00);
    }

    #[test]
    fn test_half_up_rounding() {
        // 1.25 * 10% = 0.125 -> 0.13 half-up
        let items = vec![item(1, 1.25, 1, ItemStatus::Pending)];
        let totals = compute_totals(&items, &settings(0.10, 0.0), 0.0);
        assert_eq!(totals.tax_amount, 0.13);
        assert_eq!(totals.total_amount, 1.38);
    }

    #[test]
    fn test_tip_is_additive_and_untaxed() {
        let items = vec![item(1, 10.00, 1, ItemStatus::Pending)];
        let totals = compute_totals(&items, &settings(0.10, 0.05), 2.00);
        assert_eq!(totals.subtotal, 10.00);
        assert_eq!(totals.tax_amount, 1.00);
        assert_eq!(totals.service_amount, 0.50);
        assert_eq!(totals.total_amount, 13.50);
    }

    #[test]
    fn test_decimal_precision_on_awkward_prices() {
        // Classic float trap: 0.1 + 0.2
        let items = vec![
            item(1, 0.10, 1, ItemStatus::Pending),
            item(2, 0.20, 1, ItemStatus::Pending),
        ];
        let totals = compute_totals(&items, &settings(0.0, 0.0), 0.0);
        assert_eq!(totals.subtotal, 0.30);
        assert_eq!(totals.total_amount, 0.30);
    }

    #[test]
    fn test_full_recompute_matches_manual_sum() {
        // Random item lists: recomputation must equal a decimal sum
        // over billable lines regardless of order or voids.
        use rand::Rng;
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let n = rng.gen_range(1..10);
            let items: Vec<OrderItem> = (0..n)
                .map(|i| {
                    let cents: i64 = rng.gen_range(1..5000);
                    let status = if rng.gen_bool(0.2) {
                        ItemStatus::Voided
                    } else {
                        ItemStatus::Pending
                    };
                    item(i, cents as f64 / 100.0, rng.gen_range(1..5), status)
                })
                .collect();

            let expected: Decimal = items
                .iter()
                .filter(|i| i.status != ItemStatus::Voided)
                .map(|i| to_decimal(i.price_at_time) * Decimal::from(i.quantity))
                .sum();

            let totals = compute_totals(&items, &settings(0.0, 0.0), 0.0);
            assert_eq!(to_decimal(totals.subtotal), round2(expected));
        }
    }

    #[test]
    fn test_validation_bounds() {
        assert!(validate_price(9.99).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(MAX_PRICE + 1.0).is_err());

        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());

        assert!(validate_tip(0.0).is_ok());
        assert!(validate_tip(-1.0).is_err());
        assert!(validate_tip(f64::INFINITY).is_err());
    }
}
