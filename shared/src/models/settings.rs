//! Restaurant settings snapshot

use serde::{Deserialize, Serialize};

/// Settings values the order core reads
///
/// Owned by the settings subsystem; the server caches a snapshot with
/// a short TTL, so rate edits apply to totals computed after the cache
/// refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Fraction, e.g. 0.10 for 10%
    pub tax_rate: f64,
    /// Fraction, e.g. 0.05 for 5%
    pub service_rate: f64,
    pub currency_symbol: String,
    /// Active orders older than this are delay-flagged
    pub order_delay_threshold_minutes: i64,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            tax_rate: 0.10,
            service_rate: 0.05,
            currency_symbol: "€".to_string(),
            order_delay_threshold_minutes: 15,
        }
    }
}
