//! User record snapshot

use serde::{Deserialize, Serialize};

use super::lifecycle::Lifecycle;

/// Staff record as stored and listed
///
/// Deletion is a lifecycle flip, never a row removal; order history
/// keeps referencing the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub lifecycle: Lifecycle,
    pub updated_at: i64,
}
