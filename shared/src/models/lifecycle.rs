//! Record existence status
//!
//! Kept separate from workflow status: a deleted record is invisible
//! to normal queries regardless of where its workflow stood.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted,
}

impl Lifecycle {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }
}
