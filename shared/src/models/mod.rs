//! Collaborator snapshots
//!
//! Read-only views of data owned by other subsystems: menu catalog,
//! restaurant settings, user records.

mod lifecycle;
mod menu_item;
mod settings;
mod user;

pub use lifecycle::Lifecycle;
pub use menu_item::MenuItemInfo;
pub use settings::SettingsSnapshot;
pub use user::UserRecord;
