//! Menu catalog collaborator
//!
//! The order core only ever asks one question: what are the name,
//! price and station of menu item X right now. Catalog CRUD belongs to
//! another subsystem; here the seam is a trait plus an in-process
//! implementation fed from a JSON file (or the built-in demo menu).

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use shared::models::MenuItemInfo;
use shared::order::Station;

#[async_trait]
pub trait MenuCatalog: Send + Sync {
    async fn get_menu_item(&self, id: u64) -> Option<MenuItemInfo>;
}

/// In-memory catalog with a fixed item set
pub struct StaticCatalog {
    items: HashMap<u64, MenuItemInfo>,
}

impl StaticCatalog {
    pub fn from_items(items: impl IntoIterator<Item = MenuItemInfo>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    /// Load `menu.json` (a JSON array of menu items) from the work dir
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let items: Vec<MenuItemInfo> = serde_json::from_str(&raw)?;
        Ok(Self::from_items(items))
    }

    /// Small built-in menu for development and demos
    pub fn demo() -> Self {
        Self::from_items([
            MenuItemInfo {
                id: 1,
                name: "Margherita".into(),
                price: 9.50,
                station: Station::Kitchen,
            },
            MenuItemInfo {
                id: 2,
                name: "Carbonara".into(),
                price: 11.00,
                station: Station::Kitchen,
            },
            MenuItemInfo {
                id: 3,
                name: "Tiramisu".into(),
                price: 5.50,
                station: Station::Kitchen,
            },
            MenuItemInfo {
                id: 4,
                name: "Espresso".into(),
                price: 1.50,
                station: Station::Bar,
            },
            MenuItemInfo {
                id: 5,
                name: "House Red".into(),
                price: 4.00,
                station: Station::Bar,
            },
        ])
    }

    /// File-backed catalog with demo fallback
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_json_file(&path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %path.as_ref().display(),
                    items = catalog.items.len(),
                    "Loaded menu catalog"
                );
                catalog
            }
            Err(e) => {
                tracing::info!(
                    path = %path.as_ref().display(),
                    "No menu file ({}), using demo catalog",
                    e
                );
                Self::demo()
            }
        }
    }
}

#[async_trait]
impl MenuCatalog for StaticCatalog {
    async fn get_menu_item(&self, id: u64) -> Option<MenuItemInfo> {
        self.items.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup() {
        let catalog = StaticCatalog::demo();
        let item = catalog.get_menu_item(4).await.unwrap();
        assert_eq!(item.name, "Espresso");
        assert_eq!(item.station, Station::Bar);
        assert!(catalog.get_menu_item(999).await.is_none());
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(
            &path,
            r#"[{"id":7,"name":"Flat White","price":2.8,"station":"bar"}]"#,
        )
        .unwrap();

        let catalog = StaticCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.get_menu_item(7).await.unwrap().price, 2.8);
    }
}
