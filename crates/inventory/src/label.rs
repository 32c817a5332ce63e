//! Label printing payloads.

use serde::{Deserialize, Serialize};

use labstock_core::ItemId;

use crate::item::InventoryItem;

/// Body of `POST /system/print/item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub item_id: ItemId,
    pub inventory_item_id: String,
    pub name: String,
    /// Display name of the item's location.
    pub location: String,
}

impl LabelRequest {
    pub fn for_item(item: &InventoryItem) -> Self {
        Self {
            item_id: item.id,
            inventory_item_id: item.inventory_item_id.clone(),
            name: item.name.clone(),
            location: item.location.name.clone(),
        }
    }
}

/// Backend-generated label (ZPL). Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPayload {
    #[serde(rename = "zplString")]
    zpl: String,
}

impl LabelPayload {
    pub fn new(zpl: impl Into<String>) -> Self {
        Self { zpl: zpl.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.zpl
    }

    pub fn into_string(self) -> String {
        self.zpl
    }
}

/// Operator-configured printer, matched against discovered devices by uid or
/// connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPrinterId {
    #[serde(rename = "defaultPrinterUid")]
    uid: String,
}

impl DefaultPrinterId {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.uid
    }
}

impl core::fmt::Display for DefaultPrinterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.uid)
    }
}
