use serde::{Deserialize, Serialize};

use labstock_core::{CategoryId, ItemId, LocationId};

/// Item family served by the backend.
///
/// Used as the `{kind}` path segment (`/inventory/solid/...`) and, upper-cased,
/// as the `type` field of a new-item draft.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryKind {
    #[default]
    Solid,
}

impl InventoryKind {
    /// Path segment form (`solid`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            InventoryKind::Solid => "solid",
        }
    }

    /// Draft `type` form (`SOLID`).
    pub fn type_code(&self) -> &'static str {
        match self {
            InventoryKind::Solid => "SOLID",
        }
    }

    /// Navigation target of the "view details" action for an item.
    pub fn detail_route(&self, id: ItemId) -> String {
        format!("/inventory/{}/{}", self.path_segment(), id)
    }
}

impl core::fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl core::str::FromStr for InventoryKind {
    type Err = labstock_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(InventoryKind::Solid),
            other => Err(labstock_core::DomainError::validation(format!(
                "unknown inventory kind '{other}'"
            ))),
        }
    }
}

/// Storage location (reference data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    #[serde(default)]
    pub location_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Chemical category (reference data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub category_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Quantity unit offered for an item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub quantity_unit: String,
    pub quantity_unit_code: String,
}

/// Inventory record as listed by the pageable endpoint.
///
/// `current_quantity_amount` is owned by the server: consumption is sent as a
/// delta and the remaining amount is only ever read back from a refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub inventory_item_id: String,
    pub name: String,
    pub location: Location,
    pub category: Category,
    pub status: String,
    pub current_quantity_amount: f64,
    pub quantity_unit: String,
    #[serde(default)]
    pub cas_number: Option<String>,
}
