//! Request bodies for the item mutations.
//!
//! Drafts validate what the client can check locally (required text, finite
//! non-negative amounts). Everything else, including the remaining quantity
//! after consumption, is decided by the backend.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use labstock_core::{CategoryId, DomainError, DomainResult, LocationId};

use crate::item::{Category, InventoryItem, InventoryKind, Location, Unit};

/// Months between import and the default expiration date of a new item.
pub const DEFAULT_SHELF_LIFE_MONTHS: u32 = 4;

/// `{ "id": ... }` reference to an existing record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRef<I> {
    pub id: I,
}

/// Body of `POST /inventory/{kind}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub import_date: NaiveDate,
    pub location: ReferenceRef<LocationId>,
    pub category: ReferenceRef<CategoryId>,
    pub expiration_date: NaiveDate,
    pub cas_number: String,
    pub original_quantity_amount: f64,
    pub quantity_unit: String,
}

impl NewItemDraft {
    /// Blank form prefilled the way the add dialog opens: imported today,
    /// expiring after [`DEFAULT_SHELF_LIFE_MONTHS`], first location, category
    /// and unit selected when the reference lists are non-empty.
    pub fn with_defaults(
        kind: InventoryKind,
        locations: &[Location],
        categories: &[Category],
        units: &[Unit],
        today: NaiveDate,
    ) -> Self {
        let expiration_date = today
            .checked_add_months(Months::new(DEFAULT_SHELF_LIFE_MONTHS))
            .unwrap_or(today);

        Self {
            name: String::new(),
            item_type: kind.type_code().to_string(),
            import_date: today,
            location: ReferenceRef {
                id: locations.first().map(|l| l.id).unwrap_or_default(),
            },
            category: ReferenceRef {
                id: categories.first().map(|c| c.id).unwrap_or_default(),
            },
            expiration_date,
            cas_number: String::new(),
            original_quantity_amount: 0.0,
            quantity_unit: units
                .first()
                .map(|u| u.quantity_unit.clone())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        ensure_amount("original quantity", self.original_quantity_amount)?;
        if self.expiration_date < self.import_date {
            return Err(DomainError::validation(
                "expiration date cannot precede import date",
            ));
        }
        Ok(())
    }
}

/// Body of `PATCH /inventory/{kind}/{id}/quantity`: the amount consumed.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityConsumption {
    quantity_used: f64,
}

impl QuantityConsumption {
    pub fn new(quantity_used: f64) -> DomainResult<Self> {
        ensure_amount("quantity used", quantity_used)?;
        Ok(Self { quantity_used })
    }

    pub fn quantity_used(&self) -> f64 {
        self.quantity_used
    }
}

/// Body of `PATCH /inventory/{kind}/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsPatch {
    pub name: String,
    pub cas_number: String,
    pub category_id: CategoryId,
    pub location_id: LocationId,
}

impl DetailsPatch {
    /// Patch prefilled with the item's current values.
    pub fn from_item(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            cas_number: item.cas_number.clone().unwrap_or_default(),
            category_id: item.category.id,
            location_id: item.location.id,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(())
    }
}

fn ensure_amount(field: &str, amount: f64) -> DomainResult<()> {
    if !amount.is_finite() {
        return Err(DomainError::validation(format!("{field} must be a number")));
    }
    if amount < 0.0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}
