//! Reference data (locations, categories, units) loaded once per activation.

use chrono::NaiveDate;

use labstock_inventory::{Category, InventoryKind, Location, NewItemDraft, Unit};

use crate::api::InventoryApi;
use crate::error::ClientError;

/// Selection lists for the item forms, in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub locations: Vec<Location>,
    pub categories: Vec<Category>,
    pub units: Vec<Unit>,
}

impl ReferenceData {
    /// Add-form defaults drawn from the first entry of each list.
    pub fn new_item_draft(&self, kind: InventoryKind, today: NaiveDate) -> NewItemDraft {
        NewItemDraft::with_defaults(kind, &self.locations, &self.categories, &self.units, today)
    }
}

/// Outcome of one activation load; each list succeeds or fails on its own.
#[derive(Debug)]
pub struct ReferenceLoad {
    pub locations: Result<Vec<Location>, ClientError>,
    pub categories: Result<Vec<Category>, ClientError>,
    pub units: Result<Vec<Unit>, ClientError>,
}

impl ReferenceLoad {
    /// Store the lists that loaded and return the failures.
    ///
    /// A list that failed keeps whatever `data` already held.
    pub fn apply_to(self, data: &mut ReferenceData) -> Vec<ClientError> {
        let mut errors = Vec::new();

        match self.locations {
            Ok(locations) => data.locations = locations,
            Err(e) => errors.push(e),
        }
        match self.categories {
            Ok(categories) => data.categories = categories,
            Err(e) => errors.push(e),
        }
        match self.units {
            Ok(units) => data.units = units,
            Err(e) => errors.push(e),
        }

        errors
    }
}

#[derive(Clone)]
pub struct ReferenceDataLoader {
    api: InventoryApi,
}

impl ReferenceDataLoader {
    pub fn new(api: InventoryApi) -> Self {
        Self { api }
    }

    /// Issue the three fetches concurrently. No retry.
    pub async fn load(&self) -> ReferenceLoad {
        let (locations, categories, units) = tokio::join!(
            self.api.locations(),
            self.api.categories(),
            self.api.units()
        );

        tracing::debug!(
            locations_ok = locations.is_ok(),
            categories_ok = categories.is_ok(),
            units_ok = units.is_ok(),
            "reference data loaded"
        );

        ReferenceLoad {
            locations,
            categories,
            units,
        }
    }
}
