//! Item mutations.
//!
//! Every write follows the same path: send it, and only once the backend has
//! accepted it close the popup and refetch the list with whatever search state
//! is current at that moment. The displayed page is never patched locally.
//! Deletes have no confirmation step; asking first is up to the caller.

use std::future::Future;
use std::sync::Arc;

use labstock_core::ItemId;
use labstock_inventory::{DetailsPatch, NewItemDraft, QuantityConsumption};

use crate::error::ClientError;
use crate::search::SearchListController;
use crate::view::ViewShared;

#[derive(Clone)]
pub struct MutationCoordinator {
    shared: Arc<ViewShared>,
    search: SearchListController,
}

impl MutationCoordinator {
    pub(crate) fn new(shared: Arc<ViewShared>, search: SearchListController) -> Self {
        Self { shared, search }
    }

    /// Create an item from the add form.
    pub async fn add_item(&self, draft: NewItemDraft) -> Result<(), ClientError> {
        let api = self.shared.api().clone();
        self.commit("add_item", true, async move {
            draft.validate()?;
            api.add_item(&draft).await
        })
        .await
    }

    /// Record `quantity_used` as consumed. The backend computes what remains.
    pub async fn update_quantity(&self, id: ItemId, quantity_used: f64) -> Result<(), ClientError> {
        let api = self.shared.api().clone();
        self.commit("update_quantity", true, async move {
            let consumption = QuantityConsumption::new(quantity_used)?;
            api.consume_quantity(id, consumption).await
        })
        .await
    }

    pub async fn update_details(&self, id: ItemId, patch: DetailsPatch) -> Result<(), ClientError> {
        let api = self.shared.api().clone();
        self.commit("update_details", true, async move {
            patch.validate()?;
            api.update_details(id, &patch).await
        })
        .await
    }

    /// Delete without confirmation; asking first is up to the caller.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), ClientError> {
        let api = self.shared.api().clone();
        self.commit("delete_item", false, async move {
            api.delete_item(id).await
        })
        .await
    }

    async fn commit<F>(
        &self,
        operation: &'static str,
        close_popup: bool,
        write: F,
    ) -> Result<(), ClientError>
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        let token = self.shared.token();

        if let Err(err) = write.await {
            self.shared.surface_error(token, operation, &err);
            return Err(err);
        }

        tracing::info!(operation, "mutation accepted");

        if !self.shared.is_live(token) {
            return Ok(());
        }
        if close_popup {
            self.shared.close_popup();
        }

        // A failed refetch is surfaced by the controller; the write itself stands.
        let _ = self.search.refresh().await;
        Ok(())
    }
}
