//! Typed endpoints of the inventory service.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use labstock_core::ItemId;
use labstock_inventory::{
    Category, DefaultPrinterId, DetailsPatch, InventoryKind, LabelPayload, LabelRequest, Location,
    NewItemDraft, PageRequest, PageResponse, QuantityConsumption, Unit,
};

use crate::error::ClientError;
use crate::gateway::{ApiRequest, HttpGateway};

/// Endpoint wrapper over an [`HttpGateway`] for one inventory kind.
#[derive(Clone)]
pub struct InventoryApi {
    gateway: Arc<dyn HttpGateway>,
    kind: InventoryKind,
}

impl InventoryApi {
    pub fn new(gateway: Arc<dyn HttpGateway>, kind: InventoryKind) -> Self {
        Self { gateway, kind }
    }

    pub fn kind(&self) -> InventoryKind {
        self.kind
    }

    /// `GET /inventory/{kind}/pageable`
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, ClientError> {
        let req = ApiRequest::get(format!("/inventory/{}/pageable", self.kind))
            .with_query(request.query_params());
        self.call(req).await
    }

    /// `GET /system/location`
    pub async fn locations(&self) -> Result<Vec<Location>, ClientError> {
        self.call(ApiRequest::get("/system/location")).await
    }

    /// `GET /system/category`
    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.call(ApiRequest::get("/system/category")).await
    }

    /// `GET /system/unit/{kind}`
    pub async fn units(&self) -> Result<Vec<Unit>, ClientError> {
        self.call(ApiRequest::get(format!("/system/unit/{}", self.kind)))
            .await
    }

    /// `POST /inventory/{kind}`
    pub async fn add_item(&self, draft: &NewItemDraft) -> Result<(), ClientError> {
        let req = ApiRequest::post(format!("/inventory/{}", self.kind), to_body(draft)?);
        self.send(req).await.map(drop)
    }

    /// `PATCH /inventory/{kind}/{id}/quantity`
    pub async fn consume_quantity(
        &self,
        id: ItemId,
        consumption: QuantityConsumption,
    ) -> Result<(), ClientError> {
        let req = ApiRequest::patch(
            format!("/inventory/{}/{}/quantity", self.kind, id),
            to_body(&consumption)?,
        );
        self.send(req).await.map(drop)
    }

    /// `PATCH /inventory/{kind}/{id}`
    pub async fn update_details(&self, id: ItemId, patch: &DetailsPatch) -> Result<(), ClientError> {
        let req = ApiRequest::patch(format!("/inventory/{}/{}", self.kind, id), to_body(patch)?);
        self.send(req).await.map(drop)
    }

    /// `DELETE /inventory/{kind}/{id}`
    pub async fn delete_item(&self, id: ItemId) -> Result<(), ClientError> {
        let req = ApiRequest::delete(format!("/inventory/{}/{}", self.kind, id));
        self.send(req).await.map(drop)
    }

    /// `POST /system/print/item`
    pub async fn generate_label(&self, request: &LabelRequest) -> Result<LabelPayload, ClientError> {
        self.call(ApiRequest::post("/system/print/item", to_body(request)?))
            .await
    }

    /// `GET /system/print/default-printer`
    pub async fn default_printer(&self) -> Result<DefaultPrinterId, ClientError> {
        self.call(ApiRequest::get("/system/print/default-printer"))
            .await
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        self.gateway.execute(request).await?.into_result()
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let body = self.send(request).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Parse(e.to_string()))
}
