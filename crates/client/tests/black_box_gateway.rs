use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use labstock_client::{
    ApiRequest, ClientConfig, ClientError, HttpGateway, InventoryApi, InventoryView, ReqwestGateway,
};
use labstock_core::ItemId;
use labstock_inventory::{InventoryKind, SearchColumn};

const ZPL: &str = "^XA^FO20,20^FDS-1^FS^XZ";

/// In-memory stand-in for the inventory backend plus the Browser Print service.
#[derive(Default)]
struct Backend {
    items: Mutex<Vec<Value>>,
    auth: Mutex<Vec<Option<String>>>,
    queries: Mutex<Vec<HashMap<String, String>>>,
    writes: Mutex<Vec<Value>>,
}

fn item(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "inventoryItemId": format!("S-{id}"),
        "name": name,
        "location": { "id": 1, "name": "Cabinet A" },
        "category": { "id": 2, "name": "General" },
        "status": "ACTIVE",
        "currentQuantityAmount": 10.0,
        "quantityUnit": "g"
    })
}

async fn list(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.auth.lock().unwrap().push(auth);

    let term = query.get("searchValue").cloned().unwrap_or_default();
    backend.queries.lock().unwrap().push(query);

    let content: Vec<Value> = backend
        .items
        .lock()
        .unwrap()
        .iter()
        .filter(|i| i["name"].as_str().unwrap_or_default().contains(&term))
        .cloned()
        .collect();
    let total = content.len();
    Json(json!({ "content": content, "totalElements": total, "totalPages": 1 }))
}

async fn remove(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    let mut items = backend.items.lock().unwrap();
    let before = items.len();
    items.retain(|i| i["id"] != json!(id));
    if items.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("Item {id} not found") })),
        );
    }
    (StatusCode::OK, Json(Value::Null))
}

async fn write(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> StatusCode {
    backend.writes.lock().unwrap().push(body);
    StatusCode::OK
}

fn app(backend: Arc<Backend>) -> Router {
    Router::new()
        .route(
            "/api/system/location",
            get(|| async { Json(json!([{ "id": 1, "name": "Cabinet A" }])) }),
        )
        .route(
            "/api/system/category",
            get(|| async { Json(json!([{ "id": 2, "name": "General" }])) }),
        )
        .route(
            "/api/system/unit/solid",
            get(|| async { Json(json!([{ "quantityUnit": "g", "quantityUnitCode": "G" }])) }),
        )
        .route("/api/inventory/solid/pageable", get(list))
        .route("/api/inventory/solid/:id", delete(remove))
        .route(
            "/api/system/print/item",
            post(|| async { Json(json!({ "zplString": ZPL })) }),
        )
        .route(
            "/api/system/print/default-printer",
            get(|| async { Json(json!({ "defaultPrinterUid": "ZD500" })) }),
        )
        .route(
            "/available",
            get(|| async {
                Json(json!({
                    "printer": [
                        { "uid": "GK420", "connection": "usb:002" },
                        { "uid": "ZD500", "connection": "usb:001", "name": "Lab bench" }
                    ]
                }))
            }),
        )
        .route("/write", post(write))
        .with_state(backend)
}

struct TestServer {
    base_url: String,
    backend: Arc<Backend>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(items: Vec<Value>) -> Self {
        let backend = Arc::new(Backend::default());
        *backend.items.lock().unwrap() = items;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let router = app(backend.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            backend,
            handle,
        }
    }

    fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url(),
            auth_token: Some("jwt-token".to_string()),
            print_service_url: self.base_url.clone(),
            ..ClientConfig::default()
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn gateway_sends_bearer_token_and_query() {
    let server = TestServer::spawn(vec![item(1, "Acetone")]).await;
    let gateway = ReqwestGateway::with_token(server.api_url(), "jwt-token");

    let response = gateway
        .execute(ApiRequest::get("/inventory/solid/pageable").with_query(vec![
            ("searchColumn".to_string(), "Name".to_string()),
            ("searchValue".to_string(), "Acet".to_string()),
            ("page".to_string(), "0".to_string()),
            ("size".to_string(), "10".to_string()),
        ]))
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.body["content"][0]["name"], "Acetone");
    assert_eq!(
        server.backend.auth.lock().unwrap()[0].as_deref(),
        Some("Bearer jwt-token")
    );
    let queries = server.backend.queries.lock().unwrap();
    assert_eq!(queries[0].get("searchColumn").map(String::as_str), Some("Name"));
}

#[tokio::test]
async fn error_status_carries_server_message() {
    let server = TestServer::spawn(Vec::new()).await;
    let api = InventoryApi::new(
        Arc::new(ReqwestGateway::new(server.api_url())),
        InventoryKind::Solid,
    );

    let err = api.delete_item(ItemId::new(99)).await.unwrap_err();

    assert_eq!(
        err,
        ClientError::Api {
            status: 404,
            message: "Item 99 not found".to_string()
        }
    );
    assert_eq!(err.user_message(), "Error: 404 - Item 99 not found");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = ReqwestGateway::new(format!("http://{addr}/api"));
    let err = gateway
        .execute(ApiRequest::get("/system/location"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn view_lists_deletes_and_prints_against_live_services() {
    let server = TestServer::spawn(vec![item(1, "Acetone"), item(2, "Ethanol")]).await;
    let view = InventoryView::from_config(&server.config());

    view.activate().await;
    assert_eq!(view.page().items.len(), 2);
    assert_eq!(view.page().total_elements, Some(2));
    assert_eq!(view.reference_data().units[0].quantity_unit, "g");

    view.mutations().delete_item(ItemId::new(2)).await.unwrap();
    assert!(!view.page().contains(ItemId::new(2)));

    let acetone = view.page().items[0].clone();
    let job = view.print_label(&acetone).await;

    assert_eq!(view.notice().as_deref(), Some("Print job sent successfully"));
    assert_eq!(job.printer.unwrap().uid, "ZD500");
    let writes = server.backend.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["device"]["uid"], "ZD500");
    assert_eq!(writes[0]["data"], ZPL);
}

#[tokio::test]
async fn debounced_search_reaches_backend_once() {
    let server = TestServer::spawn(vec![item(1, "Acetone"), item(2, "Ethanol")]).await;
    let config = ClientConfig {
        debounce_ms: 50,
        ..server.config()
    };
    let view = InventoryView::from_config(&config);
    view.activate().await;

    view.search().set_search_column(SearchColumn::Name);
    view.search().set_search_term("Eth");
    for _ in 0..100 {
        if view.page().items.len() == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(view.page().items[0].name, "Ethanol");
    let queries = server.backend.queries.lock().unwrap();
    // Activation fetch plus exactly one debounced search.
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].get("searchValue").map(String::as_str), Some("Eth"));
}
