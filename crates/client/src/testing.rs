//! In-memory gateway and discovery doubles for tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::discovery::{DeviceDiscovery, DeviceError, DeviceKind, OnDevices, OnError, OnSent, Printer};
use crate::error::ClientError;
use crate::gateway::{ApiRequest, ApiResponse, HttpGateway, Method};

/// Scripted answer of one route.
pub(crate) struct Reply {
    delay: Duration,
    result: Result<ApiResponse, ClientError>,
}

impl Reply {
    pub(crate) fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(ApiResponse::new(status, body)),
        }
    }

    pub(crate) fn network(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(ClientError::Network(message.to_string())),
        }
    }

    /// Resolve only after `delay` (virtual time under a paused clock).
    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Arc<dyn Fn(&ApiRequest) -> Reply + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    responder: Responder,
}

/// Gateway answering from registered routes and recording every request.
///
/// The most recently registered route for a (method, path) wins; unmatched
/// requests get a 404.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on<F>(&self, method: Method, path: &str, responder: F)
    where
        F: Fn(&ApiRequest) -> Reply + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Route {
                method,
                path: path.to_string(),
                responder: Arc::new(responder),
            });
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

#[async_trait]
impl HttpGateway for ScriptedGateway {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let responder = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|r| r.method == request.method && r.path == request.path)
            .map(|r| Arc::clone(&r.responder));

        let reply = match responder {
            Some(responder) => responder(&request),
            None => Reply::status(404, json!({ "message": "no route" })),
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

/// Discovery double answering synchronously and recording sends.
pub(crate) struct ScriptedDiscovery {
    printers: Result<Vec<Printer>, DeviceError>,
    send_result: Result<(), DeviceError>,
    sends: Mutex<Vec<(Printer, String)>>,
}

impl ScriptedDiscovery {
    pub(crate) fn with_printers(printers: Vec<Printer>) -> Self {
        Self {
            printers: Ok(printers),
            send_result: Ok(()),
            sends: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_enumeration(err: DeviceError) -> Self {
        Self {
            printers: Err(err),
            ..Self::with_printers(Vec::new())
        }
    }

    pub(crate) fn failing_send(mut self, err: DeviceError) -> Self {
        self.send_result = Err(err);
        self
    }

    pub(crate) fn sends(&self) -> Vec<(Printer, String)> {
        self.sends.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DeviceDiscovery for ScriptedDiscovery {
    fn get_local_devices(&self, _kind: DeviceKind, on_success: OnDevices, on_error: OnError) {
        match self.printers.clone() {
            Ok(printers) => on_success(printers),
            Err(err) => on_error(err),
        }
    }

    fn send(&self, printer: &Printer, data: String, on_success: OnSent, on_error: OnError) {
        self.sends
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((printer.clone(), data));

        match self.send_result.clone() {
            Ok(()) => on_success(),
            Err(err) => on_error(err),
        }
    }
}

/// Backend-shaped item JSON.
pub(crate) fn item_json(id: i64, code: &str, name: &str, quantity: f64) -> Value {
    json!({
        "id": id,
        "inventoryItemId": code,
        "name": name,
        "location": { "id": 1, "locationId": null, "name": "Cabinet A", "description": "", "createTime": "2024-01-01T00:00:00" },
        "category": { "id": 2, "categoryId": "GEN", "name": "General", "description": "", "createTime": "2024-01-01T00:00:00" },
        "status": "ACTIVE",
        "currentQuantityAmount": quantity,
        "quantityUnit": "g",
        "casNumber": null
    })
}

pub(crate) fn page_json(items: Vec<Value>) -> Value {
    json!({ "content": items })
}
