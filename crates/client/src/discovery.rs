//! Local printer discovery.
//!
//! Printer SDKs report results through success/failure callback pairs. The
//! [`DeviceDiscovery`] trait keeps that shape; [`enumerate`] and [`send`] turn
//! each call into a future that resolves exactly once, whichever callback
//! fires first (later calls are ignored, and dropping both callbacks resolves
//! to [`DeviceError::CallbackDropped`]).

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::oneshot;

use labstock_inventory::{DefaultPrinterId, LabelPayload};

/// A device reported by the discovery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Printer {
    pub uid: String,
    pub connection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
}

impl Printer {
    pub fn new(uid: impl Into<String>, connection: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            connection: connection.into(),
            name: None,
            device_type: None,
            provider: None,
            manufacturer: None,
        }
    }

    /// True when either the uid or the connection string equals `id`.
    pub fn matches(&self, id: &DefaultPrinterId) -> bool {
        self.uid == id.as_str() || self.connection == id.as_str()
    }
}

/// First printer matching the configured default, in enumeration order.
pub fn find_printer<'a>(printers: &'a [Printer], id: &DefaultPrinterId) -> Option<&'a Printer> {
    printers.iter().find(|p| p.matches(id))
}

/// Device class filter passed to enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    Printer,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Printer => "printer",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The discovery service could not be reached or is not installed.
    #[error("device service unavailable: {0}")]
    Unavailable(String),
    /// The service or the device refused the request.
    #[error("device rejected request: {0}")]
    Rejected(String),
    #[error("device adapter dropped its callbacks without answering")]
    CallbackDropped,
}

pub type OnDevices = Box<dyn FnOnce(Vec<Printer>) + Send>;
pub type OnSent = Box<dyn FnOnce() + Send>;
pub type OnError = Box<dyn FnOnce(DeviceError) + Send>;

/// Callback-based printer SDK surface.
///
/// Implementations may invoke the callbacks synchronously or from another
/// task. Exactly one of the two should be called.
pub trait DeviceDiscovery: Send + Sync {
    fn get_local_devices(&self, kind: DeviceKind, on_success: OnDevices, on_error: OnError);

    fn send(&self, printer: &Printer, data: String, on_success: OnSent, on_error: OnError);
}

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, DeviceError>>>>>;

fn settle<T>(slot: &Slot<T>, outcome: Result<T, DeviceError>) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(tx) = sender {
        let _ = tx.send(outcome);
    }
}

/// Callback pair sharing one single-use sender.
fn callback_pair<T: Send + 'static>() -> (
    Box<dyn FnOnce(T) + Send>,
    OnError,
    oneshot::Receiver<Result<T, DeviceError>>,
) {
    let (tx, rx) = oneshot::channel();
    let slot: Slot<T> = Arc::new(Mutex::new(Some(tx)));
    let ok_slot = Arc::clone(&slot);

    let on_ok: Box<dyn FnOnce(T) + Send> = Box::new(move |value| settle(&ok_slot, Ok(value)));
    let on_err: OnError = Box::new(move |err| settle(&slot, Err(err)));

    (on_ok, on_err, rx)
}

/// Enumerate devices of `kind`.
pub async fn enumerate(
    adapter: &dyn DeviceDiscovery,
    kind: DeviceKind,
) -> Result<Vec<Printer>, DeviceError> {
    let (on_ok, on_err, rx) = callback_pair::<Vec<Printer>>();
    adapter.get_local_devices(kind, on_ok, on_err);
    rx.await.unwrap_or(Err(DeviceError::CallbackDropped))
}

/// Push a label to `printer`.
pub async fn send(
    adapter: &dyn DeviceDiscovery,
    printer: &Printer,
    payload: &LabelPayload,
) -> Result<(), DeviceError> {
    let (on_ok, on_err, rx) = callback_pair::<()>();
    let on_sent: OnSent = Box::new(move || on_ok(()));
    adapter.send(printer, payload.as_str().to_string(), on_sent, on_err);
    rx.await.unwrap_or(Err(DeviceError::CallbackDropped))
}

/// Adapter for the local Browser Print service.
///
/// `GET {base}/available` lists devices grouped by type; `POST {base}/write`
/// with `{device, data}` prints. Requests run on the ambient tokio runtime and
/// answer through the callbacks.
#[derive(Debug, Clone)]
pub struct BrowserPrintAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl BrowserPrintAdapter {
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:9100";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn available(&self, kind: DeviceKind) -> Result<Vec<Printer>, DeviceError> {
        let url = format!("{}/available", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DeviceError::Rejected(format!("{} from {url}", resp.status())));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| DeviceError::Rejected(e.to_string()))?;

        devices_of_kind(&body, kind)
    }

    async fn write(&self, printer: &Printer, data: String) -> Result<(), DeviceError> {
        let url = format!("{}/write", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "device": printer, "data": data }))
            .send()
            .await
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DeviceError::Rejected(format!("{status}: {text}")));
        }
        Ok(())
    }
}

/// The service answers `{"printer": [...]}`, or a single object when only
/// one device of that type is attached.
fn devices_of_kind(body: &Value, kind: DeviceKind) -> Result<Vec<Printer>, DeviceError> {
    let decode = |v: Value| {
        serde_json::from_value::<Printer>(v).map_err(|e| DeviceError::Rejected(e.to_string()))
    };

    match body.get(kind.as_str()) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().cloned().map(decode).collect(),
        Some(single) => Ok(vec![decode(single.clone())?]),
    }
}

impl DeviceDiscovery for BrowserPrintAdapter {
    fn get_local_devices(&self, kind: DeviceKind, on_success: OnDevices, on_error: OnError) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            on_error(DeviceError::Unavailable("no async runtime".to_string()));
            return;
        };

        let adapter = self.clone();
        handle.spawn(async move {
            match adapter.available(kind).await {
                Ok(printers) => on_success(printers),
                Err(err) => on_error(err),
            }
        });
    }

    fn send(&self, printer: &Printer, data: String, on_success: OnSent, on_error: OnError) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            on_error(DeviceError::Unavailable("no async runtime".to_string()));
            return;
        };

        let adapter = self.clone();
        let printer = printer.clone();
        handle.spawn(async move {
            match adapter.write(&printer, data).await {
                Ok(()) => on_success(),
                Err(err) => on_error(err),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Immediate(Result<Vec<Printer>, DeviceError>);

    impl DeviceDiscovery for Immediate {
        fn get_local_devices(&self, _kind: DeviceKind, on_success: OnDevices, on_error: OnError) {
            match self.0.clone() {
                Ok(printers) => on_success(printers),
                Err(err) => on_error(err),
            }
        }

        fn send(&self, _printer: &Printer, _data: String, on_success: OnSent, on_error: OnError) {
            // Both callbacks fire; only the first may count.
            on_success();
            on_error(DeviceError::Rejected("late".to_string()));
        }
    }

    struct Silent;

    impl DeviceDiscovery for Silent {
        fn get_local_devices(&self, _kind: DeviceKind, _ok: OnDevices, _err: OnError) {}

        fn send(&self, _printer: &Printer, _data: String, _ok: OnSent, _err: OnError) {}
    }

    #[tokio::test]
    async fn enumerate_resolves_with_success_callback() {
        let adapter = Immediate(Ok(vec![Printer::new("ZD500", "usb:001")]));
        let printers = enumerate(&adapter, DeviceKind::Printer).await.unwrap();
        assert_eq!(printers, vec![Printer::new("ZD500", "usb:001")]);
    }

    #[tokio::test]
    async fn enumerate_resolves_with_error_callback() {
        let adapter = Immediate(Err(DeviceError::Unavailable("not installed".to_string())));
        let err = enumerate(&adapter, DeviceKind::Printer).await.unwrap_err();
        assert_eq!(err, DeviceError::Unavailable("not installed".to_string()));
    }

    #[tokio::test]
    async fn send_keeps_first_resolution_only() {
        let adapter = Immediate(Ok(Vec::new()));
        let printer = Printer::new("ZD500", "usb:001");
        let result = send(&adapter, &printer, &LabelPayload::new("^XA^XZ")).await;
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn dropped_callbacks_resolve_as_error() {
        let err = enumerate(&Silent, DeviceKind::Printer).await.unwrap_err();
        assert_eq!(err, DeviceError::CallbackDropped);
    }

    #[test]
    fn match_by_uid_or_connection_first_wins() {
        let printers = vec![
            Printer::new("A1", "network:10.0.0.5"),
            Printer::new("B2", "usb:ZD500"),
            Printer::new("ZD500", "usb:002"),
        ];

        let by_connection = find_printer(&printers, &DefaultPrinterId::new("usb:ZD500")).unwrap();
        assert_eq!(by_connection.uid, "B2");

        let by_uid = find_printer(&printers, &DefaultPrinterId::new("ZD500")).unwrap();
        assert_eq!(by_uid.uid, "ZD500");

        assert!(find_printer(&printers, &DefaultPrinterId::new("missing")).is_none());
    }

    #[test]
    fn devices_of_kind_accepts_list_or_single_object() {
        let list = json!({ "printer": [
            { "uid": "ZD500", "connection": "usb", "deviceType": "printer", "name": "Lab" }
        ]});
        let printers = devices_of_kind(&list, DeviceKind::Printer).unwrap();
        assert_eq!(printers[0].name.as_deref(), Some("Lab"));

        let single = json!({ "printer": { "uid": "X", "connection": "network" } });
        assert_eq!(devices_of_kind(&single, DeviceKind::Printer).unwrap().len(), 1);

        assert!(devices_of_kind(&json!({}), DeviceKind::Printer).unwrap().is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the matched printer is always the first one in enumeration order.
            #[test]
            fn first_match_wins(
                uids in proptest::collection::vec("[A-C]{1,2}", 1..12),
                target in "[A-C]{1,2}"
            ) {
                let printers: Vec<Printer> = uids
                    .iter()
                    .enumerate()
                    .map(|(i, uid)| Printer::new(uid.clone(), format!("usb:{i}")))
                    .collect();

                let id = DefaultPrinterId::new(target.clone());
                let expected = printers.iter().position(|p| p.uid == target);
                let found = find_printer(&printers, &id)
                    .map(|p| printers.iter().position(|q| std::ptr::eq(p, q)).unwrap());

                prop_assert_eq!(found, expected);
            }
        }
    }
}
