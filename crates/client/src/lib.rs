//! `labstock-client`
//!
//! **Responsibility:** Client side of the laboratory inventory view.
//!
//! This crate provides:
//! - A request gateway to the inventory backend (bearer auth, JSON bodies)
//! - Debounced search and pagination with stale-response fencing
//! - Item mutations that always refetch from the server afterwards
//! - Label printing through a local printer discovery service
//!
//! The backend remains the authority: nothing here patches displayed data
//! locally or persists anything.

pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod mutation;
pub mod print;
pub mod reference;
pub mod search;
pub mod view;

#[cfg(test)]
mod testing;

pub use api::InventoryApi;
pub use config::{ClientConfig, ConfigError};
pub use discovery::{BrowserPrintAdapter, DeviceDiscovery, DeviceError, Printer};
pub use error::ClientError;
pub use gateway::{ApiRequest, ApiResponse, HttpGateway, Method, ReqwestGateway};
pub use mutation::MutationCoordinator;
pub use print::{PrintFailure, PrintJob, PrintOutcome, PrintStage, PrintWorkflow};
pub use reference::{ReferenceData, ReferenceDataLoader};
pub use search::{Debouncer, FetchOutcome, SearchListController, SearchState};
pub use view::{InventoryView, Popup, ViewEvent, ViewState};
