//! Inventory domain records.
//!
//! Wire-shaped types for the remote inventory service: items and their
//! embedded reference data, search/page parameters, mutation drafts and label
//! printing payloads. Pure data and validation (no IO, no HTTP).

pub mod draft;
pub mod item;
pub mod label;
pub mod search;

pub use draft::{DetailsPatch, NewItemDraft, QuantityConsumption, ReferenceRef};
pub use item::{Category, InventoryItem, InventoryKind, Location, Unit};
pub use label::{DefaultPrinterId, LabelPayload, LabelRequest};
pub use search::{Page, PageRequest, PageResponse, SearchColumn, SearchQuery};
