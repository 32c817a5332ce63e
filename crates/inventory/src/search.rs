//! Search and pagination parameters for the pageable list endpoint.

use serde::{Deserialize, Serialize};

use labstock_core::DomainError;

use crate::item::InventoryItem;

/// Column a search term is matched against.
///
/// The backend receives the visible column label verbatim as `searchColumn`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchColumn {
    #[default]
    #[serde(rename = "Inventory Item")]
    InventoryItem,
    #[serde(rename = "Name")]
    Name,
    #[serde(rename = "Location Name")]
    LocationName,
    #[serde(rename = "Category Name")]
    CategoryName,
    #[serde(rename = "Status")]
    Status,
    #[serde(rename = "Current Quantity")]
    CurrentQuantity,
    #[serde(rename = "Unit")]
    Unit,
}

impl SearchColumn {
    /// All visible columns, in display order.
    pub const ALL: [SearchColumn; 7] = [
        SearchColumn::InventoryItem,
        SearchColumn::Name,
        SearchColumn::LocationName,
        SearchColumn::CategoryName,
        SearchColumn::Status,
        SearchColumn::CurrentQuantity,
        SearchColumn::Unit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchColumn::InventoryItem => "Inventory Item",
            SearchColumn::Name => "Name",
            SearchColumn::LocationName => "Location Name",
            SearchColumn::CategoryName => "Category Name",
            SearchColumn::Status => "Status",
            SearchColumn::CurrentQuantity => "Current Quantity",
            SearchColumn::Unit => "Unit",
        }
    }
}

impl core::fmt::Display for SearchColumn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for SearchColumn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchColumn::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown search column '{s}'")))
    }
}

/// The (column, term) pair a search is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub column: SearchColumn,
    pub term: String,
}

impl SearchQuery {
    pub fn new(column: SearchColumn, term: impl Into<String>) -> Self {
        Self {
            column,
            term: term.into(),
        }
    }
}

/// One list request: a query plus the page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: SearchQuery,
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;

    /// First page of `query` with the default page size.
    pub fn first(query: SearchQuery) -> Self {
        Self {
            query,
            page: 0,
            size: Self::DEFAULT_SIZE,
        }
    }

    /// Query-string parameters, in the order the backend documents them.
    pub fn query_params(&self) -> Vec<(String, String)> {
        vec![
            ("searchColumn".to_string(), self.query.column.label().to_string()),
            ("searchValue".to_string(), self.query.term.clone()),
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

/// Body of the pageable endpoint. Only `content` is required; the totals are
/// read when the backend includes them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub content: Vec<InventoryItem>,
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// The page currently displayed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub items: Vec<InventoryItem>,
    pub page_index: u32,
    pub page_size: u32,
    pub total_elements: Option<u64>,
}

impl Page {
    pub fn from_response(request: &PageRequest, response: PageResponse) -> Self {
        Self {
            items: response.content,
            page_index: request.page,
            page_size: request.size,
            total_elements: response.total_elements,
        }
    }

    pub fn contains(&self, id: labstock_core::ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}
