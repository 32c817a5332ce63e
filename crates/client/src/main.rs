//! Command-line entry point.
//!
//! Activates one inventory view against the configured backend, optionally
//! types a search into it, and prints the resulting page as JSON.
//!
//! Usage: `labstock [COLUMN] [TERM]`

use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;

use labstock_client::{ClientConfig, InventoryView, ViewEvent};
use labstock_inventory::SearchColumn;

/// Upper bound on the debounced fetch once the timer has fired.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("reading LABSTOCK_* configuration")?;
    labstock_observability::init(&config.log);

    let mut args = std::env::args().skip(1);
    let column = args
        .next()
        .map(|raw| raw.parse::<SearchColumn>())
        .transpose()
        .context("parsing search column")?;
    let term = args.next();

    tracing::info!(api_url = %config.api_url, kind = %config.kind, "starting inventory view");

    let view = InventoryView::from_config(&config);
    view.activate().await;

    if column.is_some() || term.is_some() {
        let mut events = view.subscribe();
        if let Some(column) = column {
            view.search().set_search_column(column);
        }
        if let Some(term) = term {
            view.search().set_search_term(term);
        }
        if view.search().has_pending_search() {
            let settled = async {
                loop {
                    match events.recv().await {
                        Ok(ViewEvent::PageReplaced { .. } | ViewEvent::ErrorRaised(_)) => break,
                        Ok(_) | Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            };
            tokio::time::timeout(config.debounce() + REQUEST_TIMEOUT, settled)
                .await
                .context("search did not settle")?;
        }
    }

    if let Some(error) = view.error() {
        tracing::warn!(%error, "view reported an error");
    }

    let page = view.page();
    let output = serde_json::json!({
        "page": page.page_index,
        "size": page.page_size,
        "totalElements": page.total_elements,
        "items": page.items,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("serializing page")?
    );

    view.deactivate();
    Ok(())
}
