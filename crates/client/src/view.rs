//! The inventory view: shared state, liveness and the operator-facing surface.
//!
//! Controllers never touch the view after it has been deactivated. Each async
//! operation captures a [`LivenessToken`] when it starts and re-checks it when
//! its result arrives; a token from a previous activation is never live again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::broadcast;
use uuid::Uuid;

use labstock_core::ItemId;
use labstock_inventory::{DetailsPatch, InventoryItem, NewItemDraft, Page};

use crate::api::InventoryApi;
use crate::config::ClientConfig;
use crate::discovery::{BrowserPrintAdapter, DeviceDiscovery};
use crate::error::ClientError;
use crate::gateway::{HttpGateway, ReqwestGateway};
use crate::mutation::MutationCoordinator;
use crate::print::{PrintJob, PrintOutcome, PrintWorkflow};
use crate::reference::{ReferenceData, ReferenceDataLoader};
use crate::search::{SearchListController, SearchState};

const EVENT_CAPACITY: usize = 64;

/// Which modal form is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Popup {
    #[default]
    Closed,
    Add,
    UpdateQuantity(InventoryItem),
    UpdateDetails(InventoryItem),
}

/// Everything the view displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: SearchState,
    pub page: Page,
    pub reference: ReferenceData,
    pub popup: Popup,
    /// Last surfaced error, shown until dismissed.
    pub error: Option<String>,
    /// Last print notice, shown until dismissed.
    pub notice: Option<String>,
    pub(crate) applied_generation: u64,
}

/// Change notifications for whoever renders the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    PageReplaced {
        generation: u64,
        page_index: u32,
        items: usize,
    },
    ReferenceLoaded,
    ErrorRaised(String),
    PopupChanged,
    PrintFinished {
        job_id: Uuid,
        outcome: PrintOutcome,
    },
}

/// Captured at the start of an async operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LivenessToken {
    epoch: u64,
}

#[derive(Debug, Default)]
struct Liveness {
    epoch: AtomicU64,
    active: AtomicBool,
}

impl Liveness {
    fn activate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn token(&self) -> LivenessToken {
        LivenessToken {
            epoch: self.epoch.load(Ordering::SeqCst),
        }
    }

    fn is_live(&self, token: LivenessToken) -> bool {
        self.active.load(Ordering::SeqCst) && self.epoch.load(Ordering::SeqCst) == token.epoch
    }
}

/// State shared by the view and its controllers.
pub(crate) struct ViewShared {
    api: InventoryApi,
    page_size: u32,
    state: Mutex<ViewState>,
    liveness: Liveness,
    generations: AtomicU64,
    events: broadcast::Sender<ViewEvent>,
}

impl ViewShared {
    fn new(api: InventoryApi, page_size: u32) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            page_size,
            state: Mutex::new(ViewState::default()),
            liveness: Liveness::default(),
            generations: AtomicU64::new(0),
            events,
        }
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub(crate) fn api(&self) -> &InventoryApi {
        &self.api
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Generations start at 1 so that 0 means "nothing applied yet".
    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn token(&self) -> LivenessToken {
        self.liveness.token()
    }

    pub(crate) fn is_live(&self, token: LivenessToken) -> bool {
        self.liveness.is_live(token)
    }

    pub(crate) fn emit(&self, event: ViewEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Log `err` and, if the view is still live, show it to the operator.
    pub(crate) fn surface_error(&self, token: LivenessToken, operation: &str, err: &ClientError) {
        tracing::warn!(operation, status = ?err.status(), error = %err, "request failed");

        if !self.is_live(token) {
            return;
        }
        let message = err.user_message();
        self.with_state(|s| s.error = Some(message.clone()));
        self.emit(ViewEvent::ErrorRaised(message));
    }

    pub(crate) fn set_popup(&self, popup: Popup) {
        self.with_state(|s| s.popup = popup);
        self.emit(ViewEvent::PopupChanged);
    }

    pub(crate) fn close_popup(&self) {
        self.set_popup(Popup::Closed);
    }
}

/// Handle to one inventory view. Clones share the same state.
#[derive(Clone)]
pub struct InventoryView {
    shared: Arc<ViewShared>,
    search: SearchListController,
    mutations: MutationCoordinator,
    discovery: Option<Arc<dyn DeviceDiscovery>>,
}

impl InventoryView {
    pub fn new(
        config: &ClientConfig,
        gateway: Arc<dyn HttpGateway>,
        discovery: Option<Arc<dyn DeviceDiscovery>>,
    ) -> Self {
        let api = InventoryApi::new(gateway, config.kind);
        let shared = Arc::new(ViewShared::new(api, config.page_size));
        let search = SearchListController::new(shared.clone(), config.debounce());
        let mutations = MutationCoordinator::new(shared.clone(), search.clone());

        Self {
            shared,
            search,
            mutations,
            discovery,
        }
    }

    /// HTTP gateway and Browser Print adapter built from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        let gateway = match &config.auth_token {
            Some(token) => ReqwestGateway::with_token(&config.api_url, token),
            None => ReqwestGateway::new(&config.api_url),
        };
        let discovery = BrowserPrintAdapter::new(&config.print_service_url);

        Self::new(config, Arc::new(gateway), Some(Arc::new(discovery)))
    }

    /// Load reference data and the first list page concurrently.
    ///
    /// Reference failures are surfaced but never block the list.
    #[tracing::instrument(name = "activate_view", skip_all, fields(kind = %self.shared.api().kind()))]
    pub async fn activate(&self) {
        self.shared.liveness.activate();
        let token = self.shared.token();

        let loader = ReferenceDataLoader::new(self.shared.api().clone());
        let (reference, _) = tokio::join!(loader.load(), self.search.refresh());

        if !self.shared.is_live(token) {
            return;
        }
        let errors = self.shared.with_state(|s| reference.apply_to(&mut s.reference));
        for err in &errors {
            self.shared.surface_error(token, "load_reference_data", err);
        }
        self.shared.emit(ViewEvent::ReferenceLoaded);
        tracing::info!(failures = errors.len(), "inventory view activated");
    }

    /// Stop applying results. Pending debounced searches are dropped.
    pub fn deactivate(&self) {
        self.search.cancel_pending();
        self.shared.liveness.deactivate();
        tracing::info!("inventory view deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_live(self.shared.token())
    }

    #[cfg(test)]
    pub(crate) fn mark_active(&self) {
        self.shared.liveness.activate();
    }

    pub fn search(&self) -> &SearchListController {
        &self.search
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.shared.events.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.shared.with_state(|s| s.clone())
    }

    pub fn page(&self) -> Page {
        self.shared.with_state(|s| s.page.clone())
    }

    pub fn reference_data(&self) -> ReferenceData {
        self.shared.with_state(|s| s.reference.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.shared.with_state(|s| s.error.clone())
    }

    pub fn dismiss_error(&self) {
        self.shared.with_state(|s| s.error = None);
    }

    pub fn notice(&self) -> Option<String> {
        self.shared.with_state(|s| s.notice.clone())
    }

    pub fn dismiss_notice(&self) {
        self.shared.with_state(|s| s.notice = None);
    }

    pub fn popup(&self) -> Popup {
        self.shared.with_state(|s| s.popup.clone())
    }

    /// Open the add form and return its prefilled draft.
    pub fn open_add_popup(&self, today: NaiveDate) -> NewItemDraft {
        let kind = self.shared.api().kind();
        let draft = self
            .shared
            .with_state(|s| s.reference.new_item_draft(kind, today));
        self.shared.set_popup(Popup::Add);
        draft
    }

    pub fn open_update_quantity_popup(&self, item: InventoryItem) {
        self.shared.set_popup(Popup::UpdateQuantity(item));
    }

    /// Open the details form, prefilled from `item`.
    pub fn open_update_details_popup(&self, item: InventoryItem) -> DetailsPatch {
        let patch = DetailsPatch::from_item(&item);
        self.shared.set_popup(Popup::UpdateDetails(item));
        patch
    }

    pub fn close_popup(&self) {
        self.shared.close_popup();
    }

    /// Route of the detail page for `id`.
    pub fn detail_route(&self, id: ItemId) -> String {
        self.shared.api().kind().detail_route(id)
    }

    /// Run one print job for `item` and post its outcome as a notice.
    pub async fn print_label(&self, item: &InventoryItem) -> PrintJob {
        let token = self.shared.token();
        let workflow = PrintWorkflow::new(self.shared.api().clone(), self.discovery.clone());
        let job = workflow.run(item).await;

        let Some(outcome) = job.outcome() else {
            return job;
        };
        if self.shared.is_live(token) {
            self.shared.with_state(|s| s.notice = Some(outcome.notice()));
            self.shared.emit(ViewEvent::PrintFinished {
                job_id: job.id,
                outcome,
            });
        }
        job
    }
}
