//! Label print dispatch.
//!
//! One [`PrintWorkflow`] per print action. It walks
//! `RequestingLabel → ResolvingDefaultPrinter → EnumeratingLocalPrinters →
//! MatchingPrinter → Sending` strictly in order, each step consuming the
//! previous step's output, and stops at the first failure. Nothing is retried
//! and nothing is rolled back: a label generated server side stays generated.

use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use labstock_core::ItemId;
use labstock_inventory::{DefaultPrinterId, InventoryItem, LabelPayload, LabelRequest};

use crate::api::InventoryApi;
use crate::discovery::{self, DeviceDiscovery, DeviceKind, Printer, find_printer};

/// Terminal failure reason of a print job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum PrintFailure {
    #[error("label generation error")]
    LabelGeneration,
    #[error("default printer lookup error")]
    DefaultPrinterLookup,
    #[error("discovery unavailable")]
    DiscoveryUnavailable,
    #[error("default printer not found")]
    PrinterNotFound,
    #[error("print send error")]
    Send,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintStage {
    Idle,
    RequestingLabel,
    ResolvingDefaultPrinter,
    EnumeratingLocalPrinters,
    MatchingPrinter,
    Sending,
    Succeeded,
    Failed(PrintFailure),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    Succeeded,
    Failed(PrintFailure),
}

impl PrintOutcome {
    /// Interruptive notice shown to the operator.
    pub fn notice(&self) -> String {
        match self {
            PrintOutcome::Succeeded => "Print job sent successfully".to_string(),
            PrintOutcome::Failed(failure) => format!("Print failed: {failure}"),
        }
    }
}

/// Record of one print invocation. Never persisted.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: Uuid,
    pub item_id: ItemId,
    pub label: Option<LabelPayload>,
    pub default_printer: Option<DefaultPrinterId>,
    pub printer: Option<Printer>,
    /// Underlying error text of a failed step, for logs.
    pub detail: Option<String>,
    stages: Vec<PrintStage>,
}

impl PrintJob {
    fn new(item_id: ItemId) -> Self {
        Self {
            id: Uuid::now_v7(),
            item_id,
            label: None,
            default_printer: None,
            printer: None,
            detail: None,
            stages: vec![PrintStage::Idle],
        }
    }

    pub fn stage(&self) -> &PrintStage {
        // `stages` starts with Idle and is only ever appended to.
        self.stages.last().unwrap_or(&PrintStage::Idle)
    }

    /// Every stage visited, in order.
    pub fn stages(&self) -> &[PrintStage] {
        &self.stages
    }

    /// `None` until the job reached a terminal stage.
    pub fn outcome(&self) -> Option<PrintOutcome> {
        match self.stage() {
            PrintStage::Succeeded => Some(PrintOutcome::Succeeded),
            PrintStage::Failed(failure) => Some(PrintOutcome::Failed(*failure)),
            _ => None,
        }
    }

    fn enter(&mut self, stage: PrintStage) {
        tracing::debug!(job_id = %self.id, ?stage, "print stage");
        self.stages.push(stage);
    }

    fn fail(mut self, failure: PrintFailure, detail: impl Display) -> Self {
        let detail = detail.to_string();
        tracing::warn!(job_id = %self.id, %failure, %detail, "print job failed");
        self.detail = Some(detail);
        self.enter(PrintStage::Failed(failure));
        self
    }
}

/// Single-use print dispatcher.
pub struct PrintWorkflow {
    api: InventoryApi,
    discovery: Option<Arc<dyn DeviceDiscovery>>,
}

impl PrintWorkflow {
    /// `discovery` is `None` when no local print service is available.
    pub fn new(api: InventoryApi, discovery: Option<Arc<dyn DeviceDiscovery>>) -> Self {
        Self { api, discovery }
    }

    #[tracing::instrument(
        name = "print_label",
        skip_all,
        fields(item_id = %item.id, job_id = tracing::field::Empty)
    )]
    pub async fn run(self, item: &InventoryItem) -> PrintJob {
        let mut job = PrintJob::new(item.id);
        tracing::Span::current().record("job_id", tracing::field::display(job.id));

        job.enter(PrintStage::RequestingLabel);
        let label = match self.api.generate_label(&LabelRequest::for_item(item)).await {
            Ok(label) => label,
            Err(err) => return job.fail(PrintFailure::LabelGeneration, err),
        };
        job.label = Some(label.clone());

        job.enter(PrintStage::ResolvingDefaultPrinter);
        let default_printer = match self.api.default_printer().await {
            Ok(id) => id,
            Err(err) => return job.fail(PrintFailure::DefaultPrinterLookup, err),
        };
        job.default_printer = Some(default_printer.clone());

        job.enter(PrintStage::EnumeratingLocalPrinters);
        let Some(adapter) = self.discovery.as_deref() else {
            return job.fail(
                PrintFailure::DiscoveryUnavailable,
                "no printer discovery adapter configured",
            );
        };
        let printers = match discovery::enumerate(adapter, DeviceKind::Printer).await {
            Ok(printers) => printers,
            Err(err) => return job.fail(PrintFailure::DiscoveryUnavailable, err),
        };

        job.enter(PrintStage::MatchingPrinter);
        let Some(printer) = find_printer(&printers, &default_printer).cloned() else {
            let detail = format!(
                "no local printer matches '{default_printer}' among {} device(s)",
                printers.len()
            );
            return job.fail(PrintFailure::PrinterNotFound, detail);
        };
        job.printer = Some(printer.clone());

        job.enter(PrintStage::Sending);
        if let Err(err) = discovery::send(adapter, &printer, &label).await {
            return job.fail(PrintFailure::Send, err);
        }

        job.enter(PrintStage::Succeeded);
        tracing::info!(job_id = %job.id, printer = %printer.uid, "print job sent");
        job
    }
}
