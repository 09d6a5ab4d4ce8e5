use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Amount, Service};

use super::{
    options::{ColorMode, Copies, Orientation, PaperSize, PaperType, PrintOptions},
    pricing,
};

const ACCEPTED_DOCUMENT_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Reference to an uploaded document held by the file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentRef {
    pub name: String,
    pub size_bytes: u64,
}

impl DocumentRef {
    pub fn is_accepted(name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ACCEPTED_DOCUMENT_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted)),
            _ => false,
        }
    }
}

/// Live state of the new-order form.
///
/// The estimated total is recomputed by every setter so it never lags
/// behind the selection.
#[derive(Debug, Clone, Default)]
pub struct OrderForm {
    service: Option<Service>,
    options: PrintOptions,
    notes: String,
    pickup_at: Option<DateTime<Utc>>,
    documents: Vec<DocumentRef>,
    estimated_total: Amount,
}

impl OrderForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_service(&mut self, service: Option<Service>) {
        self.service = service;
        self.reprice();
    }

    pub fn set_options(&mut self, options: PrintOptions) {
        self.options = options;
        self.reprice();
    }

    pub fn set_paper_size(&mut self, paper_size: PaperSize) {
        self.options.paper_size = paper_size;
        self.reprice();
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.options.color_mode = color_mode;
        self.reprice();
    }

    /// Out-of-range counts are clamped into `1..=1000`.
    pub fn set_copies(&mut self, copies: i64) {
        self.options.copies = Copies::clamped(copies);
        self.reprice();
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.options.orientation = orientation;
        self.reprice();
    }

    pub fn set_paper_type(&mut self, paper_type: PaperType) {
        self.options.paper_type = paper_type;
        self.reprice();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_pickup_at(&mut self, pickup_at: Option<DateTime<Utc>>) {
        self.pickup_at = pickup_at;
    }

    /// Returns false and keeps the form unchanged for unsupported file types.
    pub fn attach_document(&mut self, document: DocumentRef) -> bool {
        if !DocumentRef::is_accepted(&document.name) {
            tracing::debug!(name = %document.name, "ignoring unsupported document");
            return false;
        }
        self.documents.push(document);
        true
    }

    pub fn remove_document(&mut self, name: &str) {
        self.documents.retain(|doc| doc.name != name);
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn pickup_at(&self) -> Option<DateTime<Utc>> {
        self.pickup_at
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    pub fn estimated_total(&self) -> Amount {
        self.estimated_total
    }

    fn reprice(&mut self) {
        self.estimated_total = pricing::estimate(self.service.as_ref(), &self.options);
    }
}
