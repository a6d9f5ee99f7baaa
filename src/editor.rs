//! Editing session
//!
//! [`Editor`] ties the product store, the draft entry and the pending image
//! batch together the way the add and edit forms use them.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::aggregates::{Draft, Product};
use crate::domain::events::CatalogEvent;
use crate::intake::{EditForm, EditSession, ImageBatch, IncomingImage, IntakeReport, ProductForm};
use crate::storage::KeyValueStorage;
use crate::store::{DraftStore, ProductStore};
use crate::{CatalogError, Result, ValidationError};

/// The outcome of restoring a draft: its form fields plus how its images fared
/// against the pending batch.
#[derive(Debug, Serialize)]
pub struct RestoredDraft {
    pub form: ProductForm,
    pub images: IntakeReport,
}

pub struct Editor {
    store: ProductStore,
    drafts: DraftStore,
    images: ImageBatch,
    events: Vec<CatalogEvent>,
}

impl Editor {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            store: ProductStore::load(storage.clone()),
            drafts: DraftStore::new(storage),
            images: ImageBatch::new(),
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &ProductStore { &self.store }
    pub fn store_mut(&mut self) -> &mut ProductStore { &mut self.store }
    pub fn images(&self) -> &ImageBatch { &self.images }
    pub fn images_mut(&mut self) -> &mut ImageBatch { &mut self.images }

    pub fn add_images(&mut self, files: impl IntoIterator<Item = IncomingImage>) -> IntakeReport {
        self.images.accept_all(files)
    }

    /// Adds a product from the add form and the pending images. On success the
    /// batch and any saved draft are cleared; on failure nothing changes.
    pub fn submit(&mut self, form: ProductForm) -> Result<&Product> {
        if self.images.is_empty() {
            return Err(ValidationError::MissingImage.into());
        }
        let product = form.into_product(self.images.images().to_vec())?;
        let id = self.store.add(product)?.id.clone();
        self.images.clear();
        if let Err(e) = self.drafts.clear() {
            warn!(error = %e, "product added but the draft could not be cleared");
        }
        self.store.find(&id).ok_or(CatalogError::NotFound(id))
    }

    pub fn edit(&mut self, id: &str, form: EditForm) -> Result<Product> {
        let (session, _) = EditSession::begin(&self.store, id)?;
        session.commit(&mut self.store, form)
    }

    pub fn save_draft(&mut self, form: ProductForm) -> Result<()> {
        self.drafts.save(&Draft::new(form, self.images.images().to_vec()))?;
        self.events.push(CatalogEvent::DraftSaved);
        Ok(())
    }

    /// The saved draft, if any. Nothing is changed.
    pub fn draft(&self) -> Option<Draft> { self.drafts.load() }

    /// Loads the saved draft, if any, and merges its images into the pending batch.
    pub fn restore_draft(&mut self) -> Option<RestoredDraft> {
        let draft = self.drafts.load()?;
        let report = self.images.restore(draft.images);
        info!(accepted = report.accepted, rejected = report.rejected.len(), "draft restored");
        Some(RestoredDraft { form: draft.form, images: report })
    }

    pub fn clear_form(&mut self) -> Result<()> {
        self.images.clear();
        self.drafts.clear()?;
        self.events.push(CatalogEvent::DraftCleared);
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> {
        let mut events = self.store.take_events();
        events.append(&mut self.events);
        events
    }
}
