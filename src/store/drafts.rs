//! Draft persistence, independent of the product collection.

use std::sync::Arc;
use tracing::{debug, warn};
use crate::domain::aggregates::Draft;
use crate::storage::{KeyValueStorage, DRAFT_KEY};
use crate::{Result, StorageError};

#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl DraftStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self { Self { storage } }

    pub fn save(&self, draft: &Draft) -> Result<()> {
        let json = serde_json::to_string(draft).map_err(StorageError::from)?;
        self.storage.set(DRAFT_KEY, &json)?;
        debug!(images = draft.images.len(), "draft saved");
        Ok(())
    }

    /// `None` when there is no draft or it cannot be read back.
    pub fn load(&self) -> Option<Draft> {
        let text = match self.storage.get(DRAFT_KEY) {
            Ok(text) => text?,
            Err(e) => {
                warn!(error = %e, "could not read draft");
                return None;
            }
        };
        serde_json::from_str(&text).map_err(|e| warn!(error = %e, "stored draft is malformed, ignoring")).ok()
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(DRAFT_KEY)?;
        Ok(())
    }
}
