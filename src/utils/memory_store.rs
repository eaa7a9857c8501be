//! In-memory review store for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::ReviewStore;
use crate::types::{ManualReviewItem, ReviewDecision, ReviewStoreResult};

/// In-memory review store
///
/// Items are kept in arrival order and never deduplicated, so nothing a run
/// exports can be silently lost. Decisions are keyed by transaction
/// reference; a later decision for the same transaction replaces the
/// earlier one.
#[derive(Debug, Clone, Default)]
pub struct MemoryReviewStore {
    items: Arc<RwLock<Vec<ManualReviewItem>>>,
    decisions: Arc<RwLock<HashMap<String, ReviewDecision>>>,
}

impl MemoryReviewStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.items.write().unwrap().clear();
        self.decisions.write().unwrap().clear();
    }

    /// Number of items currently held
    pub fn item_count(&self) -> usize {
        self.items.read().unwrap().len()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn save_item(&mut self, item: &ManualReviewItem) -> ReviewStoreResult<()> {
        self.items.write().unwrap().push(item.clone());
        Ok(())
    }

    async fn list_items(&self) -> ReviewStoreResult<Vec<ManualReviewItem>> {
        Ok(self.items.read().unwrap().clone())
    }

    async fn save_decision(&mut self, decision: &ReviewDecision) -> ReviewStoreResult<()> {
        self.decisions
            .write()
            .unwrap()
            .insert(decision.transaction_ref.clone(), decision.clone());
        Ok(())
    }

    async fn list_decisions(&self) -> ReviewStoreResult<Vec<ReviewDecision>> {
        Ok(self.decisions.read().unwrap().values().cloned().collect())
    }

    async fn get_decision(
        &self,
        transaction_ref: &str,
    ) -> ReviewStoreResult<Option<ReviewDecision>> {
        Ok(self.decisions.read().unwrap().get(transaction_ref).cloned())
    }
}
