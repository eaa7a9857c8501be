//! Traits for the external review-store protocol

use async_trait::async_trait;

use crate::types::{ManualReviewItem, ReviewDecision, ReviewStoreResult};

/// Persistent review store abstraction
///
/// The engine itself never blocks on review: flagged items are exported to a
/// store implementing this trait, humans resolve them out of band, and the
/// resolved decisions feed a subsequent run. Items and decisions are keyed
/// by the stable transaction reference.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist one review item
    ///
    /// Implementations must accept every item handed to them, including
    /// items with zero or absent amounts.
    async fn save_item(&mut self, item: &ManualReviewItem) -> ReviewStoreResult<()>;

    /// List all pending review items
    async fn list_items(&self) -> ReviewStoreResult<Vec<ManualReviewItem>>;

    /// Persist a reviewer's decision
    async fn save_decision(&mut self, decision: &ReviewDecision) -> ReviewStoreResult<()>;

    /// List all recorded decisions
    async fn list_decisions(&self) -> ReviewStoreResult<Vec<ReviewDecision>>;

    /// Look up the decision for a transaction, if one exists
    async fn get_decision(
        &self,
        transaction_ref: &str,
    ) -> ReviewStoreResult<Option<ReviewDecision>>;
}
