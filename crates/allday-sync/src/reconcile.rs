//! New-versus-existing reconciliation of listing records against the catalog.

use std::collections::HashMap;

use allday_core::{CatalogStore, ProductRecord, StoreError, SyncMode};
use serde::Serialize;

/// `external_id` → catalog id for the current run.
///
/// Seeded once from the store, then extended after every successful insert,
/// so a product listed under several categories is inserted at most once.
#[derive(Debug, Clone, Default)]
pub struct IdCache {
    ids: HashMap<String, i64>,
}

impl IdCache {
    /// Load every known id from `store`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the id listing fails.
    pub async fn seed<S: CatalogStore>(store: &S) -> Result<Self, StoreError> {
        let ids = store.list_all_external_ids().await?;
        Ok(Self { ids })
    }

    #[must_use]
    pub fn get(&self, external_id: &str) -> Option<i64> {
        self.ids.get(external_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn insert(&mut self, external_id: String, id: i64) {
        self.ids.insert(external_id, id);
    }
}

impl From<HashMap<String, i64>> for IdCache {
    fn from(ids: HashMap<String, i64>) -> Self {
        Self { ids }
    }
}

/// Which write failed for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStage {
    Insert,
    MetadataRefresh,
    PriceAppend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new catalog entry plus its first price observation.
    Inserted { entry_id: i64 },
    /// A price observation appended to an existing entry.
    Updated {
        entry_id: i64,
        metadata_refreshed: bool,
    },
    /// Nothing counted; the record is skipped.
    Failed { stage: WriteStage, error: String },
}

/// Per-batch counters. Failed records count as neither new nor updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub new_count: usize,
    pub updated_count: usize,
    pub failures: usize,
}

impl ReconcileStats {
    fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Inserted { .. } => self.new_count += 1,
            ReconcileOutcome::Updated { .. } => self.updated_count += 1,
            ReconcileOutcome::Failed { .. } => self.failures += 1,
        }
    }
}

/// A record skipped because one of its writes failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub external_id: String,
    pub stage: WriteStage,
    pub error: String,
}

/// Counters and skipped records for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub stats: ReconcileStats,
    pub skipped: Vec<SkippedRecord>,
}

pub struct ReconciliationEngine<'a, S> {
    store: &'a S,
    cache: IdCache,
}

impl<'a, S: CatalogStore> ReconciliationEngine<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, cache: IdCache) -> Self {
        Self { store, cache }
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &IdCache {
        &self.cache
    }

    /// Reconcile one record.
    ///
    /// A cached id appends a price observation, preceded in
    /// [`SyncMode::FullRefresh`] by a metadata overwrite. An unknown id is
    /// inserted, observed, and only then cached.
    pub async fn reconcile(&mut self, record: &ProductRecord, mode: SyncMode) -> ReconcileOutcome {
        let outcome = match self.cache.get(&record.external_id) {
            Some(entry_id) => self.update_existing(entry_id, record, mode).await,
            None => self.insert_new(record).await,
        };

        if let ReconcileOutcome::Failed { stage, error } = &outcome {
            tracing::error!(
                external_id = %record.external_id,
                name = %record.name,
                ?stage,
                error = %error,
                "catalog write failed; record skipped"
            );
        }
        outcome
    }

    /// Reconcile `records` in order. The cache carries over between batches;
    /// the returned counters cover this batch alone.
    pub async fn reconcile_all(
        &mut self,
        records: &[ProductRecord],
        mode: SyncMode,
    ) -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        for record in records {
            let outcome = self.reconcile(record, mode).await;
            batch.stats.record(&outcome);
            if let ReconcileOutcome::Failed { stage, error } = outcome {
                batch.skipped.push(SkippedRecord {
                    external_id: record.external_id.clone(),
                    stage,
                    error,
                });
            }
        }
        batch
    }

    async fn update_existing(
        &mut self,
        entry_id: i64,
        record: &ProductRecord,
        mode: SyncMode,
    ) -> ReconcileOutcome {
        let metadata_refreshed = mode == SyncMode::FullRefresh;
        if metadata_refreshed {
            if let Err(e) = self.store.upsert_catalog_entry(record).await {
                return ReconcileOutcome::Failed {
                    stage: WriteStage::MetadataRefresh,
                    error: e.to_string(),
                };
            }
        }

        match self.append(entry_id, record).await {
            Ok(()) => ReconcileOutcome::Updated {
                entry_id,
                metadata_refreshed,
            },
            Err(e) => ReconcileOutcome::Failed {
                stage: WriteStage::PriceAppend,
                error: e.to_string(),
            },
        }
    }

    async fn insert_new(&mut self, record: &ProductRecord) -> ReconcileOutcome {
        let entry = match self.store.upsert_catalog_entry(record).await {
            Ok(entry) => entry,
            Err(e) => {
                return ReconcileOutcome::Failed {
                    stage: WriteStage::Insert,
                    error: e.to_string(),
                }
            }
        };

        if let Err(e) = self.append(entry.id, record).await {
            return ReconcileOutcome::Failed {
                stage: WriteStage::PriceAppend,
                error: e.to_string(),
            };
        }

        self.cache.insert(record.external_id.clone(), entry.id);
        ReconcileOutcome::Inserted { entry_id: entry.id }
    }

    async fn append(&self, entry_id: i64, record: &ProductRecord) -> Result<(), StoreError> {
        self.store
            .append_price_observation(
                entry_id,
                record.price,
                record.original_price,
                record.discount_rate,
                record.is_on_sale,
            )
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
