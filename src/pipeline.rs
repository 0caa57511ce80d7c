//! Reaction to buffer mutations: persist the line sequence and restyle edited lines.

use tracing::{debug, error, warn};

use crate::editor::{BufferListener, Change, LineBuffer, LineId};
use crate::normalize::normalize;
use crate::style::Classifier;
use crate::store::{KeyValueStore, SnapshotStore};

/// Buffer listener that saves a snapshot for every change record and
/// reclassifies lines whose text changed.
///
/// Holds no state between batches apart from its collaborators.
#[derive(Debug)]
pub struct ChangePipeline<S> {
    classifier: Classifier,
    store: SnapshotStore<S>,
}

impl<S: KeyValueStore> ChangePipeline<S> {
    pub const fn new(classifier: Classifier, store: SnapshotStore<S>) -> Self {
        Self { classifier, store }
    }

    /// Handle one change record.
    pub fn apply(&mut self, buffer: &mut LineBuffer, change: Change) {
        self.persist(buffer);
        if let Change::TextEdited(id) = change {
            self.restyle(buffer, id);
        }
    }

    fn persist(&mut self, buffer: &LineBuffer) {
        let lines = snapshot_lines(buffer);
        match self.store.save(&lines) {
            Ok(()) => debug!(lines = lines.len(), key = self.store.key(), "saved snapshot"),
            Err(err) => warn!(%err, "failed to save snapshot"),
        }
    }

    fn restyle(&self, buffer: &mut LineBuffer, id: LineId) {
        // The line may have been removed later in the same batch.
        let Some(line) = buffer.line(id) else {
            return;
        };
        if line.text().trim().is_empty() {
            return;
        }
        match self.classifier.classify(line.text()) {
            Ok(attributes) => {
                if let Err(err) = buffer.set_attributes(id, attributes) {
                    warn!(%err, "failed to apply line attributes");
                }
            }
            Err(err) => error!(%err, "line left unstyled"),
        }
    }
}

impl<S: KeyValueStore> BufferListener for ChangePipeline<S> {
    fn on_changes(&mut self, buffer: &mut LineBuffer, changes: &[Change]) {
        let _scope = crate::perf::scope("pipeline.batch");
        for change in changes {
            self.apply(buffer, *change);
        }
        crate::perf::record_batch(changes);
    }
}

/// The line sequence to persist for `buffer`.
pub fn snapshot_lines(buffer: &LineBuffer) -> Vec<String> {
    if buffer.is_empty() {
        return Vec::new();
    }
    normalize(&buffer.text())
}
