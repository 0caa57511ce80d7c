// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Keyline
//!
//! A keyword-classified line editor core.
//!
//! Every line of a note is styled from its leading keyword (`todo`, `redo`,
//! `info`, ...), can be indented or outdented from the cursor, and the whole
//! line sequence is saved after each change.
//!
//! ## Architecture
//!
//! Edits go through a [`editor::LineBuffer`], which queues change records and
//! delivers them in batches to its listeners. The
//! [`pipeline::ChangePipeline`] listener saves a snapshot and reclassifies
//! edited lines.
//!
//! ## Modules
//!
//! - [`style`]: Style rule table and line classifier
//! - [`normalize`]: Splitting raw text into lines
//! - [`editor`]: Line buffer, indent engine, editing session
//! - [`store`]: Snapshot persistence over key-value backends
//! - [`pipeline`]: Change handling (save + restyle)
//! - [`ui`]: Terminal output of styled lines
//! - [`config`]: Saved command-line defaults

pub mod config;
pub mod editor;
pub mod normalize;
pub mod perf;
pub mod pipeline;
pub mod store;
pub mod style;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{Cursor, LineBuffer, Session, ShiftDirection};
    pub use crate::store::{FileStore, MemoryStore, SnapshotStore};
    pub use crate::style::{Attributes, Classifier, StyleTable};
}
