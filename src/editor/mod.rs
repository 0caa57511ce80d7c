//! Line editing.
//!
//! Provides the line buffer with change notification, the cursor-driven
//! indent engine, and the session that ties both to the change pipeline.

mod buffer;
mod error;
pub mod indent;
mod session;

pub use buffer::{BufferError, BufferListener, Change, Cursor, Line, LineBuffer, LineId};
pub use error::EditError;
pub use indent::{DEFAULT_INDENT_UNIT, ShiftDirection};
pub use session::{KeyOutcome, SEED_LINES, Session};
