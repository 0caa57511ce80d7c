use thiserror::Error;

use super::buffer::{BufferError, LineId};

/// Errors from cursor-driven editing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The operation needs an active cursor and there is none.
    #[error("no active cursor")]
    NoCursor,

    /// The cursor's line was removed or replaced.
    #[error("cursor refers to line {0:?}, which no longer exists")]
    StaleCursor(LineId),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}
