//! Linebuf - an in-memory line-based text buffer for interactive editors

pub mod arena;
pub mod buffer;
pub mod constants;
pub mod error;
pub mod line;
pub mod mark;
pub mod style;

pub use buffer::{ActionKind, Buffer, EditEvent, Listener};
pub use error::{BufferError, ErrorKind, Result};
pub use line::{Line, LineId};
pub use mark::{Mark, MarkId};
pub use style::{Style, StyleRule};
