//! Marks - logical positions that follow edits

use crate::arena::Handle;
use crate::line::LineId;

/// Handle to a mark stored in a buffer's mark arena
pub type MarkId = Handle<Mark>;

/// A movable position `(line, col)` inside a buffer.
///
/// The edit engine relocates marks on every line split, merge, insert, and
/// delete, so a mark keeps naming the same semantic character (or the
/// character immediately after a deletion) for its whole life. The display
/// letter is cosmetic only.
#[derive(Debug)]
pub struct Mark {
    pub(crate) line: LineId,
    pub(crate) col: usize,
    pub(crate) letter: char,
}

impl Mark {
    /// The line this mark is currently anchored to
    #[must_use]
    pub fn line(&self) -> LineId {
        self.line
    }

    /// Codepoint column within the line, in `[0, char_count]`
    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    /// Display letter assigned round-robin from `'a'..='z'`
    #[must_use]
    pub fn letter(&self) -> char {
        self.letter
    }
}
