//! The buffer: a doubly-linked list of lines with marks, styles, and undo
//!
//! All public operations are synchronous and assume exclusive access; the
//! buffer is a single-threaded structure and callers serialize externally.
//! Dropping a buffer releases its lines, marks, cache, and recorded actions.

mod edit;
mod styles;
mod undo;

pub use undo::ActionKind;
use undo::Action;

use crate::arena::Arena;
use crate::constants;
use crate::error::{BufferError, ErrorKind, Result};
use crate::line::{Line, LineId};
use crate::mark::{Mark, MarkId};
use crate::style::StyleRule;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// Description of one recorded mutation, handed to listeners
#[derive(Debug, Clone)]
pub struct EditEvent {
    pub kind: ActionKind,
    pub start_line_index: usize,
    pub start_col: usize,
    pub byte_delta: isize,
    pub char_delta: isize,
    pub line_delta: isize,
}

/// Callback registered with [`Buffer::add_listener`].
/// Dispatch semantics are not defined yet; registration is the whole contract.
pub type Listener = Box<dyn FnMut(&EditEvent)>;

/// Reassembled-text cache, rebuilt lazily behind a dirty bit
#[derive(Debug, Default)]
struct TextCache {
    bytes: Vec<u8>,
    dirty: bool,
}

/// An editable text buffer organized as lines.
///
/// Character offsets are 0-based codepoint offsets over the whole buffer with
/// newline separators counted. `\n` (0x0A) is the sole line separator; bytes
/// are otherwise arbitrary, and codepoint counts follow UTF-8 leading-byte
/// widths with malformed sequences tolerated.
pub struct Buffer {
    pub(crate) lines: Arena<Line>,
    pub(crate) marks: Arena<Mark>,
    first_line: LineId,
    last_line: LineId,
    byte_count: usize,
    char_count: usize,
    line_count: usize,
    cache: RefCell<TextCache>,
    single_rules: Vec<Rc<StyleRule>>,
    multi_rules: Vec<Rc<StyleRule>>,
    actions: Vec<Action>,
    /// Index of the next action to redo, set while undos are outstanding
    undone: Option<usize>,
    is_in_undo: bool,
    mark_counter: char,
    listeners: Vec<Listener>,
}

impl Buffer {
    /// Create a buffer holding a single empty line
    #[must_use]
    pub fn new() -> Self {
        let mut lines = Arena::new();
        let first_line = lines.insert(Line::new());
        Self {
            lines,
            marks: Arena::new(),
            first_line,
            last_line: first_line,
            byte_count: 0,
            char_count: 0,
            line_count: 1,
            cache: RefCell::new(TextCache::default()),
            single_rules: Vec::new(),
            multi_rules: Vec::new(),
            actions: Vec::new(),
            undone: None,
            is_in_undo: false,
            mark_counter: constants::marks::FIRST_LETTER,
            listeners: Vec::new(),
        }
    }

    /// Total bytes of line text; newline separators are not included
    #[must_use]
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// Total codepoints of text, newlines included
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Number of lines; always at least one
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Handle of the first line
    #[must_use]
    pub fn first_line(&self) -> LineId {
        self.first_line
    }

    /// Handle of the last line
    #[must_use]
    pub fn last_line(&self) -> LineId {
        self.last_line
    }

    /// Borrow a line, if the handle is still live
    #[must_use]
    pub fn line_ref(&self, line_id: LineId) -> Option<&Line> {
        self.lines.get(line_id)
    }

    /// The whole buffer as one byte string, lines joined by `\n` with no
    /// trailing newline.
    ///
    /// The result is a view into an internal cache rebuilt on demand; the
    /// borrow guard keeps the buffer immutable while the view is held, so the
    /// view cannot outlive the next mutation.
    pub fn content(&self) -> Ref<'_, [u8]> {
        {
            let mut cache = self.cache.borrow_mut();
            if cache.dirty {
                cache.bytes.clear();
                let mut cur = Some(self.first_line);
                while let Some(line_id) = cur {
                    let line = &self.lines[line_id];
                    cache.bytes.extend_from_slice(&line.data);
                    if line.next.is_some() {
                        cache.bytes.push(b'\n');
                    }
                    cur = line.next;
                }
                cache.dirty = false;
            }
        }
        Ref::map(self.cache.borrow(), |cache| cache.bytes.as_slice())
    }

    /// Replace the entire contents
    pub fn set(&mut self, data: &[u8]) -> Result<()> {
        self.delete(0, self.char_count)?;
        self.insert(0, data)?;
        Ok(())
    }

    /// Copy out the text between two positions, inclusive of the line range.
    ///
    /// Returns the bytes (with `\n` between lines) and the codepoint count.
    pub fn substr(
        &self,
        start_line: LineId,
        start_col: usize,
        end_line: LineId,
        end_col: usize,
    ) -> Result<(Vec<u8>, usize)> {
        let mut data = Vec::new();
        let mut nchars = 0usize;
        let mut cur = start_line;
        loop {
            let line = self.lines.get(cur).ok_or_else(|| {
                BufferError::new(
                    ErrorKind::NotFound,
                    constants::errors::LINE_NOT_FOUND,
                    "line range is not part of this buffer",
                )
            })?;
            let (copy_index, copy_len) = if start_line == end_line {
                let from = line.col_to_index(start_col);
                let to = line.col_to_index(end_col.max(start_col));
                nchars += end_col.saturating_sub(start_col);
                (from, to - from)
            } else if cur == start_line {
                let from = line.col_to_index(start_col);
                nchars += line.char_count().saturating_sub(start_col);
                (from, line.data.len() - from)
            } else if cur == end_line {
                nchars += end_col;
                (0, line.col_to_index(end_col))
            } else {
                nchars += line.char_count();
                (0, line.data.len())
            };
            if copy_len > 0 {
                data.extend_from_slice(&line.data[copy_index..copy_index + copy_len]);
            }
            if cur == end_line {
                break;
            }
            data.push(b'\n');
            nchars += 1;
            cur = line.next.ok_or_else(|| {
                BufferError::new(
                    ErrorKind::OutOfRange,
                    constants::errors::LINE_NOT_FOUND,
                    "end line is not reachable from start line",
                )
            })?;
        }
        Ok((data, nchars))
    }

    /// Resolve a zero-based line index to its handle
    pub fn line(&self, line_index: usize) -> Result<LineId> {
        let mut cur = Some(self.first_line);
        while let Some(line_id) = cur {
            let line = &self.lines[line_id];
            if line.line_index == line_index {
                return Ok(line_id);
            }
            cur = line.next;
        }
        Err(BufferError::new(
            ErrorKind::NotFound,
            constants::errors::LINE_NOT_FOUND,
            format!("no line with index {}", line_index),
        ))
    }

    /// Resolve a buffer-wide codepoint offset to `(line, col)`.
    /// Offsets past the end clamp to the end of the last line.
    #[must_use]
    pub fn line_col_at(&self, offset: usize) -> (LineId, usize) {
        let mut remaining = offset;
        let mut cur = self.first_line;
        loop {
            let line = &self.lines[cur];
            if line.char_count() >= remaining {
                return (cur, remaining);
            }
            remaining -= line.char_count() + 1; // plus 1 for newline
            match line.next {
                Some(next) => cur = next,
                None => return (cur, line.char_count()),
            }
        }
    }

    /// Resolve `(line, col)` to a buffer-wide codepoint offset, clamped to
    /// the total character count
    pub fn offset_of(&self, line_id: LineId, col: usize) -> Result<usize> {
        let mut offset = 0;
        let mut cur = Some(self.first_line);
        while let Some(id) = cur {
            if id == line_id {
                return Ok(self.char_count.min(offset + col));
            }
            let line = &self.lines[id];
            offset += line.char_count() + 1; // plus 1 for newline
            cur = line.next;
        }
        Err(BufferError::new(
            ErrorKind::NotFound,
            constants::errors::LINE_NOT_FOUND,
            "line is not part of this buffer",
        ))
    }

    /// Add a mark at `(line, col)`, or at the start of the buffer when no
    /// line is given. `col` must not exceed the line's char count.
    pub fn add_mark(&mut self, line: Option<LineId>, col: usize) -> MarkId {
        let (line_id, col) = match line {
            Some(line_id) => (line_id, col),
            None => (self.first_line, 0),
        };
        let letter = self.mark_counter;
        self.mark_counter = if letter == constants::marks::LAST_LETTER {
            constants::marks::FIRST_LETTER
        } else {
            (letter as u8 + 1) as char
        };
        let mark_id = self.marks.insert(Mark {
            line: line_id,
            col,
            letter,
        });
        self.lines[line_id].marks.push(mark_id);
        mark_id
    }

    /// Delete a mark explicitly
    pub fn remove_mark(&mut self, mark_id: MarkId) -> Result<()> {
        let mark = self.marks.remove(mark_id).ok_or_else(|| {
            BufferError::new(
                ErrorKind::NotFound,
                constants::errors::MARK_NOT_FOUND,
                "mark does not exist",
            )
        })?;
        let line = &mut self.lines[mark.line];
        if let Some(pos) = line.marks.iter().position(|&id| id == mark_id) {
            line.marks.remove(pos);
        }
        Ok(())
    }

    /// Current `(line, col)` of a mark
    #[must_use]
    pub fn mark_position(&self, mark_id: MarkId) -> Option<(LineId, usize)> {
        self.marks.get(mark_id).map(|mark| (mark.line, mark.col))
    }

    /// Display letter of a mark
    #[must_use]
    pub fn mark_letter(&self, mark_id: MarkId) -> Option<char> {
        self.marks.get(mark_id).map(|mark| mark.letter)
    }

    /// Whether mark `a` sits strictly after mark `b` in the buffer
    pub(crate) fn mark_is_gt(&self, a: MarkId, b: MarkId) -> bool {
        let mark_a = &self.marks[a];
        let mark_b = &self.marks[b];
        let pos_a = (self.lines[mark_a.line].line_index, mark_a.col);
        let pos_b = (self.lines[mark_b.line].line_index, mark_b.col);
        pos_a > pos_b
    }

    /// Register a style rule and restyle the whole buffer
    pub fn add_rule(&mut self, rule: Rc<StyleRule>) {
        if rule.is_single() {
            self.single_rules.push(rule);
        } else {
            self.multi_rules.push(rule);
        }
        self.apply_styles(self.first_line, self.line_count as isize - 1);
    }

    /// Unregister a style rule and restyle the whole buffer.
    /// The rule itself is untouched; the caller still owns it.
    pub fn remove_rule(&mut self, rule: &Rc<StyleRule>) -> Result<()> {
        let list = if rule.is_single() {
            &mut self.single_rules
        } else {
            &mut self.multi_rules
        };
        let pos = list
            .iter()
            .position(|registered| Rc::ptr_eq(registered, rule))
            .ok_or_else(|| {
                BufferError::new(
                    ErrorKind::NotFound,
                    constants::errors::RULE_NOT_FOUND,
                    "rule is not registered with this buffer",
                )
            })?;
        list.remove(pos);
        self.apply_styles(self.first_line, self.line_count as isize - 1);
        Ok(())
    }

    /// Register an edit listener. Nothing is dispatched yet.
    pub fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Bookkeeping run after every mutation: aggregate counts, cache dirty
    /// bit, line renumbering, restyling, and the undo log.
    pub(crate) fn update(&mut self, action: Action) {
        self.byte_count = (self.byte_count as isize + action.byte_delta) as usize;
        self.char_count = (self.char_count as isize + action.char_delta) as usize;
        self.line_count = (self.line_count as isize + action.line_delta) as usize;
        self.cache.get_mut().dirty = true;

        // Renumber everything after the edit point and refresh last_line
        let mut line_index = self.lines[action.start_line].line_index;
        let mut last = action.start_line;
        let mut cur = self.lines[action.start_line].next;
        while let Some(line_id) = cur {
            line_index += 1;
            let line = &mut self.lines[line_id];
            line.line_index = line_index;
            last = line_id;
            cur = line.next;
        }
        self.last_line = last;

        self.apply_styles(action.start_line, action.line_delta);

        if !self.is_in_undo {
            self.record_action(action);
        }
        // TODO dispatch an EditEvent to listeners once dispatch semantics are settled
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
