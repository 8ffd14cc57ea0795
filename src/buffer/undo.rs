//! The action log: recording reversible edits and replaying them
//!
//! Every insert and delete is recorded with its exact payload, so each action
//! can be executed in either direction. Replay re-enters the public edit
//! primitives with `is_in_undo` set, which makes the nested recording step
//! discard its action instead of appending it.

use super::Buffer;
use crate::constants;
use crate::error::{BufferError, ErrorKind, Result};
use crate::line::LineId;

/// Direction of a recorded edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Insert,
    Delete,
}

/// One recorded edit. Immutable once logged.
///
/// `start_line` is only a hint for renumbering; replay re-resolves the line
/// through `start_line_index`, which stays authoritative after the original
/// line is gone. `byte_delta` is the change in the buffer's byte count, which
/// tracks line bytes only; the payload's newline separators are covered by
/// `line_delta`.
#[derive(Debug, Clone)]
pub(crate) struct Action {
    pub(crate) kind: ActionKind,
    pub(crate) start_line: LineId,
    pub(crate) start_line_index: usize,
    pub(crate) start_col: usize,
    pub(crate) byte_delta: isize,
    pub(crate) char_delta: isize,
    pub(crate) line_delta: isize,
    pub(crate) data: Vec<u8>,
}

impl Buffer {
    /// Undo the most recent not-yet-undone action.
    ///
    /// Fails if the whole log is already undone, if the log is empty, or if
    /// the recorded position no longer exists; failure leaves the buffer and
    /// the undo cursor untouched.
    pub fn undo(&mut self) -> Result<()> {
        let target = match self.undone {
            Some(0) => {
                return Err(BufferError::new(
                    ErrorKind::NotFound,
                    constants::errors::NOTHING_TO_UNDO,
                    "every recorded action is already undone",
                ))
            }
            Some(cursor) => cursor - 1,
            None if !self.actions.is_empty() => self.actions.len() - 1,
            None => {
                return Err(BufferError::new(
                    ErrorKind::NotFound,
                    constants::errors::NOTHING_TO_UNDO,
                    "no recorded actions",
                ))
            }
        };
        self.replay(target, false)?;
        self.undone = Some(target);
        Ok(())
    }

    /// Redo the most recently undone action.
    ///
    /// Fails if no undo is outstanding or the recorded position is stale;
    /// failure leaves the undo cursor untouched.
    pub fn redo(&mut self) -> Result<()> {
        let target = self.undone.ok_or_else(|| {
            BufferError::new(
                ErrorKind::NotFound,
                constants::errors::NOTHING_TO_REDO,
                "no undone action to redo",
            )
        })?;
        self.replay(target, true)?;
        self.undone = if target + 1 < self.actions.len() {
            Some(target + 1)
        } else {
            None
        };
        Ok(())
    }

    /// Execute one logged action forward (redo) or backward (undo)
    fn replay(&mut self, index: usize, is_redo: bool) -> Result<()> {
        let (kind, start_line_index, start_col, char_delta) = {
            let action = &self.actions[index];
            (
                action.kind,
                action.start_line_index,
                action.start_col,
                action.char_delta,
            )
        };

        // The stored line handle may be long dead; the index is authoritative
        let line_id = self.line(start_line_index).map_err(|_| {
            BufferError::new(
                ErrorKind::StaleReplay,
                constants::errors::STALE_ACTION,
                format!("line {} no longer exists", start_line_index),
            )
        })?;
        if start_col > self.lines[line_id].char_count() {
            return Err(BufferError::new(
                ErrorKind::StaleReplay,
                constants::errors::STALE_ACTION,
                format!(
                    "column {} is past the end of line {}",
                    start_col, start_line_index
                ),
            ));
        }

        let offset = self.offset_of(line_id, start_col)?;

        self.is_in_undo = true;
        let result = if (kind == ActionKind::Delete && is_redo)
            || (kind == ActionKind::Insert && !is_redo)
        {
            self.delete(offset, char_delta.unsigned_abs())
        } else {
            let data = self.actions[index].data.clone();
            self.insert(offset, &data).map(|_| ())
        };
        self.is_in_undo = false;
        result
    }

    /// Append a freshly recorded action, chopping off the redo tail first if
    /// an undo is outstanding
    pub(crate) fn record_action(&mut self, action: Action) {
        if let Some(cursor) = self.undone.take() {
            self.actions.truncate(cursor);
        }
        self.actions.push(action);
    }
}
