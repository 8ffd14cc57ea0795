//! The edit engine: buffer-level insert/delete/replace and line primitives
//!
//! Every mutation funnels through here. The primitives keep the mark
//! invariants: a mark always lives in the marks list of the line it points
//! at, breaks migrate marks at or past the break column, intra-line inserts
//! advance marks only under `move_marks`, intra-line deletes retract marks
//! strictly past the deletion column, and lines freed by a multi-line delete
//! relocate their marks onto the survivor.

use super::undo::{Action, ActionKind};
use super::Buffer;
use crate::error::Result;
use crate::line::{Line, LineId};
use crate::mark::MarkId;

impl Buffer {
    /// Insert `data` at a buffer-wide codepoint offset.
    ///
    /// `data` may contain newlines; each one breaks the current line. Returns
    /// the number of codepoints inserted. Empty data is a successful no-op.
    pub fn insert(&mut self, offset: usize, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let (start_line, start_col) = self.line_col_at(offset);

        // Consume the data newline by newline, breaking the current line at
        // the insertion point and filling the left-hand side each time
        let mut cur_line = start_line;
        let mut cur_col = start_col;
        let mut remaining = data;
        let mut num_lines_added = 0isize;
        while let Some(newline_at) = remaining.iter().position(|&byte| byte == b'\n') {
            let new_line = self.line_break(cur_line, cur_col);
            num_lines_added += 1;
            if newline_at > 0 {
                self.line_insert(cur_line, cur_col, &remaining[..newline_at], true);
            }
            remaining = &remaining[newline_at + 1..];
            cur_line = new_line;
            cur_col = 0;
        }
        if !remaining.is_empty() {
            cur_col += self.line_insert(cur_line, cur_col, remaining, true);
        }

        // Read the inserted region back out as the action payload
        let (ins_data, ins_nchars) = self.substr(start_line, start_col, cur_line, cur_col)?;

        let action = Action {
            kind: ActionKind::Insert,
            start_line,
            start_line_index: self.lines[start_line].line_index,
            start_col,
            // Newline separators are carried by line_delta, not byte_delta
            byte_delta: ins_data.len() as isize - num_lines_added,
            char_delta: ins_nchars as isize,
            line_delta: num_lines_added,
            data: ins_data,
        };
        self.update(action);

        Ok(ins_nchars)
    }

    /// Delete `num_chars` codepoints starting at a buffer-wide offset.
    ///
    /// Counts running past the end of the buffer are clamped. An empty range,
    /// or a range starting at the very end of the buffer, is a successful
    /// no-op.
    pub fn delete(&mut self, offset: usize, num_chars: usize) -> Result<()> {
        let (start_line, start_col) = self.line_col_at(offset);
        let (end_line, end_col) = self.line_col_at(offset + num_chars);

        if start_line == end_line && start_col >= end_col {
            return Ok(());
        }
        if start_line == self.last_line() && start_col == self.lines[start_line].char_count() {
            return Ok(());
        }

        // Capture the doomed bytes before touching anything
        let (del_data, del_nchars) = self.substr(start_line, start_col, end_line, end_col)?;

        // Delete the suffix of the start line
        let safe_num_chars =
            num_chars.min(self.lines[start_line].char_count().saturating_sub(start_col));
        if safe_num_chars > 0 {
            self.line_delete(start_line, start_col, safe_num_chars);
        }

        // Pull the tail of the end line onto the start line. Marks are not
        // moved here; relocation below accounts for them wholesale.
        let orig_char_count = self.lines[start_line].char_count();
        if start_line != end_line {
            let tail = {
                let end = &self.lines[end_line];
                let tail_index = end.col_to_index(end_col);
                end.data[tail_index..].to_vec()
            };
            if !tail.is_empty() {
                self.line_insert(start_line, start_col, &tail, false);
            }
        }

        // Free every line after the start line through the end line,
        // relocating their marks onto the survivor
        let swap_line = self.lines[end_line].next;
        let mut num_lines_removed = 0isize;
        let mut cur = self.lines[start_line].next;
        while let Some(line_id) = cur {
            if Some(line_id) == swap_line {
                break;
            }
            cur = self.lines[line_id].next;
            self.line_free(line_id, Some((start_line, orig_char_count)));
            num_lines_removed += 1;
        }
        self.lines[start_line].next = swap_line;
        if let Some(swap_id) = swap_line {
            self.lines[swap_id].prev = Some(start_line);
        }

        let action = Action {
            kind: ActionKind::Delete,
            start_line,
            start_line_index: self.lines[start_line].line_index,
            start_col,
            byte_delta: num_lines_removed - del_data.len() as isize,
            char_delta: -(del_nchars as isize),
            line_delta: -num_lines_removed,
            data: del_data,
        };
        self.update(action);

        Ok(())
    }

    /// Delete `old_nchars` codepoints at `offset`, then insert `data` there.
    /// Returns the number of codepoints inserted.
    pub fn replace(&mut self, offset: usize, old_nchars: usize, data: &[u8]) -> Result<usize> {
        self.delete(offset, old_nchars)?;
        self.insert(offset, data)
    }

    /// Break a line at a column, splicing a new line in after it.
    ///
    /// The byte tail from the break column onward moves to the new line, and
    /// marks at or past the break column migrate with it, rebased to the new
    /// line's origin.
    pub(crate) fn line_break(&mut self, line_id: LineId, col: usize) -> LineId {
        let new_id = self.lines.insert(Line::new());

        // Move the tail into the new line
        let tail = {
            let line = &mut self.lines[line_id];
            let break_index = line.col_to_index(col);
            line.data.split_off(break_index)
        };
        if !tail.is_empty() {
            self.lines[line_id].count_chars();
            let new_line = &mut self.lines[new_id];
            new_line.data = tail;
            new_line.count_chars();
        }

        // Splice into the sibling chain
        let old_next = self.lines[line_id].next;
        self.lines[line_id].next = Some(new_id);
        self.lines[new_id].prev = Some(line_id);
        self.lines[new_id].next = old_next;
        if let Some(next_id) = old_next {
            self.lines[next_id].prev = Some(new_id);
        }

        // Migrate marks at or past the break column
        let mark_ids = self.lines[line_id].marks.clone();
        for mark_id in mark_ids {
            let mark_col = self.marks[mark_id].col;
            if mark_col >= col {
                self.mark_move(mark_id, new_id, mark_col - col);
            }
        }

        new_id
    }

    /// Insert bytes into a line at a column; returns codepoints added.
    ///
    /// With `move_marks` set, marks at or past the column advance by the
    /// codepoints added. The flag is cleared when a multi-line delete merges
    /// the end line's tail in, where relocation is handled by the caller.
    pub(crate) fn line_insert(
        &mut self,
        line_id: LineId,
        col: usize,
        data: &[u8],
        move_marks: bool,
    ) -> usize {
        let num_chars_added = {
            let line = &mut self.lines[line_id];
            let insert_index = line.col_to_index(col);
            let orig_char_count = line.char_count();
            line.data.splice(insert_index..insert_index, data.iter().copied());
            line.count_chars();
            // Malformed bytes can merge with neighbors and lower the count
            line.char_count().saturating_sub(orig_char_count)
        };

        if move_marks {
            let mark_ids = self.lines[line_id].marks.clone();
            for mark_id in mark_ids {
                let mark = &mut self.marks[mark_id];
                if mark.col >= col {
                    mark.col += num_chars_added;
                }
            }
        }

        num_chars_added
    }

    /// Delete up to `num_chars` codepoints within a line at a column;
    /// returns codepoints removed.
    ///
    /// Marks strictly past the column retract; a mark sitting exactly at the
    /// column stays put.
    pub(crate) fn line_delete(&mut self, line_id: LineId, col: usize, num_chars: usize) -> usize {
        let num_chars_deleted = {
            let line = &mut self.lines[line_id];
            let safe_num_chars = num_chars.min(line.char_count().saturating_sub(col));
            if safe_num_chars != num_chars {
                log::debug!(
                    "line delete clamped from {} to {} chars",
                    num_chars,
                    safe_num_chars
                );
            }
            if safe_num_chars < 1 {
                return 0;
            }
            let from = line.col_to_index(col);
            let to = line.col_to_index(col + safe_num_chars);
            let orig_char_count = line.char_count();
            line.data.drain(from..to);
            line.count_chars();
            orig_char_count - line.char_count()
        };

        let mark_ids = self.lines[line_id].marks.clone();
        for mark_id in mark_ids {
            let mark = &mut self.marks[mark_id];
            if mark.col > col {
                mark.col -= num_chars_deleted;
            }
        }

        num_chars_deleted
    }

    /// Remove a line from the arena. With a relocation target, its marks move
    /// to `(survivor, survivor_col_base + mark.col)`; without one they die
    /// with the line.
    pub(crate) fn line_free(&mut self, line_id: LineId, relocate: Option<(LineId, usize)>) {
        let mark_ids = std::mem::take(&mut self.lines[line_id].marks);
        match relocate {
            Some((survivor, col_base)) => {
                for mark_id in mark_ids {
                    {
                        let mark = &mut self.marks[mark_id];
                        mark.line = survivor;
                        mark.col += col_base;
                    }
                    self.lines[survivor].marks.push(mark_id);
                }
            }
            None => {
                for mark_id in mark_ids {
                    self.marks.remove(mark_id);
                }
            }
        }
        self.lines.remove(line_id);
    }

    /// Rehome a mark to `(line, col)`, keeping the marks lists consistent
    pub(crate) fn mark_move(&mut self, mark_id: MarkId, line_id: LineId, col: usize) {
        let old_line = self.marks[mark_id].line;
        {
            let line = &mut self.lines[old_line];
            if let Some(pos) = line.marks.iter().position(|&id| id == mark_id) {
                line.marks.remove(pos);
            }
        }
        {
            let mark = &mut self.marks[mark_id];
            mark.line = line_id;
            mark.col = col;
        }
        self.lines[line_id].marks.push(mark_id);
    }
}
