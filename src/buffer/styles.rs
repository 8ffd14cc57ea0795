//! Incremental styling: reapply rules over the lines an edit touched
//!
//! Styling walks forward from the edited line. Single-line rules repaint
//! within one line; a multi-line or range rule that opens without closing
//! carries forward as the open rule, recorded in each line's `bol_rule`/
//! `eol_rule` markers. The walk stops once it has covered the edit and the
//! open-rule state entering the next line matches what was already there.
//!
//! Only one rule can be open across a given line boundary; while a rule is
//! open, other multi-line rules are not consulted.

use super::Buffer;
use crate::line::LineId;
use crate::style::{same_rule, RuleKind, Style, StyleRule};
use std::rc::Rc;

impl Buffer {
    /// Restyle a run of lines starting at `start_line`.
    ///
    /// `line_delta` is the line-count change of the triggering edit and sets
    /// the minimum number of lines to repaint before the fixed-point checks
    /// may stop the walk.
    pub(crate) fn apply_styles(&mut self, start_line: LineId, line_delta: isize) {
        let single_rules = self.single_rules.clone();
        let multi_rules = self.multi_rules.clone();

        // min_nlines: 1 when nothing moved, 1 + added lines on growth,
        // 2 on shrink (the merged-into line plus its successor)
        let min_nlines = 1 + if line_delta < 0 { 1 } else { line_delta as usize };
        let mut styled_nlines = 0usize;
        let mut open_rule: Option<Rc<StyleRule>> = None;
        let mut open_rule_ended = false;
        let mut cur = Some(start_line);

        while let Some(cur_id) = cur {
            // Resume an open rule left hanging at the previous line's end
            if open_rule.is_none() && !open_rule_ended {
                if let Some(prev_id) = self.lines[cur_id].prev {
                    if let Some(rule) = self.lines[prev_id].eol_rule.clone() {
                        open_rule = Some(rule);
                    }
                }
            }

            if self.lines[cur_id].char_count() > 0 {
                if !open_rule_ended {
                    let line = &mut self.lines[cur_id];
                    for style in &mut line.char_styles {
                        *style = Style::default();
                    }
                }

                if let Some(rule) = open_rule.clone() {
                    let already_open =
                        same_rule(self.lines[cur_id].eol_rule.as_ref(), Some(&rule));
                    self.apply_style_multi(&rule, cur_id, &mut open_rule);
                    if open_rule.is_some() {
                        if styled_nlines > min_nlines && already_open {
                            // Past the edit and the rule was already open
                            // here: downstream state cannot have changed
                            break;
                        }
                    } else {
                        // The rule closed on this line; restyle the same line
                        // again as if nothing was open
                        open_rule_ended = true;
                        continue;
                    }
                } else {
                    for rule in &single_rules {
                        self.apply_style_single(rule, cur_id);
                    }

                    {
                        let line = &mut self.lines[cur_id];
                        if !open_rule_ended {
                            line.bol_rule = None;
                        }
                        line.eol_rule = None;
                    }
                    for rule in &multi_rules {
                        self.apply_style_multi(rule, cur_id, &mut open_rule);
                        if open_rule.is_some() {
                            // TODO support multiple open rules on one line
                            break;
                        }
                    }
                }
            } else {
                // Empty lines carry the open rule straight through
                let line = &mut self.lines[cur_id];
                line.bol_rule = open_rule.clone();
                line.eol_rule = open_rule.clone();
            }

            styled_nlines += 1;

            let next = self.lines[cur_id].next;
            let next_bol_set = next.map_or(false, |id| self.lines[id].bol_rule.is_some());
            if open_rule.is_none() && !next_bol_set && styled_nlines > min_nlines {
                break;
            }

            open_rule_ended = false;
            cur = next;
        }

        log::trace!("styled {} lines", styled_nlines);
    }

    /// Paint every non-overlapping match of a single-line rule
    fn apply_style_single(&mut self, rule: &Rc<StyleRule>, line_id: LineId) {
        let re = match &rule.kind {
            RuleKind::Single { re } => re,
            _ => return,
        };
        let line = &mut self.lines[line_id];
        let mut look_col = 0;
        while look_col < line.char_count() {
            let look_index = line.col_to_index(look_col);
            let found = match re.find_at(&line.data, look_index) {
                Some(found) => found,
                None => break,
            };
            let start = line.index_to_col(found.start());
            let stop = line.index_to_col(found.end());
            for style in &mut line.char_styles[start..stop] {
                *style = rule.style;
            }
            // A zero-width match must not stall the scan
            look_col = if stop > look_col { stop } else { look_col + 1 };
        }
    }

    /// Apply a multi-line or range rule to one line.
    ///
    /// With no rule open, scans for start/end span pairs; with `open_rule`
    /// set, styles from the line start through the rule's end (or to the end
    /// of the line, leaving the rule open). `open_rule` is updated to the
    /// state crossing this line's end.
    fn apply_style_multi(
        &mut self,
        rule: &Rc<StyleRule>,
        line_id: LineId,
        open_rule: &mut Option<Rc<StyleRule>>,
    ) {
        let char_count = self.lines[line_id].char_count();
        let mut look_col = 0;
        loop {
            let entry_col = look_col;
            let mut found_start = false;
            let mut found_end = false;
            let start;
            let mut end = 0;

            if open_rule.is_none() {
                match self.multi_find(rule, false, line_id, look_col) {
                    Some((match_start, match_stop)) => {
                        found_start = true;
                        start = match_start;
                        look_col = match_stop;
                        if look_col < char_count {
                            if let Some(end_stop) = self.multi_find_end(rule, line_id, look_col) {
                                found_end = true;
                                end = end_stop;
                                look_col = end_stop;
                            }
                        }
                    }
                    None => return, // no match; bail
                }
            } else {
                start = 0;
                self.lines[line_id].bol_rule = Some(Rc::clone(rule));
                if let Some(end_stop) = self.multi_find_end(rule, line_id, look_col) {
                    found_end = true;
                    end = end_stop;
                }
            }

            if !found_end {
                // Style to end of line and leave the rule open
                end = char_count;
                self.lines[line_id].eol_rule = Some(Rc::clone(rule));
                *open_rule = Some(Rc::clone(rule));
            } else if open_rule.is_some() {
                *open_rule = None;
            }

            let line = &mut self.lines[line_id];
            for style in &mut line.char_styles[start..end] {
                *style = rule.style;
            }

            // Range rules can only match once per line
            if rule.is_range() {
                break;
            }
            if !(found_start && found_end && look_col < char_count) {
                break;
            }
            if look_col <= entry_col {
                // Zero-width span; force progress
                look_col = entry_col + 1;
                if look_col >= char_count {
                    break;
                }
            }
        }
    }

    /// Locate a rule's start (or end) on a line at or beyond a column.
    ///
    /// For pattern rules this is a regex search over the line's bytes; for
    /// range rules it is whichever of the two marks bounds the span on the
    /// requested side. Returns `(match_start_col, match_stop_col)`.
    fn multi_find(
        &self,
        rule: &StyleRule,
        find_end: bool,
        line_id: LineId,
        start_col: usize,
    ) -> Option<(usize, usize)> {
        match &rule.kind {
            RuleKind::Range { a, b } => {
                let mark_id = if self.mark_is_gt(*a, *b) {
                    if find_end {
                        *a
                    } else {
                        *b
                    }
                } else if find_end {
                    *b
                } else {
                    *a
                };
                let mark = self.marks.get(mark_id)?;
                if mark.line == line_id && mark.col >= start_col {
                    Some((mark.col, mark.col))
                } else {
                    None
                }
            }
            RuleKind::Multi { re, re_end } => {
                let re = if find_end { re_end } else { re };
                let line = &self.lines[line_id];
                let start_index = line.col_to_index(start_col);
                re.find_at(&line.data, start_index)
                    .map(|found| (line.index_to_col(found.start()), line.index_to_col(found.end())))
            }
            RuleKind::Single { .. } => None,
        }
    }

    fn multi_find_end(&self, rule: &StyleRule, line_id: LineId, start_col: usize) -> Option<usize> {
        self.multi_find(rule, true, line_id, start_col)
            .map(|(_, stop)| stop)
    }
}
