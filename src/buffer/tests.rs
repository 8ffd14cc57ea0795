//! Tests for the buffer: edits, offset mapping, marks, styling, and undo

use super::Buffer;
use crate::style::{Style, StyleRule};

fn buffer_with(content: &str) -> Buffer {
    let mut buf = Buffer::new();
    buf.set(content.as_bytes()).unwrap();
    buf
}

fn content_string(buf: &Buffer) -> String {
    String::from_utf8(buf.content().to_vec()).unwrap()
}

fn line_styles(buf: &Buffer, line_index: usize) -> Vec<Style> {
    let line_id = buf.line(line_index).unwrap();
    buf.line_ref(line_id).unwrap().styles().to_vec()
}

/// Walk the whole line graph and assert the aggregate invariants
fn check_invariants(buf: &Buffer) {
    let mut byte_sum = 0;
    let mut char_sum = 0;
    let mut visited = 0;
    let mut cur = Some(buf.first_line());
    while let Some(line_id) = cur {
        let line = buf.line_ref(line_id).unwrap();
        assert_eq!(line.line_index(), visited, "line indexes must be contiguous");
        byte_sum += line.data().len();
        char_sum += line.char_count();
        for &mark_id in line.marks() {
            let (mark_line, mark_col) = buf.mark_position(mark_id).unwrap();
            assert_eq!(mark_line, line_id, "mark must point at its owning line");
            assert!(mark_col <= line.char_count(), "mark col out of range");
        }
        visited += 1;
        if line.next().is_none() {
            assert_eq!(line_id, buf.last_line());
        }
        cur = line.next();
    }
    assert_eq!(visited, buf.line_count());
    assert_eq!(buf.byte_count(), byte_sum);
    assert_eq!(buf.char_count(), char_sum + buf.line_count() - 1);
}

#[test]
fn test_new_buffer() {
    let buf = Buffer::new();
    assert_eq!(buf.line_count(), 1);
    assert_eq!(buf.byte_count(), 0);
    assert_eq!(buf.char_count(), 0);
    assert_eq!(&*buf.content(), b"");
    check_invariants(&buf);
}

#[test]
fn test_insert_returns_char_count() {
    let mut buf = Buffer::new();
    assert_eq!(buf.insert(0, "h\u{e9}llo".as_bytes()).unwrap(), 5);
    assert_eq!(buf.byte_count(), 6);
    assert_eq!(buf.char_count(), 5);
}

#[test]
fn test_insert_empty_is_noop() {
    let mut buf = buffer_with("abc");
    assert_eq!(buf.insert(1, b"").unwrap(), 0);
    assert_eq!(content_string(&buf), "abc");
}

#[test]
fn test_insert_with_newlines() {
    let mut buf = Buffer::new();
    assert_eq!(buf.insert(0, b"one\ntwo\nthree").unwrap(), 13);
    assert_eq!(buf.line_count(), 3);
    assert_eq!(content_string(&buf), "one\ntwo\nthree");
    check_invariants(&buf);
}

#[test]
fn test_insert_past_end_clamps() {
    let mut buf = buffer_with("ab");
    buf.insert(99, b"c").unwrap();
    assert_eq!(content_string(&buf), "abc");
}

#[test]
fn test_set_get_roundtrip() {
    let mut buf = Buffer::new();
    for content in ["", "plain", "a\nb\nc", "trailing\n", "\n\n\n", "uni\u{e9}\u{1f600}de"] {
        buf.set(content.as_bytes()).unwrap();
        assert_eq!(content_string(&buf), *content);
        check_invariants(&buf);
    }
}

#[test]
fn test_replace_chain() {
    let mut buf = buffer_with("lineA\n\nline2\nline3\n");

    buf.replace(0, 0, b"b").unwrap();
    assert_eq!(content_string(&buf), "blineA\n\nline2\nline3\n");

    buf.replace(3, 3, b"xe0").unwrap();
    assert_eq!(content_string(&buf), "blixe0\n\nline2\nline3\n");

    buf.replace(10, 7, b"N").unwrap();
    assert_eq!(content_string(&buf), "blixe0\n\nliNe3\n");

    buf.replace(5, 4, b"jerk\nstuff").unwrap();
    assert_eq!(content_string(&buf), "blixejerk\nstuffiNe3\n");

    buf.replace(9, 99, b"X").unwrap();
    assert_eq!(content_string(&buf), "blixejerkX");

    buf.replace(5, 0, b"y\nb").unwrap();
    assert_eq!(content_string(&buf), "blixey\nbjerkX");

    buf.replace(0, 0, b"\n").unwrap();
    assert_eq!(content_string(&buf), "\nblixey\nbjerkX");

    buf.replace(6, 3, b"").unwrap();
    assert_eq!(content_string(&buf), "\nblixejerkX");

    buf.replace(0, 11, b"1\n2\n3\n4\n").unwrap();
    assert_eq!(content_string(&buf), "1\n2\n3\n4\n");

    buf.replace(2, 6, b"five\nsix\nseven\neight\nnine").unwrap();
    assert_eq!(content_string(&buf), "1\nfive\nsix\nseven\neight\nnine");

    check_invariants(&buf);
}

#[test]
fn test_line_col_at() {
    let buf = buffer_with("hello\nworld");
    let line0 = buf.line(0).unwrap();
    let line1 = buf.line(1).unwrap();

    assert_eq!(buf.line_col_at(0), (line0, 0));
    assert_eq!(buf.line_col_at(1), (line0, 1));
    assert_eq!(buf.line_col_at(5), (line0, 5));
    assert_eq!(buf.line_col_at(6), (line1, 0));
    assert_eq!(buf.line_col_at(99), (line1, 5));
}

#[test]
fn test_offset_roundtrip() {
    let buf = buffer_with("hello\nworld");
    for offset in 0..=buf.char_count() {
        let (line_id, col) = buf.line_col_at(offset);
        assert_eq!(buf.offset_of(line_id, col).unwrap(), offset);
    }
}

#[test]
fn test_offset_of_clamps() {
    let buf = buffer_with("hello\nworld");
    let line1 = buf.line(1).unwrap();
    assert_eq!(buf.offset_of(line1, 99).unwrap(), buf.char_count());
}

#[test]
fn test_line_lookup_out_of_range() {
    let buf = buffer_with("hello\nworld");
    assert!(buf.line(2).is_err());
}

#[test]
fn test_substr() {
    let buf = buffer_with("hello\nworld");
    let line0 = buf.line(0).unwrap();
    let line1 = buf.line(1).unwrap();

    let (bytes, nchars) = buf.substr(line0, 1, line1, 2).unwrap();
    assert_eq!(bytes, b"ello\nwo");
    assert_eq!(nchars, 7);

    let (bytes, nchars) = buf.substr(line0, 2, line0, 4).unwrap();
    assert_eq!(bytes, b"ll");
    assert_eq!(nchars, 2);

    // Reversed columns on one line yield an empty span
    let (bytes, nchars) = buf.substr(line0, 4, line0, 2).unwrap();
    assert_eq!(bytes, b"");
    assert_eq!(nchars, 0);
}

#[test]
fn test_delete_out_of_range_is_noop() {
    let mut buf = buffer_with("abc");
    buf.delete(3, 5).unwrap();
    assert_eq!(content_string(&buf), "abc");
    buf.delete(2, 0).unwrap();
    assert_eq!(content_string(&buf), "abc");
}

#[test]
fn test_counts_across_edit_sequence() {
    let mut buf = Buffer::new();
    buf.insert(0, b"alpha\nbeta\ngamma").unwrap();
    check_invariants(&buf);
    buf.delete(3, 7).unwrap();
    check_invariants(&buf);
    buf.replace(2, 2, b"X\nY\nZ").unwrap();
    check_invariants(&buf);
    buf.set(b"reset").unwrap();
    check_invariants(&buf);
}

// --- marks -----------------------------------------------------------------

#[test]
fn test_mark_defaults_to_buffer_start() {
    let mut buf = buffer_with("hello");
    let mark = buf.add_mark(None, 7);
    assert_eq!(buf.mark_position(mark).unwrap(), (buf.first_line(), 0));
}

#[test]
fn test_mark_advances_on_insert_before() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 2);
    buf.insert(0, b"ab").unwrap();
    assert_eq!(buf.mark_position(mark).unwrap(), (line0, 4));
}

#[test]
fn test_mark_at_insert_point_advances() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 2);
    buf.insert(2, b"xy").unwrap();
    assert_eq!(buf.mark_position(mark).unwrap(), (line0, 4));
}

#[test]
fn test_mark_stays_on_insert_after() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 2);
    buf.insert(4, b"xy").unwrap();
    assert_eq!(buf.mark_position(mark).unwrap(), (line0, 2));
}

#[test]
fn test_mark_retracts_on_delete_before() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 4);
    buf.delete(1, 2).unwrap();
    assert_eq!(buf.mark_position(mark).unwrap(), (line0, 2));
}

#[test]
fn test_mark_at_delete_point_stays() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 1);
    buf.delete(1, 2).unwrap();
    assert_eq!(buf.mark_position(mark).unwrap(), (line0, 1));
}

#[test]
fn test_mark_migrates_on_line_break() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 3);
    buf.insert(1, b"X\nY").unwrap();
    assert_eq!(content_string(&buf), "hX\nYello");
    let line1 = buf.line(1).unwrap();
    // Still on the second 'l' it was created on
    assert_eq!(buf.mark_position(mark).unwrap(), (line1, 3));
    check_invariants(&buf);
}

#[test]
fn test_mark_relocates_on_multiline_delete() {
    let mut buf = buffer_with("abc\ndef");
    let line0 = buf.line(0).unwrap();
    let line1 = buf.line(1).unwrap();
    let mark = buf.add_mark(Some(line1), 2);
    buf.delete(2, 3).unwrap();
    assert_eq!(content_string(&buf), "abef");
    // Relocated to the survivor at its pre-merge char count plus the old col
    assert_eq!(buf.mark_position(mark).unwrap(), (line0, 4));
    check_invariants(&buf);
}

#[test]
fn test_mark_letters_cycle() {
    let mut buf = buffer_with("x");
    let first = buf.add_mark(None, 0);
    assert_eq!(buf.mark_letter(first).unwrap(), 'a');
    for _ in 0..25 {
        buf.add_mark(None, 0);
    }
    let wrapped = buf.add_mark(None, 0);
    assert_eq!(buf.mark_letter(wrapped).unwrap(), 'a');
}

#[test]
fn test_remove_mark() {
    let mut buf = buffer_with("hello");
    let line0 = buf.line(0).unwrap();
    let mark = buf.add_mark(Some(line0), 2);
    buf.remove_mark(mark).unwrap();
    assert!(buf.mark_position(mark).is_none());
    assert!(buf.line_ref(line0).unwrap().marks().is_empty());
    assert!(buf.remove_mark(mark).is_err());
}

// --- undo / redo -----------------------------------------------------------

#[test]
fn test_undo_redo_roundtrip() {
    let mut buf = Buffer::new();
    buf.insert(0, b"hello\nworld").unwrap();
    buf.replace(5, 1, b" ").unwrap();
    buf.delete(0, 6).unwrap();
    assert_eq!(content_string(&buf), "world");

    // replace records two actions, so four undos rewind everything
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "hello world");
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "helloworld");
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "hello\nworld");
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "");
    assert!(buf.undo().is_err());

    buf.redo().unwrap();
    buf.redo().unwrap();
    buf.redo().unwrap();
    buf.redo().unwrap();
    assert_eq!(content_string(&buf), "world");
    assert!(buf.redo().is_err());
    check_invariants(&buf);
}

#[test]
fn test_undo_empty_log() {
    let mut buf = Buffer::new();
    assert!(buf.undo().is_err());
}

#[test]
fn test_redo_without_undo() {
    let mut buf = buffer_with("abc");
    assert!(buf.redo().is_err());
}

#[test]
fn test_undo_restores_multiline_delete() {
    let mut buf = buffer_with("lineA\n\nline2\nline3\n");
    buf.delete(0, 13).unwrap();
    assert_eq!(content_string(&buf), "line3\n");
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "lineA\n\nline2\nline3\n");
    buf.redo().unwrap();
    assert_eq!(content_string(&buf), "line3\n");
    check_invariants(&buf);
}

#[test]
fn test_new_edit_truncates_redo_tail() {
    let mut buf = Buffer::new();
    buf.insert(0, b"abc").unwrap();
    buf.insert(3, b"def").unwrap();
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "abc");

    buf.insert(3, b"xyz").unwrap();
    assert_eq!(content_string(&buf), "abcxyz");
    // The undone tail is gone
    assert!(buf.redo().is_err());

    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "abc");
    buf.undo().unwrap();
    assert_eq!(content_string(&buf), "");
    assert!(buf.undo().is_err());
}

// --- styling ---------------------------------------------------------------

#[test]
fn test_single_rule_styles_matching_line() {
    let mut buf = buffer_with("hello\nworld");
    let rule = StyleRule::single("world", Style::new(1, 2)).unwrap();
    buf.add_rule(rule);

    for style in line_styles(&buf, 0) {
        assert_eq!(style, Style::new(0, 0));
    }
    for style in line_styles(&buf, 1) {
        assert_eq!(style, Style::new(1, 2));
    }
}

#[test]
fn test_single_rule_repeats_within_line() {
    let mut buf = buffer_with("aa bb aa");
    let rule = StyleRule::single("aa", Style::new(1, 0)).unwrap();
    buf.add_rule(rule);
    let styles = line_styles(&buf, 0);
    for (col, style) in styles.iter().enumerate() {
        let expected = if col <= 1 || col >= 6 { 1 } else { 0 };
        assert_eq!(style.fg, expected, "col {}", col);
    }
}

#[test]
fn test_multi_rule_spans_lines() {
    let mut buf = buffer_with("hello\nworld");
    let single = StyleRule::single("world", Style::new(1, 2)).unwrap();
    buf.add_rule(single.clone());
    buf.remove_rule(&single).unwrap();

    let multi = StyleRule::multi("lo", "wo", Style::new(3, 4)).unwrap();
    buf.add_rule(multi);

    let styles0 = line_styles(&buf, 0);
    for (col, style) in styles0.iter().enumerate() {
        let expected = if col == 3 || col == 4 { Style::new(3, 4) } else { Style::new(0, 0) };
        assert_eq!(*style, expected, "line 0 col {}", col);
    }
    let styles1 = line_styles(&buf, 1);
    for (col, style) in styles1.iter().enumerate() {
        let expected = if col == 0 || col == 1 { Style::new(3, 4) } else { Style::new(0, 0) };
        assert_eq!(*style, expected, "line 1 col {}", col);
    }
}

#[test]
fn test_multi_rule_crosses_empty_lines() {
    let mut buf = buffer_with("a/*\n\nx\n*/b");
    let rule = StyleRule::multi(r"/\*", r"\*/", Style::new(7, 0)).unwrap();
    buf.add_rule(rule);

    assert_eq!(line_styles(&buf, 0), vec![Style::new(0, 0), Style::new(7, 0), Style::new(7, 0)]);
    assert!(line_styles(&buf, 1).is_empty());
    assert_eq!(line_styles(&buf, 2), vec![Style::new(7, 0)]);
    assert_eq!(
        line_styles(&buf, 3),
        vec![Style::new(7, 0), Style::new(7, 0), Style::new(0, 0)]
    );
}

#[test]
fn test_multi_rule_follows_edits() {
    let mut buf = buffer_with("a/*\n\nx\n*/b");
    let rule = StyleRule::multi(r"/\*", r"\*/", Style::new(7, 0)).unwrap();
    buf.add_rule(rule);

    // Grow the commented region; the new lines must pick the style up
    buf.insert(4, b"yy\nzz").unwrap();
    assert_eq!(content_string(&buf), "a/*\nyy\nzz\nx\n*/b");
    assert_eq!(line_styles(&buf, 1), vec![Style::new(7, 0); 2]);
    assert_eq!(line_styles(&buf, 2), vec![Style::new(7, 0); 2]);
    assert_eq!(line_styles(&buf, 3), vec![Style::new(7, 0)]);

    // Close the comment early; downstream styling must unwind
    buf.insert(3, b"*/").unwrap();
    assert_eq!(content_string(&buf), "a/**/\nyy\nzz\nx\n*/b");
    assert_eq!(line_styles(&buf, 1), vec![Style::new(0, 0); 2]);
    assert_eq!(line_styles(&buf, 2), vec![Style::new(0, 0); 2]);
    assert_eq!(line_styles(&buf, 3), vec![Style::new(0, 0)]);
}

#[test]
fn test_range_rule_styles_between_marks() {
    let mut buf = buffer_with("hello\nworld");
    let line0 = buf.line(0).unwrap();
    let line1 = buf.line(1).unwrap();
    let mark_a = buf.add_mark(Some(line0), 1);
    let mark_b = buf.add_mark(Some(line1), 2);
    let rule = StyleRule::range(mark_a, mark_b, Style::new(5, 6));
    buf.add_rule(rule);

    let styles0 = line_styles(&buf, 0);
    for (col, style) in styles0.iter().enumerate() {
        let expected = if col >= 1 { 5 } else { 0 };
        assert_eq!(style.fg, expected, "line 0 col {}", col);
    }
    let styles1 = line_styles(&buf, 1);
    for (col, style) in styles1.iter().enumerate() {
        let expected = if col < 2 { 5 } else { 0 };
        assert_eq!(style.fg, expected, "line 1 col {}", col);
    }
}

#[test]
fn test_remove_rule_reflows() {
    let mut buf = buffer_with("hello\nworld");
    let rule = StyleRule::single("world", Style::new(1, 2)).unwrap();
    buf.add_rule(rule.clone());
    assert_eq!(line_styles(&buf, 1)[0], Style::new(1, 2));

    buf.remove_rule(&rule).unwrap();
    for style in line_styles(&buf, 1) {
        assert_eq!(style, Style::new(0, 0));
    }
    // A rule can only be removed once
    assert!(buf.remove_rule(&rule).is_err());
}

#[test]
fn test_styling_is_deterministic() {
    // Same rules over same content must style identically regardless of how
    // the content was produced
    let mut via_set = buffer_with("fn main() {\n    let x = 1;\n}");
    let mut via_edits = Buffer::new();
    via_edits.insert(0, b"fn () {\n}").unwrap();
    via_edits.insert(3, b"main").unwrap();
    via_edits.insert(11, b"\n    let x = 1;").unwrap();
    assert_eq!(content_string(&via_set), content_string(&via_edits));

    let pattern = r"let|fn";
    via_set.add_rule(StyleRule::single(pattern, Style::new(2, 0)).unwrap());
    via_edits.add_rule(StyleRule::single(pattern, Style::new(2, 0)).unwrap());

    for line_index in 0..via_set.line_count() {
        assert_eq!(
            line_styles(&via_set, line_index),
            line_styles(&via_edits, line_index),
            "line {}",
            line_index
        );
    }
}

// --- listeners -------------------------------------------------------------

#[test]
fn test_listener_registration() {
    let mut buf = Buffer::new();
    assert_eq!(buf.listener_count(), 0);
    buf.add_listener(Box::new(|_event| {}));
    assert_eq!(buf.listener_count(), 1);
}
