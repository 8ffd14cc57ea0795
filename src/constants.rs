//! Global constants for linebuf

pub mod errors {
    // Error codes
    pub const LINE_NOT_FOUND: &str = "LINE_NOT_FOUND";
    pub const MARK_NOT_FOUND: &str = "MARK_NOT_FOUND";
    pub const RULE_NOT_FOUND: &str = "RULE_NOT_FOUND";
    pub const NOTHING_TO_UNDO: &str = "NOTHING_TO_UNDO";
    pub const NOTHING_TO_REDO: &str = "NOTHING_TO_REDO";
    pub const STALE_ACTION: &str = "STALE_ACTION";
    pub const PATTERN_ERROR: &str = "PATTERN_ERROR";
}

pub mod marks {
    /// First display letter handed out to a new mark
    pub const FIRST_LETTER: char = 'a';
    /// Last display letter before the counter wraps around
    pub const LAST_LETTER: char = 'z';
}
