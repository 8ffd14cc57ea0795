//! Style pairs and the rules that produce them
//!
//! A rule is either a single-line pattern, a multi-line open/close pattern
//! pair, or a span bounded by two marks. Rules are created behind `Rc` so the
//! caller keeps ownership; registering one with a buffer only clones the
//! handle, and rule identity (for removal and for open-rule bookkeeping) is
//! pointer identity.

use crate::error::Result;
use crate::mark::MarkId;
use regex::bytes::Regex;
use std::rc::Rc;

/// Foreground/background pair applied to one codepoint. Zero means unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: u16,
    pub bg: u16,
}

impl Style {
    #[must_use]
    pub fn new(fg: u16, bg: u16) -> Self {
        Self { fg, bg }
    }
}

#[derive(Debug)]
pub(crate) enum RuleKind {
    Single { re: Regex },
    Multi { re: Regex, re_end: Regex },
    Range { a: MarkId, b: MarkId },
}

/// A style rule registered with a buffer
#[derive(Debug)]
pub struct StyleRule {
    pub(crate) kind: RuleKind,
    pub(crate) style: Style,
}

impl StyleRule {
    /// Rule styling every non-overlapping match of `pattern` within a line.
    ///
    /// Fails if the pattern does not compile; no rule is created in that case.
    pub fn single(pattern: &str, style: Style) -> Result<Rc<Self>> {
        let re = Regex::new(pattern)?;
        Ok(Rc::new(Self {
            kind: RuleKind::Single { re },
            style,
        }))
    }

    /// Rule styling from a match of `start` through the next match of `end`,
    /// spanning lines until the end pattern is found.
    pub fn multi(start: &str, end: &str, style: Style) -> Result<Rc<Self>> {
        let re = Regex::new(start)?;
        let re_end = Regex::new(end)?;
        Ok(Rc::new(Self {
            kind: RuleKind::Multi { re, re_end },
            style,
        }))
    }

    /// Rule styling the span between two marks, wherever they move
    #[must_use]
    pub fn range(a: MarkId, b: MarkId, style: Style) -> Rc<Self> {
        Rc::new(Self {
            kind: RuleKind::Range { a, b },
            style,
        })
    }

    /// The style this rule paints
    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    pub(crate) fn is_single(&self) -> bool {
        matches!(self.kind, RuleKind::Single { .. })
    }

    pub(crate) fn is_range(&self) -> bool {
        matches!(self.kind, RuleKind::Range { .. })
    }
}

/// Pointer identity over optional rule references
pub(crate) fn same_rule(a: Option<&Rc<StyleRule>>, b: Option<&Rc<StyleRule>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
