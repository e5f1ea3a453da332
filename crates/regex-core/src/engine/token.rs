//! Atom tokens produced by the lexer and threaded through every later stage.

use std::rc::Rc;

/// A named character-class predicate recognized through a backslash escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shorthand {
    /// `\w`: letter, digit, or underscore.
    Alnum,
    /// `\W`: complement of `Alnum`.
    NonAlnum,
    /// `\d`: decimal digit.
    Digit,
    /// `\D`: complement of `Digit`.
    NonDigit,
    /// `\s`: whitespace.
    Whitespace,
    /// `\S`: complement of `Whitespace`.
    NonWhitespace,
}

impl Shorthand {
    /// Evaluates the predicate against a single character.
    pub fn matches(self, c: char) -> bool {
        match self {
            Shorthand::Alnum => c.is_alphanumeric() || c == '_',
            Shorthand::NonAlnum => !(c.is_alphanumeric() || c == '_'),
            Shorthand::Digit => c.is_ascii_digit(),
            Shorthand::NonDigit => !c.is_ascii_digit(),
            Shorthand::Whitespace => c.is_whitespace(),
            Shorthand::NonWhitespace => !c.is_whitespace(),
        }
    }
}

/// Inclusive character range used inside a `[...]` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRange {
    pub start: char,
    pub end: char,
}

/// A `[...]` / `[^...]` character set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    /// `false` for a negated set (`[^...]`).
    pub positive: bool,
    pub chars: Vec<char>,
    pub ranges: Vec<CharRange>,
    pub shorthands: Vec<Shorthand>,
}

impl CharSet {
    /// Evaluates set membership, honoring `positive`/negation.
    pub fn matches(&self, c: char) -> bool {
        let in_set = self.chars.contains(&c)
            || self.ranges.iter().any(|r| r.start <= c && c <= r.end)
            || self.shorthands.iter().any(|s| s.matches(c));
        in_set == self.positive
    }
}

/// Zero-width anchor / boundary kinds.
///
/// `^`/`\A` and `$`/`\z` both lower to `Start`/`End` respectively: this
/// dialect does not distinguish line anchors from text anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Start,
    End,
    WordBoundary,
    NonWordBoundary,
}

/// One token in the atom stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Literal(char),
    Shorthand(Shorthand),
    Any,
    Set(CharSet),
    Anchor(AnchorKind),
    /// `(?=X)` / `(?!X)`; `inner` is the single atom the lookahead tests.
    Lookahead { positive: bool, inner: Box<Atom> },
    Backreference(usize),
    /// `id` is a lexical group identifier, unique per `(`, used only to pair
    /// a `GroupStart` with its `GroupEnd`; it is not the capture index.
    GroupStart {
        id: u32,
        capturing: bool,
        name: Option<Rc<str>>,
    },
    GroupEnd {
        id: u32,
    },
    OpJoin,
    OpAlt,
    OpStar {
        greedy: bool,
    },
    OpPlus {
        greedy: bool,
    },
    OpOpt {
        greedy: bool,
    },
    OpRepRange {
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
}

impl Atom {
    /// True for the four quantifier variants (greediness may still be flipped
    /// by the resolver before this is consulted downstream).
    pub fn is_quantifier(&self) -> bool {
        matches!(
            self,
            Atom::OpStar { .. } | Atom::OpPlus { .. } | Atom::OpOpt { .. } | Atom::OpRepRange { .. }
        )
    }

    /// Flips the `greedy` flag in place; no-op on non-quantifier atoms.
    pub fn make_reluctant(&mut self) {
        match self {
            Atom::OpStar { greedy }
            | Atom::OpPlus { greedy }
            | Atom::OpOpt { greedy }
            | Atom::OpRepRange { greedy, .. } => *greedy = false,
            _ => {}
        }
    }
}
