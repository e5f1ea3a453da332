//! Turns a pattern string into a flat stream of [`Atom`] tokens.
//!
//! The lexer owns every syntactic check: balanced brackets/parens, a
//! well-formed `{m,n}`, a resolvable `(?...)` tag, and quantifiers that have
//! something to apply to. Anything past this point (greediness resolution,
//! concatenation, grouping, the postfix conversion, the NFA build) operates
//! on an already-valid atom stream.

use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use thiserror::Error;

use crate::engine::token::{AnchorKind, Atom, CharRange, CharSet, Shorthand};

/// Errors recognized while lexing a pattern.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("ParseError: unexpected end of pattern")]
    UnexpectedEnd,
    #[error("ParseError: unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("ParseError: no right parenthesis")]
    MissingParenthesis,
    #[error("ParseError: no left parenthesis for ')' at position {0}")]
    UnmatchedRightParen(usize),
    #[error("ParseError: no previous expression at position {0}")]
    NoPreviousExpression(usize),
    #[error("ParseError: trailing backslash")]
    TrailingBackslash,
    #[error("ParseError: missing closing bracket ']'")]
    MissingBracket,
    #[error("ParseError: empty character class")]
    EmptyCharClass,
    #[error("ParseError: invalid repeat size {{{0},{1}}}: min greater than max")]
    InvalidRepeatSize(u32, u32),
    #[error("ParseError: missing repeat argument in '{{}}'")]
    MissingRepeatArgument,
    #[error("ParseError: unterminated group tag at position {0}")]
    UnterminatedGroupTag(usize),
    #[error("ParseError: unsupported group tag '(?{0}' at position {1}")]
    UnsupportedGroupTag(char, usize),
    #[error("ParseError: lookahead body must be a single atom at position {0}")]
    InvalidLookaheadBody(usize),
}

/// Lexes `pattern` into a flat, already-validated atom stream.
pub fn lex(pattern: &str) -> Result<Vec<Atom>, ParseError> {
    let mut lexer = Lexer::new(pattern);
    lexer.run()
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    next_group_id: u32,
    open_groups: Vec<u32>,
    /// True once an atom has been emitted that a following quantifier could
    /// legally apply to; reset at the start of input, right after `(`, and
    /// right after `|`.
    has_operand: bool,
}

impl<'a> Lexer<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            chars: pattern.chars().peekable(),
            pos: 0,
            next_group_id: 0,
            open_groups: Vec::new(),
            has_operand: false,
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn run(&mut self) -> Result<Vec<Atom>, ParseError> {
        let mut atoms = Vec::new();

        while let Some(c) = self.next() {
            let atom = match c {
                '(' => self.lex_group_tag()?,
                ')' => {
                    let id = self
                        .open_groups
                        .pop()
                        .ok_or(ParseError::UnmatchedRightParen(self.pos))?;
                    self.has_operand = true;
                    atoms.push(Atom::GroupEnd { id });
                    continue;
                }
                '[' => self.lex_set()?,
                '{' => self.lex_rep_range()?,
                '\\' => self.lex_escape()?,
                '.' => Atom::Any,
                '^' => Atom::Anchor(AnchorKind::Start),
                '$' => Atom::Anchor(AnchorKind::End),
                '|' => {
                    self.has_operand = false;
                    atoms.push(Atom::OpAlt);
                    continue;
                }
                '*' => self.lex_quantifier(Atom::OpStar { greedy: true })?,
                '+' => self.lex_quantifier(Atom::OpPlus { greedy: true })?,
                '?' => self.lex_quantifier(Atom::OpOpt { greedy: true })?,
                other => Atom::Literal(other),
            };
            self.has_operand = true;
            atoms.push(atom);
        }

        if let Some(_unclosed) = self.open_groups.last() {
            return Err(ParseError::MissingParenthesis);
        }

        Ok(atoms)
    }

    /// Emits a quantifier atom, checked against `has_operand`. A directly
    /// following bare `?` is left for the greediness resolver to fold in.
    fn lex_quantifier(&mut self, atom: Atom) -> Result<Atom, ParseError> {
        if !self.has_operand {
            return Err(ParseError::NoPreviousExpression(self.pos));
        }
        Ok(atom)
    }

    fn lex_group_tag(&mut self) -> Result<Atom, ParseError> {
        let start_pos = self.pos;
        self.has_operand = false;

        if self.peek() != Some('?') {
            let id = self.next_group_id;
            self.next_group_id += 1;
            self.open_groups.push(id);
            return Ok(Atom::GroupStart {
                id,
                capturing: true,
                name: None,
            });
        }
        self.next(); // consume '?'

        match self.peek() {
            Some(':') => {
                self.next();
                let id = self.next_group_id;
                self.next_group_id += 1;
                self.open_groups.push(id);
                Ok(Atom::GroupStart {
                    id,
                    capturing: false,
                    name: None,
                })
            }
            Some('P') => {
                self.next();
                if self.next() != Some('<') {
                    return Err(ParseError::UnterminatedGroupTag(start_pos));
                }
                let mut name = String::new();
                loop {
                    match self.next() {
                        Some('>') => break,
                        Some(c) => name.push(c),
                        None => return Err(ParseError::UnterminatedGroupTag(start_pos)),
                    }
                }
                let id = self.next_group_id;
                self.next_group_id += 1;
                self.open_groups.push(id);
                Ok(Atom::GroupStart {
                    id,
                    capturing: true,
                    name: Some(Rc::from(name.as_str())),
                })
            }
            Some(sign @ ('=' | '!')) => {
                self.next();
                let inner = self.lex_lookahead_atom(start_pos)?;
                if self.next() != Some(')') {
                    return Err(ParseError::UnterminatedGroupTag(start_pos));
                }
                self.has_operand = true;
                Ok(Atom::Lookahead {
                    positive: sign == '=',
                    inner: Box::new(inner),
                })
            }
            Some(other) => Err(ParseError::UnsupportedGroupTag(other, start_pos)),
            None => Err(ParseError::UnterminatedGroupTag(start_pos)),
        }
    }

    /// The single atom a lookahead body may test: a literal, an escape, a
    /// set, or `.`; not a nested group, alternation, or quantifier.
    fn lex_lookahead_atom(&mut self, start_pos: usize) -> Result<Atom, ParseError> {
        match self.next() {
            Some('\\') => self.lex_escape(),
            Some('[') => self.lex_set(),
            Some('.') => Ok(Atom::Any),
            Some(c) if !"()|*+?{}".contains(c) => Ok(Atom::Literal(c)),
            _ => Err(ParseError::InvalidLookaheadBody(start_pos)),
        }
    }

    fn lex_escape(&mut self) -> Result<Atom, ParseError> {
        let c = self.next().ok_or(ParseError::TrailingBackslash)?;
        let atom = match c {
            'w' => Atom::Shorthand(Shorthand::Alnum),
            'W' => Atom::Shorthand(Shorthand::NonAlnum),
            'd' => Atom::Shorthand(Shorthand::Digit),
            'D' => Atom::Shorthand(Shorthand::NonDigit),
            's' => Atom::Shorthand(Shorthand::Whitespace),
            'S' => Atom::Shorthand(Shorthand::NonWhitespace),
            'b' => Atom::Anchor(AnchorKind::WordBoundary),
            'B' => Atom::Anchor(AnchorKind::NonWordBoundary),
            'A' => Atom::Anchor(AnchorKind::Start),
            'z' => Atom::Anchor(AnchorKind::End),
            '1'..='9' => {
                let mut digits = String::from(c);
                while let Some(d) = self.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        self.next();
                    } else {
                        break;
                    }
                }
                let index: usize = digits.parse().unwrap_or(0);
                Atom::Backreference(index)
            }
            other => Atom::Literal(other),
        };
        Ok(atom)
    }

    fn lex_set(&mut self) -> Result<Atom, ParseError> {
        let positive = if self.peek() == Some('^') {
            self.next();
            false
        } else {
            true
        };

        let mut chars = Vec::new();
        let mut ranges = Vec::new();
        let mut shorthands = Vec::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::MissingBracket),
                Some(']') => {
                    if chars.is_empty() && ranges.is_empty() && shorthands.is_empty() {
                        return Err(ParseError::EmptyCharClass);
                    }
                    self.next();
                    break;
                }
                _ => {}
            }

            let lo = self.lex_set_member(&mut shorthands)?;
            let Some(lo) = lo else {
                continue;
            };

            if self.peek() == Some('-') {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                if lookahead.peek() == Some(&']') {
                    chars.push(lo);
                } else {
                    self.next(); // consume '-'
                    match self.lex_set_member(&mut shorthands)? {
                        Some(hi) => {
                            if hi < lo {
                                ranges.push(CharRange { start: hi, end: lo });
                            } else {
                                ranges.push(CharRange { start: lo, end: hi });
                            }
                        }
                        None => chars.push(lo),
                    }
                }
            } else {
                chars.push(lo);
            }
        }

        Ok(Atom::Set(CharSet {
            positive,
            chars,
            ranges,
            shorthands,
        }))
    }

    /// Reads one character-class member: a literal char, or (if escaped and
    /// a shorthand class) `None` after pushing the shorthand into `out`.
    fn lex_set_member(&mut self, out: &mut Vec<Shorthand>) -> Result<Option<char>, ParseError> {
        let c = self.next().ok_or(ParseError::MissingBracket)?;
        if c != '\\' {
            return Ok(Some(c));
        }
        let esc = self.next().ok_or(ParseError::TrailingBackslash)?;
        let shorthand = match esc {
            'w' => Some(Shorthand::Alnum),
            'W' => Some(Shorthand::NonAlnum),
            'd' => Some(Shorthand::Digit),
            'D' => Some(Shorthand::NonDigit),
            's' => Some(Shorthand::Whitespace),
            'S' => Some(Shorthand::NonWhitespace),
            _ => None,
        };
        match shorthand {
            Some(s) => {
                out.push(s);
                Ok(None)
            }
            None => Ok(Some(esc)),
        }
    }

    fn lex_rep_range(&mut self) -> Result<Atom, ParseError> {
        if !self.has_operand {
            return Err(ParseError::NoPreviousExpression(self.pos));
        }

        let min_digits = self.read_digits();
        let has_comma = self.peek() == Some(',');
        if has_comma {
            self.next();
        }
        let max_digits = self.read_digits();

        if self.next() != Some('}') {
            return Err(ParseError::MissingRepeatArgument);
        }

        if min_digits.is_empty() && max_digits.is_empty() {
            return Err(ParseError::MissingRepeatArgument);
        }

        let min: u32 = if min_digits.is_empty() {
            0
        } else {
            min_digits.parse().map_err(|_| ParseError::MissingRepeatArgument)?
        };
        let max: Option<u32> = if !has_comma {
            Some(min)
        } else if max_digits.is_empty() {
            None
        } else {
            Some(
                max_digits
                    .parse()
                    .map_err(|_| ParseError::MissingRepeatArgument)?,
            )
        };

        if let Some(max) = max {
            if min > max {
                return Err(ParseError::InvalidRepeatSize(min, max));
            }
        }

        Ok(Atom::OpRepRange {
            min,
            max,
            greedy: true,
        })
    }

    fn read_digits(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.next();
            } else {
                break;
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_literal_concat_and_alt() {
        let atoms = lex("ab|c").unwrap();
        assert_eq!(
            atoms,
            vec![
                Atom::Literal('a'),
                Atom::Literal('b'),
                Atom::OpAlt,
                Atom::Literal('c'),
            ]
        );
    }

    #[test]
    fn test_lex_quantifier_then_bare_question_mark_is_left_unfused() {
        // Greediness fusion is the next stage's job; the lexer just emits tokens.
        let atoms = lex("a*?").unwrap();
        assert_eq!(
            atoms,
            vec![
                Atom::Literal('a'),
                Atom::OpStar { greedy: true },
                Atom::OpOpt { greedy: true },
            ]
        );
    }

    #[test]
    fn test_lex_no_previous_expression() {
        assert_eq!(lex("*"), Err(ParseError::NoPreviousExpression(1)));
        assert_eq!(lex("+"), Err(ParseError::NoPreviousExpression(1)));
    }

    #[test]
    fn test_lex_unbalanced_parens() {
        assert_eq!(lex("("), Err(ParseError::MissingParenthesis));
        assert_eq!(lex(")"), Err(ParseError::UnmatchedRightParen(1)));
    }

    #[test]
    fn test_lex_named_group() {
        let atoms = lex("(?P<year>\\d)").unwrap();
        assert_eq!(
            atoms[0],
            Atom::GroupStart {
                id: 0,
                capturing: true,
                name: Some(Rc::from("year")),
            }
        );
    }

    #[test]
    fn test_lex_non_capturing_group() {
        let atoms = lex("(?:ab)").unwrap();
        assert_eq!(
            atoms[0],
            Atom::GroupStart {
                id: 0,
                capturing: false,
                name: None,
            }
        );
    }

    #[test]
    fn test_lex_lookahead() {
        let atoms = lex("a(?=b)").unwrap();
        assert_eq!(
            atoms[1],
            Atom::Lookahead {
                positive: true,
                inner: Box::new(Atom::Literal('b')),
            }
        );
    }

    #[test]
    fn test_lex_set_with_range_and_shorthand() {
        let atoms = lex("[a-z\\d_]").unwrap();
        match &atoms[0] {
            Atom::Set(set) => {
                assert!(set.positive);
                assert_eq!(set.ranges, vec![CharRange { start: 'a', end: 'z' }]);
                assert_eq!(set.shorthands, vec![Shorthand::Digit]);
                assert!(set.chars.contains(&'_'));
            }
            _ => panic!("expected Set atom"),
        }
    }

    #[test]
    fn test_lex_negated_set() {
        let atoms = lex("[^io]").unwrap();
        match &atoms[0] {
            Atom::Set(set) => assert!(!set.positive),
            _ => panic!("expected Set atom"),
        }
    }

    #[test]
    fn test_lex_empty_set_is_error() {
        assert_eq!(lex("[]"), Err(ParseError::EmptyCharClass));
        assert_eq!(lex("[^]"), Err(ParseError::EmptyCharClass));
    }

    #[test]
    fn test_lex_rep_range_forms() {
        assert_eq!(
            lex("a{3}").unwrap()[1],
            Atom::OpRepRange { min: 3, max: Some(3), greedy: true }
        );
        assert_eq!(
            lex("a{2,}").unwrap()[1],
            Atom::OpRepRange { min: 2, max: None, greedy: true }
        );
        assert_eq!(
            lex("a{,4}").unwrap()[1],
            Atom::OpRepRange { min: 0, max: Some(4), greedy: true }
        );
    }

    #[test]
    fn test_lex_invalid_rep_range() {
        assert_eq!(lex("a{5,2}"), Err(ParseError::InvalidRepeatSize(5, 2)));
    }

    #[test]
    fn test_lex_trailing_backslash() {
        assert_eq!(lex("a\\"), Err(ParseError::TrailingBackslash));
    }

    #[test]
    fn test_lex_backreference() {
        let atoms = lex("(a)\\1").unwrap();
        assert_eq!(*atoms.last().unwrap(), Atom::Backreference(1));
    }

    #[test]
    fn test_lex_anchors_and_boundaries() {
        let atoms = lex("^\\bword\\B$").unwrap();
        assert_eq!(atoms[0], Atom::Anchor(AnchorKind::Start));
        assert_eq!(atoms[1], Atom::Anchor(AnchorKind::WordBoundary));
        assert_eq!(*atoms.last().unwrap(), Atom::Anchor(AnchorKind::End));
    }
}
