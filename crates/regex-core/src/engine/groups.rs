//! Assigns capture indices and computes each group's "repeated" flag,
//! lowering the plain [`Atom`] stream into a [`BuildAtom`] stream the NFA
//! builder consumes directly.
//!
//! A capturing group is "repeated" when its close is immediately followed
//! by `*`, `+`, or `{m,n}` — or when any enclosing group is itself
//! repeated. The latter is what lets `(a(b))*` report `b` as a sequence of
//! matches rather than a single trailing one.
//!
//! Resolving this here, before the postfix conversion reorders everything,
//! means every downstream stage can treat `captured`/`index`/`is_repeated`
//! as baked-in atom payload instead of a side table that would need to
//! track atoms through reordering.

use std::collections::HashMap;

use crate::engine::token::{AnchorKind, Atom, CharSet, Shorthand};

/// An atom enriched with the group metadata the NFA builder needs.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildAtom {
    Literal(char, bool),
    Shorthand(Shorthand, bool),
    Any(bool),
    Set(CharSet, bool),
    Anchor(AnchorKind),
    Lookahead { positive: bool, inner: Box<BuildAtom> },
    Backreference(usize, bool),
    GroupStart {
        index: Option<usize>,
        is_repeated: bool,
    },
    GroupEnd {
        index: Option<usize>,
        is_repeated: bool,
    },
    OpJoin,
    OpAlt,
    OpStar { greedy: bool },
    OpPlus { greedy: bool },
    OpOpt { greedy: bool },
    OpRepRange { min: u32, max: Option<u32>, greedy: bool },
}

/// Crate-wide group metadata, independent of any single atom's position.
#[derive(Debug, Clone, Default)]
pub struct GroupInfo {
    pub groups_count: usize,
    pub named_groups: HashMap<String, usize>,
    /// Indexed by capture index: whether that group is repeated.
    pub group_repeated: Vec<bool>,
}

/// Runs the annotation pass, producing the enriched atom stream plus
/// overall group metadata.
pub fn annotate(atoms: Vec<Atom>) -> (Vec<BuildAtom>, GroupInfo) {
    let group_count = atoms
        .iter()
        .filter_map(|a| match a {
            Atom::GroupStart { id, .. } => Some(*id + 1),
            _ => None,
        })
        .max()
        .unwrap_or(0) as usize;

    let mut parent_of: Vec<Option<u32>> = vec![None; group_count];
    let mut own_repeated = vec![false; group_count];
    let mut capture_index: HashMap<u32, usize> = HashMap::new();
    let mut named_groups = HashMap::new();

    let mut id_stack: Vec<u32> = Vec::new();
    let mut next_capture_index = 0usize;

    for (i, atom) in atoms.iter().enumerate() {
        match atom {
            Atom::GroupStart { id, capturing, name } => {
                parent_of[*id as usize] = id_stack.last().copied();
                id_stack.push(*id);
                if *capturing {
                    capture_index.insert(*id, next_capture_index);
                    if let Some(name) = name {
                        named_groups.insert(name.to_string(), next_capture_index);
                    }
                    next_capture_index += 1;
                }
            }
            Atom::GroupEnd { id } => {
                id_stack.pop();
                let followed_by_repeating_quantifier = matches!(
                    atoms.get(i + 1),
                    Some(Atom::OpStar { .. }) | Some(Atom::OpPlus { .. }) | Some(Atom::OpRepRange { .. })
                );
                own_repeated[*id as usize] = followed_by_repeating_quantifier;
            }
            _ => {}
        }
    }

    // Parent ids are always numerically smaller than their children's: a
    // group's id is assigned when its '(' is lexed, and nesting requires
    // the parent's '(' to appear first.
    let mut repeated_by_id = vec![false; group_count];
    for id in 0..group_count {
        let inherited = parent_of[id].map(|p| repeated_by_id[p as usize]).unwrap_or(false);
        repeated_by_id[id] = own_repeated[id] || inherited;
    }

    let mut group_repeated = vec![false; next_capture_index];
    for (&id, &index) in &capture_index {
        group_repeated[index] = repeated_by_id[id as usize];
    }

    // Second walk: lower each atom, now that every group's metadata is
    // known, tracking open-capturing-group depth for the `captured` flag.
    let mut capturing_depth: u32 = 0;
    let mut out = Vec::with_capacity(atoms.len());
    for atom in atoms {
        let captured = capturing_depth > 0;
        let built = match atom {
            Atom::Literal(c) => BuildAtom::Literal(c, captured),
            Atom::Shorthand(s) => BuildAtom::Shorthand(s, captured),
            Atom::Any => BuildAtom::Any(captured),
            Atom::Set(s) => BuildAtom::Set(s, captured),
            Atom::Backreference(n) => BuildAtom::Backreference(n, captured),
            Atom::Anchor(k) => BuildAtom::Anchor(k),
            Atom::Lookahead { positive, inner } => BuildAtom::Lookahead {
                positive,
                inner: Box::new(lower_lookahead_inner(*inner)),
            },
            Atom::GroupStart { id, capturing, name: _ } => {
                if capturing {
                    capturing_depth += 1;
                }
                BuildAtom::GroupStart {
                    index: capture_index.get(&id).copied(),
                    is_repeated: repeated_by_id[id as usize],
                }
            }
            Atom::GroupEnd { id } => {
                if capture_index.contains_key(&id) {
                    capturing_depth -= 1;
                }
                BuildAtom::GroupEnd {
                    index: capture_index.get(&id).copied(),
                    is_repeated: repeated_by_id[id as usize],
                }
            }
            Atom::OpJoin => BuildAtom::OpJoin,
            Atom::OpAlt => BuildAtom::OpAlt,
            Atom::OpStar { greedy } => BuildAtom::OpStar { greedy },
            Atom::OpPlus { greedy } => BuildAtom::OpPlus { greedy },
            Atom::OpOpt { greedy } => BuildAtom::OpOpt { greedy },
            Atom::OpRepRange { min, max, greedy } => BuildAtom::OpRepRange { min, max, greedy },
        };
        out.push(built);
    }

    (
        out,
        GroupInfo {
            groups_count: next_capture_index,
            named_groups,
            group_repeated,
        },
    )
}

/// A lookahead body is always zero-width and never itself inside a capture.
fn lower_lookahead_inner(atom: Atom) -> BuildAtom {
    match atom {
        Atom::Literal(c) => BuildAtom::Literal(c, false),
        Atom::Shorthand(s) => BuildAtom::Shorthand(s, false),
        Atom::Any => BuildAtom::Any(false),
        Atom::Set(s) => BuildAtom::Set(s, false),
        other => unreachable!("lexer restricts lookahead bodies to simple atoms: {other:?}"),
    }
}
