//! Infix atom stream -> postfix atom stream, via a Shunting-yard variant
//! adapted for regex operators (quantifiers, join, alternation).
//!
//! `GroupStart`/`GroupEnd` are themselves treated as a matched pair of
//! postfix unary wrappers here, not as textual brackets: a `GroupEnd` pops
//! operators back to its `GroupStart` and emits both *after* the group's
//! contents, exactly where the NFA builder's own stack machine expects to
//! find a complete subgraph to wrap.

use crate::engine::groups::BuildAtom;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

fn precedence(atom: &BuildAtom) -> Option<(u8, Assoc)> {
    match atom {
        BuildAtom::OpStar { .. }
        | BuildAtom::OpPlus { .. }
        | BuildAtom::OpOpt { .. }
        | BuildAtom::OpRepRange { .. } => Some((5, Assoc::Right)),
        BuildAtom::OpJoin => Some((4, Assoc::Left)),
        BuildAtom::OpAlt => Some((3, Assoc::Left)),
        _ => None,
    }
}

/// Converts a group-annotated atom stream into postfix order.
pub fn to_postfix(atoms: Vec<BuildAtom>) -> Vec<BuildAtom> {
    let mut output = Vec::with_capacity(atoms.len());
    let mut operators: Vec<BuildAtom> = Vec::new();

    for atom in atoms {
        if precedence(&atom).is_some() {
            let (prec, assoc) = precedence(&atom).unwrap();
            while let Some(top) = operators.last() {
                if matches!(top, BuildAtom::GroupStart { .. }) {
                    break;
                }
                let (top_prec, _) = precedence(top).expect("operator stack holds only operators");
                let should_pop = top_prec > prec || (top_prec == prec && assoc == Assoc::Left);
                if should_pop {
                    output.push(operators.pop().unwrap());
                } else {
                    break;
                }
            }
            operators.push(atom);
        } else if matches!(atom, BuildAtom::GroupStart { .. }) {
            operators.push(atom);
        } else if matches!(atom, BuildAtom::GroupEnd { .. }) {
            loop {
                match operators.pop() {
                    Some(start @ BuildAtom::GroupStart { .. }) => {
                        output.push(start);
                        break;
                    }
                    Some(other) => output.push(other),
                    None => unreachable!("group end without matching start; annotator guarantees balance"),
                }
            }
            output.push(atom);
        } else {
            output.push(atom);
        }
    }

    while let Some(op) = operators.pop() {
        output.push(op);
    }

    output
}
