//! Inserts an explicit `OpJoin` between atoms that concatenate.
//!
//! The postfix conversion treats concatenation as an ordinary binary
//! operator with its own precedence; this pass is what gives it something
//! to operate on.

use crate::engine::token::Atom;

/// Inserts `Atom::OpJoin` between adjacent atoms that should concatenate.
pub fn insert_joins(atoms: Vec<Atom>) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len() * 2);
    // Tracks whether the atom just pushed could be followed directly by
    // another term without an intervening operator.
    let mut pending_term = false;

    for atom in atoms {
        match &atom {
            Atom::OpAlt => {
                out.push(atom);
                pending_term = false;
            }
            Atom::GroupStart { .. } => {
                if pending_term {
                    out.push(Atom::OpJoin);
                }
                out.push(atom);
                pending_term = false;
            }
            Atom::GroupEnd { .. }
            | Atom::OpStar { .. }
            | Atom::OpPlus { .. }
            | Atom::OpOpt { .. }
            | Atom::OpRepRange { .. } => {
                out.push(atom);
                pending_term = true;
            }
            _ => {
                if pending_term {
                    out.push(Atom::OpJoin);
                }
                out.push(atom);
                pending_term = true;
            }
        }
    }

    out
}
