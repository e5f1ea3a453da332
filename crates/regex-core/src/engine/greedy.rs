//! Fuses a trailing bare `?` into the preceding quantifier's greediness.
//!
//! `a*?`, `a+?`, `a??` and `a{2,5}?` all mean "reluctant" in this dialect;
//! a plain `a?` (no quantifier before it) stays a normal optional match.

use crate::engine::token::Atom;

/// Resolves greediness in place, consuming the raw atom stream from the
/// lexer and returning one where every reluctant marker has been folded in.
pub fn resolve(atoms: Vec<Atom>) -> Vec<Atom> {
    let mut out: Vec<Atom> = Vec::with_capacity(atoms.len());
    for atom in atoms {
        let fuses = matches!(atom, Atom::OpOpt { greedy: true })
            && matches!(out.last(), Some(a) if a.is_quantifier());
        if fuses {
            out.last_mut().unwrap().make_reluctant();
        } else {
            out.push(atom);
        }
    }
    out
}
