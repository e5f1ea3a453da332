//! Cheap structural analysis over a finished [`Nfa`], run once at compile
//! time so matching can skip whole lines without ever touching the
//! simulator.
//!
//! This is pre-filtering only: every conclusion here is an
//! over-approximation in the safe direction (a line the filter lets
//! through may still fail to match; a line it rejects never could have).

use std::collections::HashSet;

use crate::engine::nfa::{CharMatcher, Nfa, NodeId, NodeKind, EOF};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// The literal prefix every match must start with, if the pattern
    /// begins with an unconditional run of literal characters.
    pub leading_literal: Option<String>,
    /// Leading literals of each branch of a top-level alternation, when
    /// every branch resolves to one; a line matching none of these can't
    /// match the pattern at all.
    pub needles: Vec<String>,
    /// Whether the empty string is itself a match.
    pub nullable: bool,
}

pub fn analyze(nfa: &Nfa) -> Analysis {
    let leading_literal = leading_literal_from(nfa, nfa.start);
    let needles = if leading_literal.is_none() { alternation_needles(nfa) } else { Vec::new() };
    Analysis { leading_literal, needles, nullable: is_nullable(nfa) }
}

/// Walks forward through transparent (single-successor, non-consuming)
/// nodes and literal character nodes, collecting a mandatory literal run.
/// Stops at the first branch, non-literal consumer, or backreference.
fn leading_literal_from(nfa: &Nfa, start: NodeId) -> Option<String> {
    let mut buf = String::new();
    let mut node = start;
    let mut visited = HashSet::new();

    loop {
        if !visited.insert(node) {
            break;
        }
        match &nfa.nodes[node].kind {
            NodeKind::Char { matcher: CharMatcher::Literal(c), .. } => {
                buf.push(*c);
                node = nfa.nodes[node].out[0];
            }
            NodeKind::Skip | NodeKind::GroupStart { .. } | NodeKind::GroupEnd { .. } | NodeKind::Assertion(_) => {
                node = nfa.nodes[node].out[0];
            }
            _ => break,
        }
    }

    if buf.is_empty() {
        None
    } else {
        Some(buf)
    }
}

/// If the pattern is (after transparent nodes) a top-level alternation,
/// and every branch has its own leading literal, returns those literals.
fn alternation_needles(nfa: &Nfa) -> Vec<String> {
    let mut node = nfa.start;
    let mut visited = HashSet::new();
    loop {
        if !visited.insert(node) {
            return Vec::new();
        }
        match &nfa.nodes[node].kind {
            NodeKind::Skip | NodeKind::GroupStart { .. } | NodeKind::GroupEnd { .. } | NodeKind::Assertion(_) => {
                node = nfa.nodes[node].out[0];
            }
            NodeKind::Split => break,
            _ => return Vec::new(),
        }
    }

    let mut needles = Vec::new();
    let mut ok = true;
    collect_branch_literals(nfa, node, &mut needles, &mut ok);
    if ok {
        needles
    } else {
        Vec::new()
    }
}

fn collect_branch_literals(nfa: &Nfa, node: NodeId, out: &mut Vec<String>, ok: &mut bool) {
    if !*ok {
        return;
    }
    if matches!(nfa.nodes[node].kind, NodeKind::Split) {
        for &branch in nfa.nodes[node].out.clone().iter() {
            collect_branch_literals(nfa, branch, out, ok);
        }
    } else {
        match leading_literal_from(nfa, node) {
            Some(lit) => out.push(lit),
            None => *ok = false,
        }
    }
}

/// Whether `EOF` is reachable from `start` without consuming a character.
/// Assertions are treated as satisfiable: a conservative "maybe nullable"
/// is always safe for a pre-filter, an incorrect "never nullable" is not.
fn is_nullable(nfa: &Nfa) -> bool {
    let mut visited = HashSet::new();
    reaches_eof(nfa, nfa.start, &mut visited)
}

fn reaches_eof(nfa: &Nfa, node: NodeId, visited: &mut HashSet<NodeId>) -> bool {
    if node == EOF {
        return true;
    }
    if !visited.insert(node) {
        return false;
    }
    match &nfa.nodes[node].kind {
        NodeKind::Eof => true,
        NodeKind::Char { .. } | NodeKind::Backreference { .. } => false,
        NodeKind::Skip
        | NodeKind::Split
        | NodeKind::GroupStart { .. }
        | NodeKind::GroupEnd { .. }
        | NodeKind::Assertion(_) => nfa.nodes[node].out.iter().any(|&n| reaches_eof(nfa, n, visited)),
    }
}
