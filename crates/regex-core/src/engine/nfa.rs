//! Postfix atom stream -> NFA graph.
//!
//! The graph is an arena (`Vec<Node>`) addressed by index so that the
//! quantifier loops it necessarily contains don't fight Rust's ownership
//! rules. Node 0 is a fixed sentinel: during the build it stands for "not
//! yet wired to anything", and in the finished graph a path that still
//! reaches it is exactly a successful match.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::engine::groups::{BuildAtom, GroupInfo};
use crate::engine::token::{AnchorKind, CharSet, Shorthand};

pub type NodeId = usize;

/// The terminal sentinel. Dangling out-edges point here until `combine`
/// rewires them; whatever still points here in the finished graph is where
/// a match is accepted.
pub const EOF: NodeId = 0;

/// Errors raised while lowering a postfix atom stream into a graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("CompileError: backreference to non-existent group {0}")]
    InvalidBackreference(usize),
}

/// What a character-matching node tests the current input character with.
#[derive(Debug, Clone, PartialEq)]
pub enum CharMatcher {
    Literal(char),
    Shorthand(Shorthand),
    Any,
    Set(CharSet),
}

impl CharMatcher {
    pub fn matches(&self, c: char) -> bool {
        match self {
            CharMatcher::Literal(l) => *l == c,
            CharMatcher::Shorthand(s) => s.matches(c),
            CharMatcher::Any => c != '\n',
            CharMatcher::Set(s) => s.matches(c),
        }
    }
}

/// A zero-width assertion predicate, evaluated against the surrounding
/// `(prev_char, next_char)` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum AssertionKind {
    Start,
    End,
    WordBoundary,
    NonWordBoundary,
    Lookahead { positive: bool, matcher: CharMatcher },
}

/// One NFA node. `out` is ordered: for a greedy split, "consume" precedes
/// "skip"; reversed for reluctant. The states-set's first-insertion-wins
/// dedup is what turns that order into leftmost-greedy preference.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Char { matcher: CharMatcher, captured: bool },
    GroupStart { index: Option<usize>, is_repeated: bool },
    GroupEnd { index: Option<usize>, is_repeated: bool },
    Assertion(AssertionKind),
    Backreference { index: usize, captured: bool },
    Split,
    Skip,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub out: Vec<NodeId>,
}

/// An immutable, sharable compiled pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Nfa {
    pub nodes: Vec<Node>,
    pub start: NodeId,
    pub groups_count: usize,
    pub named_groups: HashMap<String, usize>,
    /// Indexed by capture index.
    pub group_repeated: Vec<bool>,
}

struct Builder {
    nodes: Vec<Node>,
}

impl Builder {
    fn new() -> Self {
        Self {
            nodes: vec![Node { kind: NodeKind::Eof, out: Vec::new() }],
        }
    }

    fn alloc(&mut self, kind: NodeKind, out: Vec<NodeId>) -> NodeId {
        self.nodes.push(Node { kind, out });
        self.nodes.len() - 1
    }

    /// Redirects every dangling (EOF-pointing) out-edge reachable from
    /// `from` to point at `to` instead. Depth-first with a visited set so
    /// cycles (quantifier loops) terminate; never recurses into `to` itself.
    fn combine(&mut self, from: NodeId, to: NodeId) {
        let mut visited = HashSet::new();
        self.combine_inner(from, to, &mut visited);
    }

    fn combine_inner(&mut self, node: NodeId, to: NodeId, visited: &mut HashSet<NodeId>) {
        if node == to || !visited.insert(node) {
            return;
        }
        for i in 0..self.nodes[node].out.len() {
            let next = self.nodes[node].out[i];
            if next == EOF {
                self.nodes[node].out[i] = to;
            } else {
                self.combine_inner(next, to, visited);
            }
        }
    }

    /// Shallow-copies the subgraph rooted at `root`, preserving internal
    /// structure (including cycles) but sharing the `EOF` sentinel.
    fn dup(&mut self, root: NodeId) -> NodeId {
        let mut map = HashMap::new();
        self.dup_inner(root, &mut map)
    }

    fn dup_inner(&mut self, node: NodeId, map: &mut HashMap<NodeId, NodeId>) -> NodeId {
        if node == EOF {
            return EOF;
        }
        if let Some(&existing) = map.get(&node) {
            return existing;
        }
        let kind = self.nodes[node].kind.clone();
        let new_id = self.alloc(kind, Vec::new());
        map.insert(node, new_id);
        let old_out = self.nodes[node].out.clone();
        let new_out: Vec<NodeId> = old_out.into_iter().map(|o| self.dup_inner(o, map)).collect();
        self.nodes[new_id].out = new_out;
        new_id
    }
}

/// Tracks the root/tail of a series of subgraphs spliced one after another.
struct Chain {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl Chain {
    fn new() -> Self {
        Self { head: None, tail: None }
    }

    fn append(&mut self, builder: &mut Builder, next: NodeId) {
        if let Some(tail) = self.tail {
            builder.combine(tail, next);
        }
        self.head.get_or_insert(next);
        self.tail = Some(next);
    }

    fn finish(self) -> Option<NodeId> {
        self.head
    }
}

/// Builds the NFA from a postfix atom stream.
pub fn build(postfix: Vec<BuildAtom>, group_info: &GroupInfo) -> Result<Nfa, CompileError> {
    let mut builder = Builder::new();
    let mut stack: Vec<NodeId> = Vec::new();

    if postfix.is_empty() {
        stack.push(builder.alloc(NodeKind::Skip, vec![EOF]));
    }

    for atom in postfix {
        match atom {
            BuildAtom::Literal(c, captured) => {
                let id = builder.alloc(
                    NodeKind::Char { matcher: CharMatcher::Literal(c), captured },
                    vec![EOF],
                );
                stack.push(id);
            }
            BuildAtom::Shorthand(s, captured) => {
                let id = builder.alloc(
                    NodeKind::Char { matcher: CharMatcher::Shorthand(s), captured },
                    vec![EOF],
                );
                stack.push(id);
            }
            BuildAtom::Any(captured) => {
                let id =
                    builder.alloc(NodeKind::Char { matcher: CharMatcher::Any, captured }, vec![EOF]);
                stack.push(id);
            }
            BuildAtom::Set(set, captured) => {
                let id = builder.alloc(
                    NodeKind::Char { matcher: CharMatcher::Set(set), captured },
                    vec![EOF],
                );
                stack.push(id);
            }
            BuildAtom::Anchor(kind) => {
                let assertion = match kind {
                    AnchorKind::Start => AssertionKind::Start,
                    AnchorKind::End => AssertionKind::End,
                    AnchorKind::WordBoundary => AssertionKind::WordBoundary,
                    AnchorKind::NonWordBoundary => AssertionKind::NonWordBoundary,
                };
                let id = builder.alloc(NodeKind::Assertion(assertion), vec![EOF]);
                stack.push(id);
            }
            BuildAtom::Lookahead { positive, inner } => {
                let matcher = char_matcher_of(*inner);
                let id = builder.alloc(
                    NodeKind::Assertion(AssertionKind::Lookahead { positive, matcher }),
                    vec![EOF],
                );
                stack.push(id);
            }
            BuildAtom::Backreference(index, captured) => {
                if index == 0 || index > group_info.groups_count {
                    return Err(CompileError::InvalidBackreference(index));
                }
                let id = builder.alloc(
                    NodeKind::Backreference { index: index - 1, captured },
                    vec![EOF],
                );
                stack.push(id);
            }
            BuildAtom::OpJoin => {
                let b = stack.pop().expect("JOIN requires two operands");
                let a = stack.pop().expect("JOIN requires two operands");
                builder.combine(a, b);
                stack.push(a);
            }
            BuildAtom::OpAlt => {
                let b = stack.pop().expect("OR requires two operands");
                let a = stack.pop().expect("OR requires two operands");
                let id = builder.alloc(NodeKind::Split, vec![a, b]);
                stack.push(id);
            }
            BuildAtom::GroupStart { index, is_repeated } => {
                let s = stack.pop().expect("GROUP_START requires an operand");
                let id = builder.alloc(NodeKind::GroupStart { index, is_repeated }, vec![s]);
                stack.push(id);
            }
            BuildAtom::GroupEnd { index, is_repeated } => {
                let s = stack.pop().expect("GROUP_END requires an operand");
                let end = builder.alloc(NodeKind::GroupEnd { index, is_repeated }, vec![EOF]);
                builder.combine(s, end);
                stack.push(s);
            }
            BuildAtom::OpStar { greedy } => {
                let s = stack.pop().expect("STAR requires an operand");
                let out = if greedy { vec![s, EOF] } else { vec![EOF, s] };
                let split = builder.alloc(NodeKind::Split, out);
                builder.combine(s, split);
                stack.push(split);
            }
            BuildAtom::OpPlus { greedy } => {
                let s = stack.pop().expect("PLUS requires an operand");
                let out = if greedy { vec![s, EOF] } else { vec![EOF, s] };
                let split = builder.alloc(NodeKind::Split, out);
                builder.combine(s, split);
                stack.push(s);
            }
            BuildAtom::OpOpt { greedy } => {
                let s = stack.pop().expect("QUESTION requires an operand");
                let out = if greedy { vec![s, EOF] } else { vec![EOF, s] };
                let split = builder.alloc(NodeKind::Split, out);
                stack.push(split);
            }
            BuildAtom::OpRepRange { min, max, greedy } => {
                let s = stack.pop().expect("REP_RANGE requires an operand");
                let id = build_rep_range(&mut builder, s, min, max, greedy);
                stack.push(id);
            }
        }
    }

    let start = stack.pop().expect("postfix stream always yields exactly one root");
    debug_assert!(stack.is_empty(), "postfix build left more than one root on the stack");

    Ok(Nfa {
        nodes: builder.nodes,
        start,
        groups_count: group_info.groups_count,
        named_groups: group_info.named_groups.clone(),
        group_repeated: group_info.group_repeated.clone(),
    })
}

/// Expands `{min,max}` by duplicating `template`: `min` mandatory copies in
/// series, then either `max-min` independent optional copies, or (when
/// `max` is unbounded) a star loop over one more duplicate.
fn build_rep_range(
    builder: &mut Builder,
    template: NodeId,
    min: u32,
    max: Option<u32>,
    greedy: bool,
) -> NodeId {
    let mut chain = Chain::new();
    for _ in 0..min {
        let copy = builder.dup(template);
        chain.append(builder, copy);
    }

    match max {
        Some(max) if max == min => {}
        Some(max) => {
            for _ in 0..(max - min) {
                let copy = builder.dup(template);
                let out = if greedy { vec![copy, EOF] } else { vec![EOF, copy] };
                let opt = builder.alloc(NodeKind::Split, out);
                chain.append(builder, opt);
            }
        }
        None => {
            let copy = builder.dup(template);
            let out = if greedy { vec![copy, EOF] } else { vec![EOF, copy] };
            let star = builder.alloc(NodeKind::Split, out);
            builder.combine(copy, star);
            chain.append(builder, star);
        }
    }

    chain.finish().unwrap_or_else(|| builder.alloc(NodeKind::Skip, vec![EOF]))
}

fn char_matcher_of(atom: BuildAtom) -> CharMatcher {
    match atom {
        BuildAtom::Literal(c, _) => CharMatcher::Literal(c),
        BuildAtom::Shorthand(s, _) => CharMatcher::Shorthand(s),
        BuildAtom::Any(_) => CharMatcher::Any,
        BuildAtom::Set(s, _) => CharMatcher::Set(s),
        other => unreachable!("lookahead body restricted to simple atoms: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::concat::insert_joins;
    use crate::engine::greedy::resolve;
    use crate::engine::groups::annotate;
    use crate::engine::lexer::lex;
    use crate::engine::shunting::to_postfix;

    fn compile(pattern: &str) -> Nfa {
        let atoms = lex(pattern).unwrap();
        let (built, info) = annotate(insert_joins(resolve(atoms)));
        let postfix = to_postfix(built);
        build(postfix, &info).unwrap()
    }

    #[test]
    fn test_build_literal_concat() {
        let nfa = compile("ab");
        assert!(nfa.nodes.len() >= 3);
    }

    #[test]
    fn test_build_invalid_backreference() {
        let atoms = lex("(a)\\2").unwrap();
        let (built, info) = annotate(insert_joins(resolve(atoms)));
        let postfix = to_postfix(built);
        assert_eq!(build(postfix, &info), Err(CompileError::InvalidBackreference(2)));
    }

    #[test]
    fn test_build_star_creates_cycle() {
        let nfa = compile("a*");
        // The split node's "consume" branch must lead back to the split
        // itself (directly or via the char node), confirming a real loop.
        let split = nfa.start;
        assert!(matches!(nfa.nodes[split].kind, NodeKind::Split));
        let char_node = nfa.nodes[split].out[0];
        assert!(nfa.nodes[char_node].out.contains(&split));
    }

    #[test]
    fn test_build_bounded_repetition_duplicates_nodes() {
        let exact = compile("a{3}");
        let ranged = compile("a{2,4}");
        // {2,4} needs at least as many nodes as {3} (2 mandatory + 2 optional vs 3 mandatory).
        assert!(ranged.nodes.len() >= exact.nodes.len());
    }

    #[test]
    fn test_build_empty_pattern() {
        let nfa = compile("");
        assert!(matches!(nfa.nodes[nfa.start].kind, NodeKind::Skip));
    }

    #[test]
    fn test_build_pathological_nested_repetition_terminates() {
        // Regression guard: this used to be able to loop forever without a
        // visited set in `combine`/`dup`.
        let _nfa = compile("((a)*(a)*)*");
    }
}
