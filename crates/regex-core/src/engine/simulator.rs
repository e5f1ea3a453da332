//! Thompson-style simulation over a built [`Nfa`], with submatch capture.
//!
//! The runtime tracks an ordered, node-deduplicated set of active threads
//! per input position ("states-set"): a thread is a `(node, capture chain)`
//! pair. ε-closure expands a thread through every non-consuming node
//! (splits, group markers, assertions) until it reaches a node that either
//! consumes input or terminates the match. Because the states-set keeps
//! only the first thread to reach a given node, and closure visits
//! out-edges in preference order, "first" always means "most greedy".
//!
//! Backreferences are the one place this stops being a clean per-character
//! walk: a backreference node consumes a whole previously-captured run at
//! once, which can land a thread more than one position ahead. Threads
//! that do are parked in `future`, a sparse map from landing position to
//! the frontier waiting there, until the main loop reaches that position.

use std::collections::HashMap;
use std::collections::HashSet;
use std::rc::Rc;

use crate::engine::nfa::{AssertionKind, CharMatcher, Nfa, NodeId, NodeKind, EOF};

/// One link in a reverse-linked capture trace. Shared via `Rc` so that
/// sibling threads branching off the same prefix don't copy it.
#[derive(Debug)]
struct CaptureLink {
    entry: CaptureEntry,
    index: Option<usize>,
    is_repeated: bool,
    prev: Option<Rc<CaptureLink>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureEntry {
    Char(char),
    GroupStart,
    GroupEnd,
}

type Chain = Option<Rc<CaptureLink>>;

fn extend_char(chain: &Chain, c: char) -> Chain {
    Some(Rc::new(CaptureLink { entry: CaptureEntry::Char(c), index: None, is_repeated: false, prev: chain.clone() }))
}

fn extend_marker(chain: &Chain, entry: CaptureEntry, index: Option<usize>, is_repeated: bool) -> Chain {
    Some(Rc::new(CaptureLink { entry, index, is_repeated, prev: chain.clone() }))
}

/// One reconstructed capture group's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureValue {
    None,
    Single(String),
    Repeated(Vec<String>),
}

/// The submatch result of a successful match.
#[derive(Debug, Clone)]
pub struct Captures {
    values: Vec<CaptureValue>,
    named: HashMap<String, usize>,
}

impl Captures {
    pub fn group(&self, index: usize) -> Option<&CaptureValue> {
        self.values.get(index)
    }

    pub fn groups(&self) -> &[CaptureValue] {
        &self.values
    }

    pub fn group_name(&self, name: &str) -> Option<&CaptureValue> {
        self.named.get(name).and_then(|&i| self.values.get(i))
    }

    pub fn named_groups(&self) -> &HashMap<String, usize> {
        &self.named
    }
}

/// An ordered set of active threads, deduplicated by node identity: the
/// first thread to reach a node wins, which is what turns edge-order
/// preference into leftmost-greedy submatch selection.
struct StatesSet {
    order: Vec<(NodeId, Chain)>,
    seen: HashSet<NodeId>,
}

impl StatesSet {
    fn new() -> Self {
        Self { order: Vec::new(), seen: HashSet::new() }
    }

    fn push(&mut self, node: NodeId, chain: Chain) {
        if self.seen.insert(node) {
            self.order.push((node, chain));
        }
    }

    fn find_eof(&self) -> Option<&Chain> {
        self.order.iter().find(|(n, _)| *n == EOF).map(|(_, c)| c)
    }

    fn iter(&self) -> std::slice::Iter<'_, (NodeId, Chain)> {
        self.order.iter()
    }
}

/// A states-set plus the epsilon-node visited-set guarding its own build.
/// The visited-set is scoped to (and lives as long as) the states-set it
/// feeds: once an epsilon node has been expanded into this particular
/// frontier, every terminal node it can reach is already accounted for in
/// `states`, so a second arrival at that epsilon node (via a less-preferred
/// thread) is redundant work, not a correctness risk.
struct Frontier {
    states: StatesSet,
    visited: HashSet<NodeId>,
}

impl Frontier {
    fn new() -> Self {
        Self { states: StatesSet::new(), visited: HashSet::new() }
    }

    fn close_from(&mut self, nfa: &Nfa, node: NodeId, chain: Chain, pos: usize, input: &[char]) {
        close(nfa, node, chain, pos, input, &mut self.states, &mut self.visited);
    }
}

/// Expands `node` through every non-consuming edge, recording the
/// character-consuming, backreference, and EOF nodes it bottoms out at.
fn close(
    nfa: &Nfa,
    node: NodeId,
    chain: Chain,
    pos: usize,
    input: &[char],
    out: &mut StatesSet,
    visited: &mut HashSet<NodeId>,
) {
    if !visited.insert(node) {
        return;
    }
    match &nfa.nodes[node].kind {
        NodeKind::Eof => out.push(node, chain),
        NodeKind::Char { .. } => out.push(node, chain),
        NodeKind::Backreference { index, .. } => match resolve_capture(&chain, *index) {
            None => {}
            Some(text) if text.is_empty() => {
                for &next in &nfa.nodes[node].out {
                    close(nfa, next, chain.clone(), pos, input, out, visited);
                }
            }
            Some(_) => out.push(node, chain),
        },
        NodeKind::Skip | NodeKind::Split => {
            for &next in &nfa.nodes[node].out {
                close(nfa, next, chain.clone(), pos, input, out, visited);
            }
        }
        NodeKind::GroupStart { index, is_repeated } => {
            let chain2 = if index.is_some() {
                extend_marker(&chain, CaptureEntry::GroupStart, *index, *is_repeated)
            } else {
                chain.clone()
            };
            for &next in &nfa.nodes[node].out {
                close(nfa, next, chain2.clone(), pos, input, out, visited);
            }
        }
        NodeKind::GroupEnd { index, is_repeated } => {
            let chain2 = if index.is_some() {
                extend_marker(&chain, CaptureEntry::GroupEnd, *index, *is_repeated)
            } else {
                chain.clone()
            };
            for &next in &nfa.nodes[node].out {
                close(nfa, next, chain2.clone(), pos, input, out, visited);
            }
        }
        NodeKind::Assertion(kind) => {
            let prev = if pos > 0 { Some(input[pos - 1]) } else { None };
            let next_char = input.get(pos).copied();
            if assertion_holds(kind, prev, next_char) {
                for &next in &nfa.nodes[node].out {
                    close(nfa, next, chain.clone(), pos, input, out, visited);
                }
            }
        }
    }
}

/// Word character per the boundary predicate's own grounding: unlike `\w`
/// (which also accepts `_`), a boundary is a transition between
/// `char::is_alphanumeric()` and not.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn is_boundary(prev: Option<char>, next: Option<char>) -> bool {
    let p = prev.map(is_word_char).unwrap_or(false);
    let n = next.map(is_word_char).unwrap_or(false);
    p != n
}

fn assertion_holds(kind: &AssertionKind, prev: Option<char>, next: Option<char>) -> bool {
    match kind {
        AssertionKind::Start => prev.is_none(),
        AssertionKind::End => next.is_none(),
        AssertionKind::WordBoundary => is_boundary(prev, next),
        AssertionKind::NonWordBoundary => !is_boundary(prev, next),
        AssertionKind::Lookahead { positive, matcher } => {
            let matched = next.map(|c| char_matches(matcher, c)).unwrap_or(false);
            matched == *positive
        }
    }
}

fn char_matches(matcher: &CharMatcher, c: char) -> bool {
    matcher.matches(c)
}

/// Finds the most recently closed span for capturing group `index` in a
/// partial chain and reconstructs its text. `None` means the group never
/// participated (the defining condition for an unresolved backreference).
fn resolve_capture(chain: &Chain, index: usize) -> Option<String> {
    let mut cursor = chain.clone();
    while let Some(node) = cursor {
        if node.entry == CaptureEntry::GroupEnd && node.index == Some(index) {
            let mut depth: i32 = 0;
            let mut buf = Vec::new();
            let mut walk = node.prev.clone();
            while let Some(w) = walk {
                match w.entry {
                    CaptureEntry::GroupEnd => {
                        depth += 1;
                        walk = w.prev.clone();
                    }
                    CaptureEntry::GroupStart => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                        walk = w.prev.clone();
                    }
                    CaptureEntry::Char(c) => {
                        if depth == 0 {
                            buf.push(c);
                        }
                        walk = w.prev.clone();
                    }
                }
            }
            buf.reverse();
            return Some(buf.into_iter().collect());
        }
        cursor = node.prev.clone();
    }
    None
}

/// Walks a completed chain once, attributing every captured character to
/// every group open around it, and folds the result into per-group values.
fn reconstruct(chain: Chain, groups_count: usize, group_repeated: &[bool]) -> Vec<CaptureValue> {
    let mut repeated_acc: HashMap<usize, Vec<Vec<char>>> = HashMap::new();
    let mut single_acc: HashMap<usize, Vec<char>> = HashMap::new();
    let mut open: Vec<(usize, bool)> = Vec::new();

    let mut cursor = chain;
    while let Some(node) = cursor {
        match node.entry {
            CaptureEntry::GroupEnd => {
                let index = node.index.expect("GroupEnd marker always carries an index");
                open.push((index, node.is_repeated));
                if node.is_repeated {
                    repeated_acc.entry(index).or_default().push(Vec::new());
                }
            }
            CaptureEntry::GroupStart => {
                open.pop();
            }
            CaptureEntry::Char(c) => {
                for &(index, is_repeated) in &open {
                    if is_repeated {
                        repeated_acc.get_mut(&index).unwrap().last_mut().unwrap().push(c);
                    } else {
                        single_acc.entry(index).or_default().push(c);
                    }
                }
            }
        }
        cursor = node.prev.clone();
    }
    debug_assert!(open.is_empty(), "capture chain left unbalanced group markers");

    (0..groups_count)
        .map(|g| {
            if group_repeated[g] {
                match repeated_acc.remove(&g) {
                    None => CaptureValue::None,
                    Some(mut iterations) => {
                        iterations.reverse();
                        CaptureValue::Repeated(
                            iterations
                                .into_iter()
                                .map(|mut chars| {
                                    chars.reverse();
                                    chars.into_iter().collect()
                                })
                                .collect(),
                        )
                    }
                }
            } else {
                match single_acc.remove(&g) {
                    None => CaptureValue::None,
                    Some(mut chars) => {
                        chars.reverse();
                        CaptureValue::Single(chars.into_iter().collect())
                    }
                }
            }
        })
        .collect()
}

fn build_captures(nfa: &Nfa, chain: Chain) -> Captures {
    Captures {
        values: reconstruct(chain, nfa.groups_count, &nfa.group_repeated),
        named: nfa.named_groups.clone(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Prefix,
    Search,
}

/// Runs the simulator. `Full` accepts only if the whole text is consumed
/// with EOF reachable at the end; `Prefix` and `Search` accept as soon as
/// EOF is reachable anywhere, the latter re-seeding a fresh start thread at
/// every position so a match may begin anywhere in the text.
fn run(nfa: &Nfa, input: &[char], mode: Mode) -> Chain {
    let len = input.len();
    let mut current = Frontier::new();
    current.close_from(nfa, nfa.start, None, 0, input);

    let mut future: HashMap<usize, Frontier> = HashMap::new();

    for pos in 0..=len {
        if let Some(parked) = future.remove(&pos) {
            for (node, chain) in parked.states.order {
                current.states.push(node, chain);
            }
        }
        if matches!(mode, Mode::Search) && pos > 0 {
            current.close_from(nfa, nfa.start, None, pos, input);
        }

        if let Some(chain) = current.states.find_eof() {
            match mode {
                Mode::Full => {
                    if pos == len {
                        return chain.clone();
                    }
                }
                Mode::Prefix | Mode::Search => return chain.clone(),
            }
        }

        if pos == len {
            break;
        }

        let this_char = input[pos];
        let mut next = Frontier::new();
        for (node, chain) in current.states.iter() {
            match &nfa.nodes[*node].kind {
                NodeKind::Char { matcher, captured } => {
                    if char_matches(matcher, this_char) {
                        let chain2 = if *captured { extend_char(chain, this_char) } else { chain.clone() };
                        for &out in &nfa.nodes[*node].out {
                            next.close_from(nfa, out, chain2.clone(), pos + 1, input);
                        }
                    }
                }
                NodeKind::Backreference { index, captured } => {
                    if let Some(text) = resolve_capture(chain, *index) {
                        let tail: Vec<char> = text.chars().collect();
                        let tlen = tail.len();
                        if tlen > 0 && pos + tlen <= len && input[pos..pos + tlen] == tail[..] {
                            let mut chain2 = chain.clone();
                            if *captured {
                                for &c in &tail {
                                    chain2 = extend_char(&chain2, c);
                                }
                            }
                            let target = pos + tlen;
                            for &out in &nfa.nodes[*node].out {
                                if target == pos + 1 {
                                    next.close_from(nfa, out, chain2.clone(), target, input);
                                } else {
                                    future.entry(target).or_insert_with(Frontier::new).close_from(
                                        nfa,
                                        out,
                                        chain2.clone(),
                                        target,
                                        input,
                                    );
                                }
                            }
                        }
                    }
                }
                NodeKind::Eof => {}
                other => unreachable!("closure never stops at a non-terminal node: {other:?}"),
            }
        }
        current = next;
    }

    None
}

fn to_chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Accepts iff the whole text is consumed and EOF is reachable at the end.
pub fn full_match(nfa: &Nfa, text: &str) -> Option<Captures> {
    run(nfa, &to_chars(text), Mode::Full).map(|chain| build_captures(nfa, chain))
}

/// Accepts iff EOF is reachable on some prefix starting at position 0.
pub fn prefix_match(nfa: &Nfa, text: &str) -> Option<Captures> {
    run(nfa, &to_chars(text), Mode::Prefix).map(|chain| build_captures(nfa, chain))
}

/// Accepts iff EOF is reachable starting at some position `>= 0`.
pub fn search(nfa: &Nfa, text: &str) -> Option<Captures> {
    run(nfa, &to_chars(text), Mode::Search).map(|chain| build_captures(nfa, chain))
}
