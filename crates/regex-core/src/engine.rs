//! Core functions for compiling and matching regex patterns.
//!
//! The pipeline is a straight line of independent stages, each consuming
//! the previous stage's output type: text -> tokens -> (greedy resolution)
//! -> (join insertion) -> (group annotation) -> postfix -> graph -> result.
//! Keeping each stage a free function over plain data, rather than a
//! method on a growing "compiler" struct, is what lets the NFA builder and
//! the simulator be tested in total isolation from the lexer.

mod analysis;
mod concat;
mod greedy;
mod groups;
mod lexer;
mod nfa;
mod shunting;
mod simulator;
mod token;

pub use analysis::Analysis;
pub use lexer::ParseError;
pub use nfa::{CompileError, Nfa};
pub use simulator::{full_match, prefix_match, search, CaptureValue, Captures};

use crate::error::RegexError;

/// Lexes, resolves, and lowers a pattern all the way down to a finished
/// NFA, plus the cheap structural analysis computed over it.
pub fn compile_pattern(pattern: &str) -> Result<(Nfa, Analysis), RegexError> {
    let atoms = lexer::lex(pattern)?;
    let atoms = greedy::resolve(atoms);
    let atoms = concat::insert_joins(atoms);
    let (built, group_info) = groups::annotate(atoms);
    let postfix = shunting::to_postfix(built);
    let compiled = nfa::build(postfix, &group_info)?;
    let analysis = analysis::analyze(&compiled);
    Ok((compiled, analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_pattern_literal() {
        let (nfa, _) = compile_pattern("abc").unwrap();
        assert!(full_match(&nfa, "abc").is_some());
        assert!(full_match(&nfa, "abd").is_none());
    }

    #[test]
    fn test_compile_pattern_invalid_backreference() {
        let actual = compile_pattern("(a)\\2");
        assert_eq!(
            actual,
            Err(RegexError::Compile(CompileError::InvalidBackreference(2)))
        );
    }

    #[test]
    fn test_compile_pattern_parse_error() {
        assert!(compile_pattern("(a").is_err());
    }

    #[test]
    fn test_compile_pattern_analysis_leading_literal() {
        let (_, analysis) = compile_pattern(".*abc.*").unwrap();
        assert_eq!(analysis.leading_literal, None);
    }

    #[test]
    fn test_compile_pattern_analysis_needles() {
        let (_, analysis) = compile_pattern("abc|def").unwrap();
        assert_eq!(analysis.needles, vec!["abc".to_string(), "def".to_string()]);
        assert!(!analysis.nullable);
    }

    #[test]
    fn test_compile_pattern_analysis_nullable() {
        let (_, analysis) = compile_pattern("a*").unwrap();
        assert!(analysis.nullable);
    }
}
