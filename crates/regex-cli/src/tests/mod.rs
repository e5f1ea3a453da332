mod compile_patterns_tests;
mod execute_matching_tests;
