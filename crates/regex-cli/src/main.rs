use clap::Parser;

use regex_cli::error::CommandLineError;
use regex_cli::{compile_patterns, execute_matching, Args, Regex};

fn main() {
    let mut args: Args = Args::parse();

    if args.with_filename && args.no_filename {
        eprintln!("{}", CommandLineError::DuplicateFilenameOption);
        std::process::exit(1);
    }

    let patterns: Vec<String> = match args.get_patterns() {
        Ok(patterns) => patterns,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let regexes: Vec<Regex> = match compile_patterns(&patterns, args.ignore_case, args.invert_match) {
        Ok(regexes) => regexes,
        Err(e) => {
            eprintln!("RegexError: {e}");
            std::process::exit(1);
        }
    };

    let matching_count = execute_matching(&args, &regexes);

    if args.count {
        println!("{matching_count}");
    }
}
