use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Stdin};

use clap::{ArgAction, Parser};

pub use regex_core::Regex;
use regex_core::error::RegexError;

pub mod error;
use error::CommandLineError;

#[cfg(test)]
mod tests;

const STDIN_FILENAME: &str = "(standard input)";

#[derive(Debug, Parser)]
#[command(version)]
#[clap(disable_version_flag = true, disable_help_flag = true)]
pub struct Args {
    #[arg(value_name = "PATTERN")]
    /// パターンを指定する。
    pub pattern: Option<String>,

    #[arg(value_name = "FILE")]
    /// ファイルを指定する。
    pub files: Vec<String>,

    #[arg(short = 'e', long = "regexp", value_name = "PATTERN")]
    /// パターンを指定する。このオプションを使用すれば複数のパターンを指定することができる
    pub patterns: Vec<String>,

    #[arg(short = 'c', long = "count")]
    /// マッチした行数のみ表示する
    pub count: bool,

    #[arg(short = 'i', long = "ignore-case")]
    /// 大文字と小文字を区別せずにマッチする
    pub ignore_case: bool,

    #[arg(short = 'v', long = "invert-match")]
    /// マッチしなかった行を表示する
    pub invert_match: bool,

    #[arg(short = 'h', long = "no-filename")]
    /// ファイル名を表示しない
    pub no_filename: bool,

    #[arg(short = 'H', long = "with-filename")]
    /// ファイル名を表示する
    pub with_filename: bool,

    #[arg(short = 'n', long = "line-number")]
    /// 行番号を表示する
    pub line_number: bool,

    #[arg(long, action = ArgAction::Help)]
    /// help を表示する
    pub help: Option<bool>,

    #[arg(short = 'V', long = "version", action = ArgAction::Version)]
    /// Version を表示する
    pub version: Option<bool>,
}

impl Args {
    /// Resolves the pattern list from the positional argument and `-e`.
    /// If `-e` was used, the positional argument is a file instead.
    pub fn get_patterns(&mut self) -> Result<Vec<String>, CommandLineError> {
        if self.patterns.is_empty() {
            match &self.pattern {
                Some(p) => self.patterns.push(p.to_owned()),
                None => return Err(CommandLineError::NoPattern),
            }
        } else if let Some(file) = &self.pattern {
            self.files.insert(0, file.to_owned());
        }

        Ok(self.patterns.clone())
    }
}

/// Compiles every pattern into a `Regex`, short-circuiting on the first
/// invalid one.
pub fn compile_patterns(
    patterns: &[String],
    ignore_case: bool,
    invert_match: bool,
) -> Result<Vec<Regex>, RegexError> {
    patterns
        .iter()
        .map(|p| Regex::new(p, ignore_case, invert_match))
        .collect()
}

/// Runs every regex against stdin or each listed file, printing matching
/// lines (unless `count` is set) and returning the total matched-line count.
pub fn execute_matching(args: &Args, regexes: &[Regex]) -> usize {
    let mut matching_count = 0;

    if args.files.is_empty() {
        let stdin: Stdin = stdin();
        let mut buf_reader: BufReader<Stdin> = BufReader::new(stdin);
        if let Some(c) = match_file(&mut buf_reader, STDIN_FILENAME, regexes, args) {
            matching_count += c;
        }
    } else {
        for file in &args.files {
            let mut buf_reader: BufReader<File> = match File::open(file) {
                Ok(reader) => BufReader::new(reader),
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };
            if let Some(c) = match_file(&mut buf_reader, file, regexes, args) {
                matching_count += c;
            }
        }
    }

    matching_count
}

fn match_file<T: BufRead>(buf_reader: T, file: &str, regexes: &[Regex], args: &Args) -> Option<usize> {
    let is_filename = is_print_filename(args.files.len(), args.no_filename, args.with_filename);
    let is_count = args.count;
    let is_line_number = args.line_number;

    let mut matching_count: usize = 0;
    for (i, result) in buf_reader.lines().enumerate() {
        let line = match result {
            Ok(line) => line,
            Err(e) => {
                eprint!("{e}");
                break;
            }
        };

        for regex in regexes {
            match regex.is_match(&line) {
                Ok(true) => {
                    matching_count += 1;
                    if !is_count {
                        print_line(file, &line, i + 1, is_filename, is_line_number);
                    }
                    break;
                }
                Ok(false) => continue,
                Err(e) => {
                    eprintln!("Following error is occured in matching.\n{e}");
                    return None;
                }
            }
        }
    }

    Some(matching_count)
}

fn print_line(filename: &str, line: &str, line_number: usize, is_filename: bool, is_line_number: bool) {
    match (is_filename, is_line_number) {
        (true, true) => println!("{filename}:{line_number}:{line}"),
        (true, false) => println!("{filename}:{line}"),
        (false, true) => println!("{line_number}:{line}"),
        (false, false) => println!("{line}"),
    }
}

/// File count <= 1 follows `-H`; 2 or more follows `-h`.
fn is_print_filename(file_count: usize, no_filename: bool, with_filename: bool) -> bool {
    if file_count <= 1 {
        with_filename
    } else {
        !no_filename
    }
}
