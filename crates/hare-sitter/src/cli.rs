//! `hare-sitter`: parse Hare source and print its syntax tree.
//!
//! ```text
//! hare-sitter [--grammar] [--node-types] [--validate] [--quiet] [--max-depth N] [PATH]
//! ```
//!
//! Reads `PATH`, or standard input when it is absent, and prints the tree as
//! an S-expression. Exits with status 1 when the tree contains `ERROR` or
//! `MISSING` nodes and 2 when the input could not be parsed at all. Set
//! `HARE_SITTER_LOG` (e.g. `HARE_SITTER_LOG=debug`) for diagnostics on
//! stderr.

use facet::Facet;
use hare_sitter::{
    language, validate, GrammarError, LanguageError, ParseError, Parser, ParserConfig,
    ValidationError,
};
use std::io::Read;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Facet)]
struct Args {
    /// File to parse. Standard input when absent.
    #[facet(positional, default)]
    path: Option<String>,

    /// Print the grammar as `grammar.json` instead of parsing.
    #[facet(named, default)]
    grammar: bool,

    /// Print `node-types.json` instead of parsing.
    #[facet(named, default)]
    node_types: bool,

    /// Validate the grammar and print the report instead of parsing.
    #[facet(named, default)]
    validate: bool,

    /// Only report through the exit status.
    #[facet(named, short = 'q', default)]
    quiet: bool,

    /// Nesting limit passed to the parser.
    #[facet(named, default)]
    max_depth: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid arguments: {0}")]
    Args(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid grammar: {0}")]
    Validation(#[from] ValidationError),
}

fn setup_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("HARE_SITTER_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn read_source(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_owned(),
            source,
        }),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| CliError::Read {
                    path: "<stdin>".to_owned(),
                    source,
                })?;
            Ok(source)
        }
    }
}

/// Runs the command and returns whether the output is clean.
fn run(args: &Args) -> Result<bool, CliError> {
    let lang = language();

    if args.grammar {
        println!("{}", lang.grammar_json()?);
        return Ok(true);
    }
    if args.node_types {
        println!("{}", lang.node_types_json());
        return Ok(true);
    }
    if args.validate {
        let report = validate(lang.grammar())?;
        if !args.quiet {
            println!("unreachable: {}", report.unreachable.join(", "));
            println!("left recursive: {}", report.left_recursive.join(", "));
            println!("mixed precedence: {}", report.mixed_precedence.join(", "));
        }
        return Ok(true);
    }

    let source = read_source(args.path.as_deref())?;
    let config = args
        .max_depth
        .map_or_else(ParserConfig::default, |depth| {
            ParserConfig::default().with_max_depth(depth)
        });
    let mut parser = Parser::with_config(config);
    parser.set_language(lang)?;
    let tree = parser.parse(&source)?;

    let root = tree.root_node();
    if !args.quiet {
        println!("{}", root.to_sexp());
    }
    Ok(!root.has_error())
}

fn main() -> ExitCode {
    setup_tracing();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
    let result = facet_args::from_slice::<Args>(&argv)
        .map_err(|e| CliError::Args(e.to_string()))
        .and_then(|args| run(&args));

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
