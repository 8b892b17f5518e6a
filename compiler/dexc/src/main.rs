//! Dex compiler CLI.

use dexc::commands::{check_file, eval_expression, explain_error, lower_file, print_file};
use dexc::logging::init_tracing;
use dexc::{parse_options, Options};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    match command {
        "check" | "print" | "lower" => {
            let (options, rest) = options_or_exit(&args[2..]);
            let [path] = rest.as_slice() else {
                eprintln!("Usage: dexc {command} <file.d> [options]");
                std::process::exit(1);
            };
            match command {
                "check" => check_file(path, &options),
                "print" => print_file(path, &options),
                _ => lower_file(path, &options),
            }
        }
        "eval" => {
            let (options, rest) = options_or_exit(&args[2..]);
            let [path, expression] = rest.as_slice() else {
                eprintln!("Usage: dexc eval <file.d> <expression> [options]");
                eprintln!();
                eprintln!("Example: dexc eval math.d 'factorial(10)'");
                std::process::exit(1);
            };
            eval_expression(path, expression, &options);
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: dexc --explain <error-code>");
                eprintln!("Example: dexc --explain E6002");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("dexc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn options_or_exit(args: &[String]) -> (Options, Vec<String>) {
    match parse_options(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Dex Compiler");
    println!();
    println!("Usage: dexc <command> [options]");
    println!();
    println!("Commands:");
    println!("  check <file.d>          Resolve a module and report diagnostics");
    println!("  eval <file.d> <expr>    Evaluate an expression at compile time");
    println!("  print <file.d>          Print the module after resolution");
    println!("  lower <file.d>          Run the text backend over the module");
    println!("  --explain <code>        Explain an error code (e.g., E6002)");
    println!("  help                    Show this help message");
    println!("  version                 Show version information");
    println!();
    println!("Options:");
    println!("  --max-ctfe-depth=<n>    Nested compile-time calls allowed (default: 1000)");
    println!("  --ctfe-budget=<n>       Steps per compile-time evaluation (default: 10000000)");
    println!("  --error-limit=<n>       Stop reporting after n errors, 0 for no limit (default: 10)");
    println!("  -J<dir>                 Add a directory for import(\"file\")");
    println!("  --deprecation=<mode>    Uses of deprecated symbols: warn, error, allow");
    println!("  --color=<mode>          Colored diagnostics: auto, always, never");
    println!();
    println!("Environment:");
    println!("  DEX_LOG=<filter>        Enable tracing (e.g., DEX_LOG=dex_ctfe=debug)");
    println!("  DEX_LOG_STYLE=tree      Print tracing spans as a tree");
}
