// lexfst-cli: shared utilities for the CLI tools.

use std::process;

/// Parse an `--output=PATH` or `-o PATH` argument from command line args.
///
/// Returns `(output_path, remaining_args)`.
pub fn parse_output_path(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut output = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(value) = arg.strip_prefix("--output=") {
            output = Some(value.to_string());
        } else if arg == "--output" || arg == "-o" {
            if i + 1 < args.len() {
                output = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                eprintln!("error: {} requires a value", arg);
                process::exit(1);
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (output, remaining)
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
