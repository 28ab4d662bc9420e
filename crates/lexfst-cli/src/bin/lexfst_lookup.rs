// lexfst-lookup: Query a transducer blob with keys from stdin.
//
// Reads keys from stdin (one per line) and prints `key<TAB>value` for
// matches, `key<TAB>-` otherwise.
//
// Usage:
//   lexfst-lookup BLOB
//
// Options:
//   -h, --help             Print help

use std::io::{self, BufRead, Write};

use lexfst::fst::Transducer;
use lexfst::outputs::IntOutputs;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if lexfst_cli::wants_help(&args) {
        println!("lexfst-lookup: Query a transducer blob with keys from stdin.");
        println!();
        println!("Usage: lexfst-lookup BLOB");
        println!();
        println!("Reads keys from stdin (one per line). Prints:");
        println!("  key<TAB>value   (present)");
        println!("  key<TAB>-       (absent)");
        println!();
        println!("Options:");
        println!("  -h, --help             Print this help");
        return;
    }

    let Some(blob_path) = args.first() else {
        lexfst_cli::fatal("a transducer blob path is required");
    };
    let data = match std::fs::read(blob_path) {
        Ok(data) => data,
        Err(e) => lexfst_cli::fatal(&format!("cannot read {blob_path}: {e}")),
    };
    let fst = match Transducer::load(&data, IntOutputs) {
        Ok(fst) => fst,
        Err(e) => lexfst_cli::fatal(&format!("cannot load {blob_path}: {e}")),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        let key = line.trim_end();
        match fst.get_bytes(key.as_bytes()) {
            Ok(Some(value)) => {
                let _ = writeln!(out, "{key}\t{value}");
            }
            Ok(None) => {
                let _ = writeln!(out, "{key}\t-");
            }
            Err(e) => lexfst_cli::fatal(&format!("corrupt transducer: {e}")),
        }
    }
}
