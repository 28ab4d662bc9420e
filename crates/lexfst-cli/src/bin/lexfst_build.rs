// lexfst-build: Compile a sorted word list into a transducer blob.
//
// Reads `key<TAB>value` lines (value an unsigned integer; bare keys get
// value 0) from a file or stdin. Lines must already be in ascending key
// order; the builder rejects anything else.
//
// Usage:
//   lexfst-build [INPUT] -o OUTPUT
//
// Options:
//   -o, --output PATH      Where to write the transducer blob (required)
//   -h, --help             Print help

use std::io::{self, BufRead, BufReader, Read};

use lexfst::LabelWidth;
use lexfst::builder::Builder;
use lexfst::outputs::IntOutputs;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (output_path, args) = lexfst_cli::parse_output_path(&args);

    if lexfst_cli::wants_help(&args) {
        println!("lexfst-build: Compile a sorted word list into a transducer blob.");
        println!();
        println!("Usage: lexfst-build [INPUT] -o OUTPUT");
        println!();
        println!("Reads key<TAB>value lines (bare keys get value 0) from INPUT or");
        println!("stdin. Keys must be in ascending order; duplicates sum their values.");
        println!();
        println!("Options:");
        println!("  -o, --output PATH      Where to write the transducer blob");
        println!("  -h, --help             Print this help");
        return;
    }

    let Some(output_path) = output_path else {
        lexfst_cli::fatal("an output path is required (-o OUTPUT)");
    };

    let reader: Box<dyn Read> = match args.first() {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => lexfst_cli::fatal(&format!("cannot open {path}: {e}")),
        },
        None => Box::new(io::stdin()),
    };

    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    let mut keys: u64 = 0;
    for (line_number, line) in BufReader::new(reader).lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => lexfst_cli::fatal(&format!("error reading input: {e}")),
        };
        let entry = line.trim_end();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = match entry.split_once('\t') {
            Some((key, value)) => match value.trim().parse::<u64>() {
                Ok(value) => (key, value),
                Err(_) => lexfst_cli::fatal(&format!(
                    "line {}: value {:?} is not an unsigned integer",
                    line_number + 1,
                    value
                )),
            },
            None => (entry, 0),
        };
        if let Err(e) = builder.add_bytes(key.as_bytes(), value) {
            lexfst_cli::fatal(&format!("line {}: {e}", line_number + 1));
        }
        keys += 1;
    }

    let fst = match builder.finish() {
        Ok(Some(fst)) => fst,
        Ok(None) => lexfst_cli::fatal("no keys survived; nothing to write"),
        Err(e) => lexfst_cli::fatal(&format!("{e}")),
    };

    let mut blob = Vec::new();
    fst.save(&mut blob);
    if let Err(e) = std::fs::write(&output_path, &blob) {
        lexfst_cli::fatal(&format!("cannot write {output_path}: {e}"));
    }

    println!(
        "{} keys -> {} nodes, {} arcs, {} bytes -> {}",
        keys,
        fst.node_count(),
        fst.arc_count(),
        blob.len(),
        output_path
    );
}
