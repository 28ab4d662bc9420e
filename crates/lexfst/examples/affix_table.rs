// Quick demo: build an affix-strip table mapping reversed word endings to
// replacement tags, then run a few lookups against it.
use lexfst::LabelWidth;
use lexfst::builder::Builder;
use lexfst::outputs::BytesOutputs;

fn main() {
    // Keyed by suffix, valued by the base-form rewrite a stemmer would apply.
    let entries: [(&str, &str); 6] = [
        ("ed", "-ed"),
        ("er", "-er"),
        ("ies", "-ies+y"),
        ("ing", "-ing"),
        ("ly", "-ly"),
        ("s", "-s"),
    ];

    let mut builder = Builder::new(LabelWidth::Byte1, BytesOutputs);
    for (suffix, rule) in entries {
        builder
            .add_bytes(suffix.as_bytes(), rule.as_bytes().to_vec())
            .expect("sorted insertion");
    }
    let fst = builder.finish().expect("build").expect("non-empty corpus");

    println!(
        "{} suffix rules -> {} nodes, {} arcs, {} bytes",
        entries.len(),
        fst.node_count(),
        fst.arc_count(),
        fst.size_in_bytes()
    );

    for probe in ["ing", "ies", "s", "est", ""] {
        match fst.get_bytes(probe.as_bytes()).expect("clean bytes") {
            Some(rule) => {
                println!("{probe:>5} -> {}", String::from_utf8_lossy(&rule));
            }
            None => println!("{probe:>5} -> (no rule)"),
        }
    }
}
