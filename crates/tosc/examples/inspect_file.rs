//! Simple decoder to inspect .tosc files.
//!
//! Usage: `cargo run --example inspect_file -- layout.tosc [-v] [--validate]`
//! Set `RUST_LOG=debug` to see the codec's own logging.

use std::collections::BTreeMap;

use tosc::{load_file, Control, PropertyValue};

fn format_value(v: &PropertyValue) -> String {
    match v {
        PropertyValue::String(s) => {
            let preview: String = s.chars().take(60).collect();
            if s.chars().count() > 60 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        PropertyValue::Bool(b) => format!("{}", b),
        PropertyValue::Int(i) => format!("{}", i),
        PropertyValue::Float(f) => format!("{:.4}", f),
        PropertyValue::Frame(r) => format!("FRAME({}, {}, {}, {})", r.x, r.y, r.w, r.h),
        PropertyValue::Color(c) => format!("COLOR({:.2}, {:.2}, {:.2}, {:.2})", c.r, c.g, c.b, c.a),
    }
}

fn print_tree(control: &Control, depth: usize, verbose: bool) {
    let indent = "  ".repeat(depth);
    println!(
        "{}{} {:?} [{}] values={} messages={}",
        indent,
        control.control_type(),
        control.name().unwrap_or(""),
        control.id(),
        control.values().len(),
        control.messages().len(),
    );
    if verbose {
        for property in control.properties().iter().take(8) {
            println!("{}    {} = {}", indent, property.key, format_value(&property.value));
        }
        if control.properties().len() > 8 {
            println!("{}    ... and {} more properties", indent, control.properties().len() - 8);
        }
    }
    for child in control.children() {
        print_tree(child, depth + 1, verbose);
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "layout.tosc".to_string());
    let flags: Vec<String> = args.collect();
    let verbose = flags.iter().any(|f| f == "-v" || f == "--verbose");

    println!("Reading: {}", path);

    let doc = match load_file(&path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{} ({})", e, e.kind().code());
            std::process::exit(1);
        }
    };

    println!("lexml version: {}", doc.version());
    println!("Controls: {}", doc.root.control_count());

    let mut by_type = BTreeMap::new();
    doc.root.walk(&mut |c: &Control| *by_type.entry(c.control_type()).or_insert(0usize) += 1);
    for (control_type, count) in &by_type {
        println!("  {}: {}", control_type, count);
    }

    println!("\n=== Tree ===");
    print_tree(&doc.root, 0, verbose);

    if flags.iter().any(|f| f == "--validate") {
        match doc.validate() {
            Ok(()) => println!("\nvalid"),
            Err(e) => {
                println!("\ninvalid: {} ({})", e, e.kind().code());
                std::process::exit(2);
            }
        }
    }
}
