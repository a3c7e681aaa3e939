//! Example: Compiling a diagram from Trellis source code
//!
//! This example demonstrates the basic workflow of:
//! 1. Creating a Compiler with default configuration
//! 2. Compiling source text through parse, expansion, conversion, and
//!    layout
//! 3. Inspecting the positioned output a renderer would consume

use trellis::{Compiler, config::CompileOptions};
use trellis_core::{catalog::BasicCatalog, data::MemoryResolver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Define Trellis source for a small flowchart
    let source = r##"
        profile flowchart intake {
            direction: TB;
            style warm [fill: "#ffe8d6"];

            node request: rounded [label: "Incoming request"];
            node triage: diamond [label: "Triage", style: warm];
            node archive;

            request -> triage;
            triage -> archive: "no action" [route: orthogonal];

            container escalation [label: "Escalation"] {
                node page_oncall [label: "Page on-call"];
                node postmortem;
                page_oncall -> postmortem;
            }
            triage -> page_oncall: "incident";
        }
    "##;

    // Create a compiler with default configuration
    let compiler = Compiler::new(CompileOptions::default());

    // Compile source through the whole pipeline; the built-in catalog
    // supplies box geometry, and no external data sources are used
    println!("Compiling diagram from source...");
    let output = compiler.compile(source, &MemoryResolver::new(), &BasicCatalog::new())?;

    // Inspect the positioned output
    for compiled in &output.profiles {
        let layout = &compiled.layout;
        println!("Profile kind: {}", layout.kind);
        println!("Title: {:?}", layout.title);
        println!(
            "Canvas: {:.0} x {:.0}",
            layout.bounds.size().width(),
            layout.bounds.size().height()
        );

        for node in &layout.nodes {
            println!(
                "  node {:10} at ({:6.1}, {:6.1})",
                node.id.to_string(),
                node.bounds.center().x(),
                node.bounds.center().y()
            );
        }
        for edge in &layout.edges {
            println!(
                "  edge {} -> {} ({} label)",
                edge.source,
                edge.target,
                if edge.label.is_some() { "with" } else { "no" }
            );
        }
    }

    Ok(())
}
